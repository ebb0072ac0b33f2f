use crate::app::{App, SessionAuthError};
use crate::errors::{ErrorCode, McpError, ToolError, ToolErrorKind};
use crate::mcp::catalog::{list_tools, validate_tool_args};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};
use crate::mcp::resources::{list_resources, resource_by_uri};
use crate::services::tool_executor::CallContext;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

const SERVER_NAME: &str = "oura-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const INSTRUCTIONS: &str = "Read-only access to Oura Ring data: sleep, activity, readiness, \
heart rate, workouts and more. Dates accept YYYY-MM-DD or 'today', 'yesterday', \
'last week', 'last month'.";

fn map_tool_error(name: &str, error: &ToolError) -> McpError {
    let mut lines = vec![
        format!("tool: {}", name),
        format!("code: {}", error.code),
        format!("message: {}", error.message),
    ];
    if let Some(hint) = &error.hint {
        lines.push(format!("hint: {}", hint));
    }
    let message = lines.join("\n");
    match error.kind {
        ToolErrorKind::InvalidParams => McpError::new(ErrorCode::InvalidParams, message),
        ToolErrorKind::NotFound => McpError::new(ErrorCode::InvalidRequest, message),
        ToolErrorKind::Internal => McpError::new(ErrorCode::InternalError, message),
    }
}

fn map_session_error(error: SessionAuthError) -> McpError {
    match error {
        SessionAuthError::Malformed(message) => McpError::new(ErrorCode::InvalidRequest, message),
        SessionAuthError::Rejected => McpError::new(
            ErrorCode::InvalidRequest,
            "Session token was rejected by the Oura API",
        ),
    }
}

fn text_content(text: String) -> Value {
    serde_json::json!({ "content": [ { "type": "text", "text": text } ] })
}

pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub fn new(app: Arc<App>) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    fn handle_initialize(&self, params: &Value) -> Value {
        let version = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);
        serde_json::json!({
            "protocolVersion": version,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false },
            },
            "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
            "instructions": INSTRUCTIONS,
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": list_tools() })
    }

    fn handle_resources_list(&self) -> Value {
        serde_json::json!({ "resources": list_resources() })
    }

    async fn call_context(&self, params: &Value) -> Result<CallContext, McpError> {
        let token_source = self
            .app
            .resolve_token_source(params.get("_meta"))
            .await
            .map_err(map_session_error)?;
        Ok(CallContext::new(token_source))
    }

    async fn handle_tools_call(&self, params: &Value) -> Result<Value, McpError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if name.is_empty() {
            return Err(McpError::invalid_params("Missing tool name"));
        }
        let args = params.get("arguments").cloned().unwrap_or(Value::Null);
        validate_tool_args(name, &args)?;
        let ctx = self.call_context(params).await?;
        let text = self
            .app
            .tool_executor
            .execute(name, args, &ctx)
            .await
            .map_err(|err| map_tool_error(name, &err))?;
        Ok(text_content(text))
    }

    async fn handle_resources_read(&self, params: &Value) -> Result<Value, McpError> {
        let uri = params
            .get("uri")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if uri.is_empty() {
            return Err(McpError::invalid_params("Missing resource uri"));
        }
        let Some(resource) = resource_by_uri(uri) else {
            return Err(McpError::new(
                ErrorCode::ResourceNotFound,
                format!("Resource not found: {}", uri),
            ));
        };
        let ctx = self.call_context(params).await?;
        let text = self
            .app
            .tool_executor
            .read_resource(uri, &ctx)
            .await
            .map_err(|err| map_tool_error(uri, &err))?;
        Ok(serde_json::json!({
            "contents": [ { "uri": resource.uri, "mimeType": resource.mime_type, "text": text } ]
        }))
    }

    async fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value, McpError> {
        match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize(&request.params)),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(&request.params).await,
            "resources/list" => Ok(self.handle_resources_list()),
            "resources/read" => self.handle_resources_read(&request.params).await,
            _ => Err(McpError::new(ErrorCode::MethodNotFound, "Method not found")),
        }
    }

    /// Handles one line of input and returns the line to write back, if any.
    pub async fn handle_message(&self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let parsed: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(_) => {
                return Some(
                    JsonRpcResponse::failure(
                        Value::Null,
                        ErrorCode::ParseError.as_i32(),
                        "Parse error".to_string(),
                    )
                    .to_line(),
                )
            }
        };
        let request: JsonRpcRequest = match serde_json::from_value(parsed) {
            Ok(req) => req,
            Err(_) => {
                return Some(
                    JsonRpcResponse::failure(
                        Value::Null,
                        ErrorCode::InvalidRequest.as_i32(),
                        "Invalid request".to_string(),
                    )
                    .to_line(),
                )
            }
        };
        if request.is_notification() {
            self.app.logger.debug(
                "notification",
                Some(&serde_json::json!({ "method": request.method })),
            );
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);
        let response = match self.dispatch(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => {
                self.app.logger.debug(
                    "request failed",
                    Some(&serde_json::json!({
                        "method": request.method,
                        "code": err.code.as_i32(),
                    })),
                );
                JsonRpcResponse::from_error(id, err)
            }
        };
        Some(response.to_line())
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin).lines();
        let mut writer = BufWriter::new(stdout);

        while let Some(line) = reader
            .next_line()
            .await
            .map_err(|err| ToolError::internal(err.to_string()))?
        {
            if let Some(payload) = self.handle_message(&line).await {
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        self.app.logger.info("stdin closed, shutting down", None);
        Ok(())
    }
}

pub async fn run_stdio(app: App) -> Result<(), ToolError> {
    McpServer::new(Arc::new(app)).run_stdio().await
}
