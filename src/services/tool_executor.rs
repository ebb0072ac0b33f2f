use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::oura_client::TokenSource;
use crate::utils::suggest::suggest;

use serde_json::Value;

/// Per-call state threaded from the protocol layer into handlers.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub trace_id: String,
    pub token_source: TokenSource,
}

impl CallContext {
    pub fn new(token_source: TokenSource) -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            token_source,
        }
    }

    pub fn stored() -> Self {
        Self::new(TokenSource::Stored)
    }
}

/// A named tool or resource. Handlers return the text shown to the caller;
/// upstream failures are part of that text, so `Err` is reserved for faults
/// the caller cannot act on through the payload.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value, ctx: &CallContext) -> Result<String, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    tools: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
    resources: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(
        logger: Logger,
        tools: HashMap<String, Arc<dyn ToolHandler>>,
        resources: HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Self {
        Self {
            logger: logger.child("executor"),
            tools: Arc::new(tools),
            resources: Arc::new(resources),
        }
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn has_resource(&self, uri: &str) -> bool {
        self.resources.contains_key(uri)
    }

    fn unknown(kind: &str, name: &str, known: Vec<&String>) -> ToolError {
        let mut known: Vec<String> = known.into_iter().cloned().collect();
        known.sort();
        let suggestions = suggest(name, &known, 3);
        let mut err = ToolError::not_found(format!("Unknown {}: {}", kind, name));
        if !suggestions.is_empty() {
            err = err.with_hint(format!("Did you mean: {}?", suggestions.join(", ")));
        }
        err.with_details(serde_json::json!({ "known": known }))
    }

    async fn dispatch(
        &self,
        kind: &str,
        handler: &Arc<dyn ToolHandler>,
        name: &str,
        args: Value,
        ctx: &CallContext,
    ) -> Result<String, ToolError> {
        let started = Instant::now();
        let result = handler.handle(args, ctx).await;
        let meta = serde_json::json!({
            "kind": kind,
            "name": name,
            "trace_id": ctx.trace_id,
            "duration_ms": started.elapsed().as_millis() as u64,
            "ok": result.is_ok(),
        });
        match &result {
            Ok(_) => self.logger.debug("call finished", Some(&meta)),
            Err(err) => self.logger.error(&format!("call failed: {}", err), Some(&meta)),
        }
        result
    }

    pub async fn execute(
        &self,
        tool: &str,
        args: Value,
        ctx: &CallContext,
    ) -> Result<String, ToolError> {
        let handler = self
            .tools
            .get(tool)
            .ok_or_else(|| Self::unknown("tool", tool, self.tools.keys().collect()))?;
        self.dispatch("tool", handler, tool, args, ctx).await
    }

    pub async fn read_resource(&self, uri: &str, ctx: &CallContext) -> Result<String, ToolError> {
        let handler = self
            .resources
            .get(uri)
            .ok_or_else(|| Self::unknown("resource", uri, self.resources.keys().collect()))?;
        self.dispatch("resource", handler, uri, Value::Null, ctx)
            .await
    }
}
