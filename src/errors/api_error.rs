use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// No bearer token could be attached to the request.
    MissingCredential,
    /// The upstream answered with a status >= 400.
    Upstream,
    /// Connection, DNS, timeout or body read failure. Status is always 0.
    Transport,
}

#[derive(Debug, Clone, Error)]
#[error("[{status}] {message}{}", detail_suffix(.detail))]
pub struct OuraApiError {
    pub kind: ApiErrorKind,
    pub status: u16,
    pub message: String,
    pub detail: Option<String>,
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) if !detail.is_empty() => format!(": {}", detail),
        _ => String::new(),
    }
}

impl OuraApiError {
    pub fn missing_credential() -> Self {
        Self {
            kind: ApiErrorKind::MissingCredential,
            status: 401,
            message: "No access token available".to_string(),
            detail: Some("Please configure OURA_ACCESS_TOKEN or authenticate via OAuth".to_string()),
        }
    }

    pub fn upstream(status: u16, message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            kind: ApiErrorKind::Upstream,
            status,
            message: message.into(),
            detail,
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            status: 0,
            message: "Request failed".to_string(),
            detail: Some(detail.into()),
        }
    }

    pub fn pagination_limit(max_pages: usize) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            status: 0,
            message: "Pagination limit exceeded".to_string(),
            detail: Some(format!("upstream kept returning next_token after {} pages", max_pages)),
        }
    }

    /// Builds the error for a failed response from its status and raw body.
    ///
    /// A JSON object body contributes `title` and `detail` (or
    /// `error_description`); anything else keeps the raw text as detail.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => {
                let title = map
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or("API Error")
                    .to_string();
                let detail = map
                    .get("detail")
                    .filter(|v| !v.is_null())
                    .or_else(|| map.get("error_description"))
                    .and_then(|v| match v {
                        Value::Null => None,
                        Value::String(text) => Some(text.clone()),
                        other => Some(other.to_string()),
                    });
                Self::upstream(status, title, detail)
            }
            _ => {
                let detail = if body.is_empty() {
                    None
                } else {
                    Some(body.to_string())
                };
                Self::upstream(status, format!("HTTP {}", status), detail)
            }
        }
    }

    /// Payload returned to the tool caller in place of data.
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "error": self.to_string(),
            "status_code": self.status,
        })
    }
}
