use crate::config::ServerConfig;
use crate::constants::{network, oauth};
use crate::errors::ToolError;
use crate::services::endpoints::Endpoint;
use crate::services::logger::Logger;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// A session token the upstream accepted, with the identity it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    #[serde(skip_serializing)]
    pub token: String,
    pub client_id: String,
    pub scopes: Vec<String>,
    pub claims: Value,
}

/// Validates opaque Oura tokens by calling the personal info endpoint; the
/// upstream offers no introspection endpoint.
#[derive(Clone)]
pub struct TokenVerifier {
    logger: Logger,
    client: Client,
    personal_info_url: String,
}

impl TokenVerifier {
    pub fn new(logger: Logger, config: &ServerConfig) -> Result<Self, ToolError> {
        let client = Client::builder()
            .user_agent(network::USER_AGENT)
            .timeout(config.verify_timeout)
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self {
            logger: logger.child("verifier"),
            client,
            personal_info_url: format!("{}{}", config.api_base_url, Endpoint::PersonalInfo.path()),
        })
    }

    pub async fn verify(&self, token: &str) -> Option<AccessToken> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        let response = match self
            .client
            .get(&self.personal_info_url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                self.logger.warn(
                    "token verification request failed",
                    Some(&serde_json::json!({ "error": err.to_string() })),
                );
                return None;
            }
        };
        if response.status() != StatusCode::OK {
            self.logger.debug(
                "token rejected",
                Some(&serde_json::json!({ "status": response.status().as_u16() })),
            );
            return None;
        }
        let info: Value = response.json().await.ok()?;
        let user_id = info
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let email = info.get("email").cloned().unwrap_or(Value::Null);
        Some(AccessToken {
            token: token.to_string(),
            client_id: user_id.clone(),
            scopes: oauth::SCOPES.iter().map(|s| s.to_string()).collect(),
            claims: serde_json::json!({ "sub": user_id, "email": email }),
        })
    }
}
