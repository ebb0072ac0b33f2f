use crate::config::{OAuthProxyConfig, ServerConfig};
use crate::errors::ToolError;
use crate::managers::collections::collection_handlers;
use crate::managers::summaries::summary_handlers;
use crate::mcp::catalog::tool_catalog;
use crate::mcp::resources::list_resources;
use crate::services::credentials::CredentialStore;
use crate::services::logger::Logger;
use crate::services::oura_client::{OuraClient, TokenSource};
use crate::services::token_verifier::TokenVerifier;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::validation::Validation;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Why a session token could not be used for a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAuthError {
    Malformed(String),
    Rejected,
}

pub struct App {
    pub logger: Logger,
    pub config: ServerConfig,
    pub credentials: Arc<CredentialStore>,
    pub client: OuraClient,
    pub validation: Validation,
    /// Present only in OAuth mode.
    pub token_verifier: Option<TokenVerifier>,
    pub oauth_proxy: Option<OAuthProxyConfig>,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_wiring(
        kind: &str,
        declared: Vec<String>,
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Result<(), ToolError> {
        let mut missing: Vec<String> = declared
            .iter()
            .filter(|name| !handlers.contains_key(*name))
            .cloned()
            .collect();
        let mut undeclared: Vec<String> = handlers
            .keys()
            .filter(|name| !declared.contains(name))
            .cloned()
            .collect();
        if missing.is_empty() && undeclared.is_empty() {
            return Ok(());
        }
        missing.sort();
        undeclared.sort();
        Err(ToolError::internal(format!("{} wiring is incomplete", kind))
            .with_hint(format!(
                "Every {} listed by the server must have exactly one handler.",
                kind
            ))
            .with_details(serde_json::json!({
                "missing": missing,
                "undeclared": undeclared,
            })))
    }

    /// Builds the object graph. Credentials are loaded but not validated here;
    /// the binary decides how to report an unusable configuration.
    pub fn initialize(config: ServerConfig, logger: Logger) -> Result<Self, ToolError> {
        let validation = Validation::new();
        let credentials = Arc::new(CredentialStore::load(logger.clone(), &config));
        let client = OuraClient::new(logger.clone(), &config, credentials.clone())?;

        let oauth_proxy = config.oauth_proxy();
        let token_verifier = if oauth_proxy.is_some() {
            Some(TokenVerifier::new(logger.clone(), &config)?)
        } else {
            None
        };

        let tools = collection_handlers(&logger, &validation, &client);
        let resources = summary_handlers(&logger, &client);
        Self::validate_wiring(
            "tool",
            tool_catalog().iter().map(|tool| tool.name.clone()).collect(),
            &tools,
        )?;
        Self::validate_wiring(
            "resource",
            list_resources().iter().map(|r| r.uri.to_string()).collect(),
            &resources,
        )?;

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), tools, resources));

        Ok(Self {
            logger,
            config,
            credentials,
            client,
            validation,
            token_verifier,
            oauth_proxy,
            tool_executor,
        })
    }

    pub fn oauth_enabled(&self) -> bool {
        self.token_verifier.is_some()
    }

    /// Picks the token source for one call from the request's `_meta`.
    ///
    /// In OAuth mode a supplied `authorization` value must verify upstream and
    /// then overrides the stored token. Without OAuth the value is ignored.
    pub async fn resolve_token_source(
        &self,
        meta: Option<&Value>,
    ) -> Result<TokenSource, SessionAuthError> {
        let Some(raw) = meta.and_then(|m| m.get("authorization")) else {
            return Ok(TokenSource::Stored);
        };
        let Some(verifier) = self.token_verifier.as_ref() else {
            self.logger
                .debug("ignoring session authorization outside OAuth mode", None);
            return Ok(TokenSource::Stored);
        };
        let token = self
            .validation
            .ensure_bearer_token(raw)
            .map_err(|err| SessionAuthError::Malformed(err.message))?;
        match verifier.verify(&token).await {
            Some(access) => {
                self.logger.debug(
                    "session token verified",
                    Some(&serde_json::json!({ "client_id": access.client_id })),
                );
                Ok(TokenSource::Override(access.token))
            }
            None => Err(SessionAuthError::Rejected),
        }
    }
}
