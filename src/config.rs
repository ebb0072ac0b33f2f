use crate::constants::{env as env_keys, network, oauth};
use crate::errors::ToolError;
use crate::utils::paths::{env_value, resolve_token_file};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Everything the server needs from its environment, resolved once at
/// startup and handed to `App::initialize`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub token_file: PathBuf,
    pub api_base_url: String,
    pub deployed_url: String,
    pub env_access_token: Option<String>,
    pub env_refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub request_timeout: Duration,
    pub verify_timeout: Duration,
}

/// Settings handed to the external OAuth proxy component. Only present when
/// both client credentials are configured.
#[derive(Debug, Clone, Serialize)]
pub struct OAuthProxyConfig {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub base_url: String,
    pub redirect_path: String,
    pub scopes: Vec<String>,
}

impl ServerConfig {
    pub fn new(token_file: impl Into<PathBuf>) -> Self {
        Self {
            token_file: token_file.into(),
            api_base_url: network::DEFAULT_API_BASE_URL.to_string(),
            deployed_url: oauth::DEFAULT_DEPLOYED_URL.to_string(),
            env_access_token: None,
            env_refresh_token: None,
            client_id: None,
            client_secret: None,
            request_timeout: Duration::from_millis(network::TIMEOUT_API_REQUEST_MS),
            verify_timeout: Duration::from_millis(network::TIMEOUT_TOKEN_VERIFY_MS),
        }
    }

    pub fn from_env() -> Result<Self, ToolError> {
        let mut config = Self::new(resolve_token_file());
        if let Some(base) = env_value(env_keys::API_BASE_URL) {
            config.api_base_url = normalize_base_url(&base)?;
        }
        if let Some(deployed) = env_value(env_keys::DEPLOYED_URL) {
            config.deployed_url = normalize_base_url(&deployed)?;
        }
        config.env_access_token = env_value(env_keys::ACCESS_TOKEN);
        config.env_refresh_token = env_value(env_keys::REFRESH_TOKEN);
        config.client_id = env_value(env_keys::CLIENT_ID);
        config.client_secret = env_value(env_keys::CLIENT_SECRET);
        Ok(config)
    }

    pub fn with_api_base_url(mut self, base: &str) -> Result<Self, ToolError> {
        self.api_base_url = normalize_base_url(base)?;
        Ok(self)
    }

    pub fn with_env_tokens(
        mut self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Self {
        self.env_access_token = non_empty(access_token);
        self.env_refresh_token = non_empty(refresh_token);
        self
    }

    pub fn with_client(mut self, client_id: Option<&str>, client_secret: Option<&str>) -> Self {
        self.client_id = non_empty(client_id);
        self.client_secret = non_empty(client_secret);
        self
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}{}", self.api_base_url, network::TOKEN_PATH)
    }

    pub fn oauth_proxy(&self) -> Option<OAuthProxyConfig> {
        let client_id = self.client_id.clone()?;
        let client_secret = self.client_secret.clone()?;
        Some(OAuthProxyConfig {
            authorization_endpoint: oauth::AUTHORIZATION_ENDPOINT.to_string(),
            token_endpoint: oauth::TOKEN_ENDPOINT.to_string(),
            client_id,
            client_secret,
            base_url: self.deployed_url.clone(),
            redirect_path: oauth::REDIRECT_PATH.to_string(),
            scopes: oauth::SCOPES.iter().map(|s| s.to_string()).collect(),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn normalize_base_url(raw: &str) -> Result<String, ToolError> {
    let raw = raw.trim();
    let mut url = Url::parse(raw).map_err(|_| {
        ToolError::invalid_params("Invalid base URL")
            .with_hint("Expected an absolute URL, e.g. \"https://api.ouraring.com\".")
            .with_details(serde_json::json!({ "url": raw }))
    })?;
    url.set_fragment(None);
    url.set_query(None);
    let normalized = format!("{}{}", url.origin().ascii_serialization(), url.path());
    Ok(normalized.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_trailing_slash_and_query() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8080/?x=1").expect("valid"),
            "http://127.0.0.1:8080"
        );
        assert_eq!(
            normalize_base_url("https://api.ouraring.com/").expect("valid"),
            "https://api.ouraring.com"
        );
        assert!(normalize_base_url("not a url").is_err());
    }

    #[test]
    fn oauth_proxy_requires_both_client_fields() {
        let config = ServerConfig::new("tokens.json").with_client(Some("id"), None);
        assert!(config.oauth_proxy().is_none());

        let config = ServerConfig::new("tokens.json").with_client(Some("id"), Some("secret"));
        let proxy = config.oauth_proxy().expect("proxy config");
        assert_eq!(proxy.redirect_path, "/mcp/auth/callback");
        assert_eq!(proxy.base_url, "https://oura-mcp.fastmcp.app");
        assert!(proxy.scopes.contains(&"spo2Daily".to_string()));
        let rendered = serde_json::to_value(&proxy).expect("serialize");
        assert!(rendered.get("client_secret").is_none());
    }

    #[test]
    fn token_endpoint_follows_base_url() {
        let config = ServerConfig::new("tokens.json")
            .with_api_base_url("http://localhost:9000/")
            .expect("valid");
        assert_eq!(config.token_endpoint(), "http://localhost:9000/oauth/token");
    }
}
