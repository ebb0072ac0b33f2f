use crate::config::ServerConfig;
use crate::constants::{network, pagination};
use crate::errors::{OuraApiError, ToolError};
use crate::services::credentials::CredentialStore;
use crate::services::endpoints::Endpoint;
use crate::services::logger::Logger;
use crate::utils::redact::mask_token;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Query parameters in request order. `None` values are left out of the URL.
pub type Query = Vec<(String, Option<String>)>;

/// Where the bearer token for a call comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// The credential store's current access token, re-read on every request.
    Stored,
    /// A token the caller already holds, e.g. from an authenticated MCP session.
    Override(String),
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Authenticated forwarder for the Oura v2 API.
#[derive(Clone)]
pub struct OuraClient {
    logger: Logger,
    client: Client,
    base_url: String,
    token_url: String,
    credentials: Arc<CredentialStore>,
    token_source: TokenSource,
}

pub fn set_query_param(query: &mut Query, key: &str, value: &str) {
    match query.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = Some(value.to_string()),
        None => query.push((key.to_string(), Some(value.to_string()))),
    }
}

impl OuraClient {
    pub fn new(
        logger: Logger,
        config: &ServerConfig,
        credentials: Arc<CredentialStore>,
    ) -> Result<Self, ToolError> {
        let client = Client::builder()
            .user_agent(network::USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self {
            logger: logger.child("client"),
            client,
            base_url: config.api_base_url.clone(),
            token_url: config.token_endpoint(),
            credentials,
            token_source: TokenSource::Stored,
        })
    }

    /// Same connection pool and credential store, different token source.
    pub fn with_token_source(&self, token_source: TokenSource) -> Self {
        Self {
            token_source,
            ..self.clone()
        }
    }

    pub fn token_source(&self) -> &TokenSource {
        &self.token_source
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    fn resolve_token(&self) -> Option<String> {
        match &self.token_source {
            TokenSource::Override(token) => Some(token.clone()).filter(|t| !t.trim().is_empty()),
            TokenSource::Stored => self.credentials.access_token(),
        }
    }

    fn build_headers(token: &str) -> Result<HeaderMap, OuraApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| OuraApiError::missing_credential())?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, Option<String>)],
        token: &str,
    ) -> Result<Response, OuraApiError> {
        let url = format!("{}{}", self.base_url, path);
        let params: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key.as_str(), v)))
            .collect();
        self.client
            .request(method, &url)
            .headers(Self::build_headers(token)?)
            .query(&params)
            .send()
            .await
            .map_err(|err| OuraApiError::transport(err.to_string()))
    }

    /// Issues one authenticated call. A 401 on a stored-token call triggers at
    /// most one refresh followed by one retry; the retry never refreshes again.
    ///
    /// Unlike a plain "refresh on any 401" rule, a 401 for a
    /// [`TokenSource::Override`] token is returned as-is even when
    /// `allow_refresh_retry` is set: rotating the stored token cannot make a
    /// caller-supplied token valid.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, Option<String>)],
        allow_refresh_retry: bool,
    ) -> Result<Value, OuraApiError> {
        let mut allow_refresh_retry = allow_refresh_retry;
        loop {
            let seen_revision = self.credentials.revision();
            let token = self
                .resolve_token()
                .ok_or_else(OuraApiError::missing_credential)?;
            self.logger.debug(
                "request",
                Some(&serde_json::json!({
                    "method": method.as_str(),
                    "path": path,
                    "token": mask_token(&token),
                })),
            );
            let response = self.send(method.clone(), path, query, &token).await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED
                && allow_refresh_retry
                && self.token_source == TokenSource::Stored
            {
                allow_refresh_retry = false;
                if self.refresh_after(seen_revision).await {
                    continue;
                }
            }

            let body = response
                .text()
                .await
                .map_err(|err| OuraApiError::transport(err.to_string()))?;
            if status.as_u16() >= 400 {
                let err = OuraApiError::from_response(status.as_u16(), &body);
                self.logger.warn(
                    "upstream error",
                    Some(&serde_json::json!({ "path": path, "error": err.to_string() })),
                );
                return Err(err);
            }
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&body).map_err(|err| {
                OuraApiError::upstream(
                    status.as_u16(),
                    "Invalid JSON response",
                    Some(err.to_string()),
                )
            });
        }
    }

    /// Refreshes unless another caller already rotated the tokens since
    /// `seen_revision` was read, in which case the rotation is reused.
    async fn refresh_after(&self, seen_revision: u64) -> bool {
        let _guard = self.credentials.refresh_lock().lock().await;
        if self.credentials.revision() != seen_revision {
            self.logger.debug("tokens already rotated by a concurrent call", None);
            return true;
        }
        self.exchange_refresh_token().await
    }

    /// Exchanges the stored refresh token for a new token pair. Every failure
    /// is swallowed into `false`.
    pub async fn refresh(&self) -> bool {
        let _guard = self.credentials.refresh_lock().lock().await;
        self.exchange_refresh_token().await
    }

    async fn exchange_refresh_token(&self) -> bool {
        let credentials = self.credentials.snapshot();
        let (Some(refresh_token), Some(client_id), Some(client_secret)) = (
            credentials.refresh_token,
            credentials.client_id,
            credentials.client_secret,
        ) else {
            return false;
        };

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
        ];
        let body = match serde_urlencoded::to_string(form) {
            Ok(body) => body,
            Err(err) => {
                self.logger.warn(
                    "token refresh form encoding failed",
                    Some(&serde_json::json!({ "error": err.to_string() })),
                );
                return false;
            }
        };

        let response = match self
            .client
            .post(&self.token_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                self.logger.warn(
                    "token refresh request failed",
                    Some(&serde_json::json!({ "error": err.to_string() })),
                );
                return false;
            }
        };

        if response.status() != StatusCode::OK {
            self.logger.warn(
                "token refresh rejected",
                Some(&serde_json::json!({ "status": response.status().as_u16() })),
            );
            return false;
        }

        let tokens = match response.json::<RefreshResponse>().await {
            Ok(tokens) => tokens,
            Err(err) => {
                self.logger.warn(
                    "token refresh returned an unreadable body",
                    Some(&serde_json::json!({ "error": err.to_string() })),
                );
                return false;
            }
        };
        let access = tokens.access_token.filter(|t| !t.is_empty());
        let refresh = tokens.refresh_token.filter(|t| !t.is_empty());
        match (access, refresh) {
            (Some(access), Some(refresh)) => {
                self.credentials.save(&access, &refresh);
                self.logger.info("access token refreshed", None);
                true
            }
            _ => {
                self.logger
                    .warn("token refresh response lacked a token pair", None);
                false
            }
        }
    }

    /// Follows `next_token` until the upstream stops returning one and
    /// returns every page's `data` items in order. Any failing page fails the
    /// whole call.
    pub async fn paginate(&self, path: &str, query: Query) -> Result<Vec<Value>, OuraApiError> {
        let mut query = query;
        let mut items = Vec::new();
        for _ in 0..pagination::MAX_PAGES {
            let page = self.request(Method::GET, path, &query, true).await?;
            if let Some(data) = page.get("data").and_then(Value::as_array) {
                items.extend(data.iter().cloned());
            }
            let cursor = page
                .get(pagination::CURSOR_PARAM)
                .and_then(Value::as_str)
                .filter(|cursor| !cursor.is_empty());
            match cursor {
                Some(cursor) => set_query_param(&mut query, pagination::CURSOR_PARAM, cursor),
                None => return Ok(items),
            }
        }
        Err(OuraApiError::pagination_limit(pagination::MAX_PAGES))
    }

    pub async fn personal_info(&self) -> Result<Value, OuraApiError> {
        self.request(Method::GET, Endpoint::PersonalInfo.path(), &[], true)
            .await
    }

    /// Fetches a collection endpoint over an optional range. Range values are
    /// sent as given; callers normalise them first.
    pub async fn collection(
        &self,
        endpoint: Endpoint,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Value>, OuraApiError> {
        let mut query = Query::new();
        if let Some((start_key, end_key)) = endpoint.range().param_names() {
            query.push((start_key.to_string(), start.map(str::to_string)));
            query.push((end_key.to_string(), end.map(str::to_string)));
        }
        self.paginate(endpoint.path(), query).await
    }

    /// Single-resource fetch for personal info, collection fetch otherwise.
    pub async fn fetch(
        &self,
        endpoint: Endpoint,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Value, OuraApiError> {
        if endpoint.paginated() {
            self.collection(endpoint, start, end)
                .await
                .map(Value::Array)
        } else {
            self.personal_info().await
        }
    }
}
