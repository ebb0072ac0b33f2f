#![allow(dead_code)]

use once_cell::sync::Lazy;
use oura_mcp::app::App;
use oura_mcp::config::ServerConfig;
use oura_mcp::services::credentials::CredentialStore;
use oura_mcp::services::logger::{LogLevel, Logger};
use oura_mcp::services::oura_client::OuraClient;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub fn quiet_logger() -> Logger {
    Logger::with_level("test", LogLevel::Error)
}

/// Config pointed at a mock upstream with the token file inside `dir`.
pub fn config_for(server_uri: &str, dir: &Path) -> ServerConfig {
    ServerConfig::new(dir.join("tokens.json"))
        .with_api_base_url(server_uri)
        .expect("mock server uri is a valid base url")
}

/// Config with a stored token pair and client credentials, i.e. refresh enabled.
pub fn refreshing_config(server_uri: &str, dir: &Path, access: &str) -> ServerConfig {
    config_for(server_uri, dir)
        .with_env_tokens(Some(access), Some("refresh-1"))
        .with_client(Some("client-id"), Some("client-secret"))
}

pub fn build_client(config: &ServerConfig) -> (Arc<CredentialStore>, OuraClient) {
    let store = Arc::new(CredentialStore::load(quiet_logger(), config));
    let client = OuraClient::new(quiet_logger(), config, store.clone()).expect("client");
    (store, client)
}

pub fn build_app(config: ServerConfig) -> App {
    App::initialize(config, quiet_logger()).expect("app wiring")
}

pub fn restore_env(key: &str, previous: Option<String>) {
    match previous {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}
