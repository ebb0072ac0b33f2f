use crate::constants::{env as env_keys, storage};
use std::env;
use std::path::PathBuf;

fn normalize_env_value(value: Option<String>) -> Option<String> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    if lowered == "undefined" || lowered == "null" {
        return None;
    }
    Some(trimmed.to_string())
}

/// Reads an environment variable, treating blank and placeholder values as
/// unset.
pub fn env_value(key: &str) -> Option<String> {
    normalize_env_value(env::var(key).ok())
}

/// Token cache location: `OURA_TOKEN_FILE`, else `.oura_tokens.json` in the
/// working directory.
pub fn resolve_token_file() -> PathBuf {
    env_value(env_keys::TOKEN_FILE)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(storage::DEFAULT_TOKEN_FILE))
}
