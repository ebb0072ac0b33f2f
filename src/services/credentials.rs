use crate::config::ServerConfig;
use crate::constants::{env as env_keys, oauth, storage};
use crate::services::logger::Logger;
use crate::utils::fs_atomic::atomic_write_text_file;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Credentials {
    pub fn using_refresh_flow(&self) -> bool {
        self.refresh_token.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenFile {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Process-lifetime holder of the upstream credentials.
///
/// Each token comes from the token file when the file supplies it, otherwise
/// from the environment captured in [`ServerConfig`]. Client credentials always come
/// from the config and are never written to disk.
pub struct CredentialStore {
    logger: Logger,
    token_file: PathBuf,
    state: RwLock<Credentials>,
    revision: AtomicU64,
    refresh_lock: tokio::sync::Mutex<()>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Only a JSON object counts as a token file; anything else is treated like a
/// missing file.
fn read_token_file(path: &Path) -> Option<TokenFile> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<serde_json::Value>(&raw).ok()? {
        value @ serde_json::Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

impl CredentialStore {
    pub fn load(logger: Logger, config: &ServerConfig) -> Self {
        let logger = logger.child("credentials");
        let file = read_token_file(&config.token_file).unwrap_or_default();
        if file.access_token.is_some() || file.refresh_token.is_some() {
            logger.debug(
                "loaded tokens from token file",
                Some(&serde_json::json!({ "path": config.token_file.display().to_string() })),
            );
        }
        let access_token =
            present(file.access_token).or_else(|| present(config.env_access_token.clone()));
        let refresh_token =
            present(file.refresh_token).or_else(|| present(config.env_refresh_token.clone()));
        let credentials = Credentials {
            access_token,
            refresh_token,
            client_id: present(config.client_id.clone()),
            client_secret: present(config.client_secret.clone()),
        };
        Self {
            logger,
            token_file: config.token_file.clone(),
            state: RwLock::new(credentials),
            revision: AtomicU64::new(0),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn token_file(&self) -> &Path {
        &self.token_file
    }

    pub fn snapshot(&self) -> Credentials {
        self.state
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.snapshot().access_token
    }

    /// Number of successful `save` calls so far.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub(crate) fn refresh_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.refresh_lock
    }

    /// Replaces the token pair in memory, then tries to persist it. A failed
    /// write is only logged: the running process keeps the new tokens.
    pub fn save(&self, access_token: &str, refresh_token: &str) {
        {
            let mut state = self.state.write().unwrap_or_else(|err| err.into_inner());
            state.access_token = Some(access_token.to_string());
            state.refresh_token = Some(refresh_token.to_string());
        }
        self.revision.fetch_add(1, Ordering::SeqCst);

        let payload = TokenFile {
            access_token: Some(access_token.to_string()),
            refresh_token: Some(refresh_token.to_string()),
        };
        let written = serde_json::to_string_pretty(&payload)
            .map_err(std::io::Error::from)
            .and_then(|text| {
                atomic_write_text_file(&self.token_file, &text, storage::TOKEN_FILE_MODE)
            });
        match written {
            Ok(()) => self.logger.debug(
                "persisted refreshed tokens",
                Some(&serde_json::json!({ "path": self.token_file.display().to_string() })),
            ),
            Err(err) => self.logger.warn(
                "could not save tokens; continuing with in-memory tokens",
                Some(&serde_json::json!({
                    "path": self.token_file.display().to_string(),
                    "error": err.to_string(),
                })),
            ),
        }
    }

    /// Startup precondition check.
    pub fn validate(&self) -> Result<(), String> {
        let credentials = self.snapshot();
        if credentials.access_token.is_none() {
            return Err(format!(
                "{} is required but not set.\nGet your Personal Access Token from: {}",
                env_keys::ACCESS_TOKEN,
                oauth::PERSONAL_TOKEN_URL
            ));
        }
        if credentials.refresh_token.is_some()
            && (credentials.client_id.is_none() || credentials.client_secret.is_none())
        {
            return Err(format!(
                "{} and {} are required when using {}",
                env_keys::CLIENT_ID,
                env_keys::CLIENT_SECRET,
                env_keys::REFRESH_TOKEN
            ));
        }
        Ok(())
    }

    pub fn using_refresh_flow(&self) -> bool {
        self.snapshot().using_refresh_flow()
    }
}
