use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::session::JsonFileSessionStore;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3001/api/chat";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub endpoint: String,
    pub request_timeout_secs: u64,
    pub sessions_path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiSection {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub request_timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageSection {
    #[serde(default)]
    pub sessions_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub storage: StorageSection,
}

impl ChatConfig {
    /// Resolve configuration: env var > config file > built-in default.
    pub fn load() -> Self {
        let file_config = match FileConfig::load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring unreadable config file: {:#}", e);
                FileConfig::default()
            }
        };

        let endpoint = env::var("BIOCHAT_API_ENDPOINT")
            .ok()
            .or(file_config.api.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let request_timeout_secs = env::var("BIOCHAT_REQUEST_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .or(file_config.api.request_timeout)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let sessions_path = env::var("BIOCHAT_SESSIONS_PATH")
            .ok()
            .map(PathBuf::from)
            .or(file_config.storage.sessions_path)
            .unwrap_or_else(JsonFileSessionStore::default_path);

        Self {
            endpoint,
            request_timeout_secs,
            sessions_path,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            sessions_path: JsonFileSessionStore::default_path(),
        }
    }
}

impl FileConfig {
    pub fn load() -> anyhow::Result<Self> {
        for path in Self::config_paths() {
            if !path.exists() {
                continue;
            }
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let config = match path.extension().and_then(|s| s.to_str()) {
                Some("yaml") | Some("yml") => serde_yaml::from_str(&contents).with_context(|| {
                    format!("Failed to parse YAML config file: {}", path.display())
                })?,
                _ => serde_json::from_str(&contents).with_context(|| {
                    format!("Failed to parse JSON config file: {}", path.display())
                })?,
            };

            return Ok(config);
        }

        Ok(FileConfig::default())
    }

    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Current directory first: local override wins.
        paths.push(PathBuf::from(".biochat.yaml"));
        paths.push(PathBuf::from(".biochat.yml"));
        paths.push(PathBuf::from(".biochat.json"));

        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("biochat");
            paths.push(config_dir.join("biochat.yaml"));
            paths.push(config_dir.join("biochat.yml"));
            paths.push(config_dir.join("biochat.json"));
        }

        paths
    }
}
