use std::path::PathBuf;

use config::{Config, Environment};
use serde::Deserialize;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ALLOWED_EXTENSIONS: &str = ".txt,.pdf,.doc,.docx";
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Display ordering for the history list. The store always keeps insertion
/// order internally so FIFO eviction stays unambiguous; this only controls
/// what readers see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    Insertion,
    NewestFirst,
}

/// Application settings, loaded from `TEXTSCORE_*` environment variables
/// (a `.env` file is honored when present) with local-development defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_file_size: u64,
    pub allowed_extensions: String,
    pub min_text_length: usize,
    pub history_limit: usize,
    pub history_order: HistoryOrder,
    pub download_dir: PathBuf,
    pub credentials_path: PathBuf,
}

impl Settings {
    pub fn load() -> Result<Self, ClientError> {
        let cfg = Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("request_timeout_secs", 30i64)?
            .set_default("connect_timeout_secs", 5i64)?
            .set_default("max_file_size", DEFAULT_MAX_FILE_SIZE as i64)?
            .set_default("allowed_extensions", DEFAULT_ALLOWED_EXTENSIONS)?
            .set_default("min_text_length", 10i64)?
            .set_default("history_limit", 10i64)?
            .set_default("history_order", "newest_first")?
            .set_default("download_dir", "downloads")?
            .set_default("credentials_path", ".textscore_token")?
            .add_source(Environment::with_prefix("TEXTSCORE"))
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Base URL with a guaranteed trailing slash so `Url::join` appends
    /// instead of replacing the last path segment.
    pub fn base_url(&self) -> Result<Url, ClientError> {
        let mut raw = self.api_base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Url::parse(&raw)?)
    }

    /// WebSocket endpoint derived from the HTTP base URL (`/ws` path).
    pub fn ws_url(&self) -> Result<Url, ClientError> {
        let mut url = self.base_url()?.join("ws")?;
        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| ClientError::Config(format!("cannot derive ws scheme for {}", url)))?;
        Ok(url)
    }

    pub fn allowed_extensions(&self) -> Vec<String> {
        self.allowed_extensions
            .split(',')
            .map(|ext| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> Settings {
    Settings {
        // Port 9 (discard) is never served; tests must fail before any call.
        api_base_url: "http://127.0.0.1:9".to_string(),
        request_timeout_secs: 2,
        connect_timeout_secs: 1,
        max_file_size: DEFAULT_MAX_FILE_SIZE,
        allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.to_string(),
        min_text_length: 10,
        history_limit: 10,
        history_order: HistoryOrder::Insertion,
        download_dir: std::env::temp_dir().join("textscore-test-downloads"),
        credentials_path: std::env::temp_dir().join("textscore-test-token"),
    }
}
