/// Runtime configuration, read from the environment
///
/// - `FILE_VAULT_API_URL` - API base (default `http://localhost:8000/api`)
/// - `FILE_VAULT_DOWNLOAD_DIR` - where downloads are saved
/// - `FILE_VAULT_TIMEOUT_SECS` - per-request timeout

use std::path::PathBuf;
use std::time::Duration;
use reqwest::Url;
use thiserror::Error;

pub const API_URL_VAR: &str = "FILE_VAULT_API_URL";
pub const DOWNLOAD_DIR_VAR: &str = "FILE_VAULT_DOWNLOAD_DIR";
pub const TIMEOUT_VAR: &str = "FILE_VAULT_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be an http(s) URL, got {value:?}")]
    InvalidUrl { name: &'static str, value: String },
    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// API base without a trailing slash
    pub api_url: String,
    pub download_dir: PathBuf,
    pub timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            download_dir: default_download_dir(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> (Self, Vec<ConfigError>) {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from any variable source. Unset or blank variables use their
    /// defaults; an invalid one falls back to its own default and is
    /// reported, without affecting the others.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigError>) {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();
        let mut errors = Vec::new();

        if let Some(url) = get(API_URL_VAR) {
            match parse_api_url(&url) {
                Some(api_url) => config.api_url = api_url,
                None => errors.push(ConfigError::InvalidUrl {
                    name: API_URL_VAR,
                    value: url,
                }),
            }
        }

        if let Some(dir) = get(DOWNLOAD_DIR_VAR) {
            config.download_dir = PathBuf::from(dir);
        }

        if let Some(secs) = get(TIMEOUT_VAR) {
            match secs.parse::<u64>() {
                Ok(n) if n > 0 => config.timeout = Duration::from_secs(n),
                _ => errors.push(ConfigError::InvalidTimeout {
                    name: TIMEOUT_VAR,
                    value: secs,
                }),
            }
        }

        (config, errors)
    }
}

/// An absolute http(s) URL with a host, returned without a trailing slash
fn parse_api_url(value: &str) -> Option<String> {
    let url = Url::parse(value).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    Some(value.trim_end_matches('/').to_string())
}

/// The user's downloads folder, falling back to home, then the working directory
fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}
