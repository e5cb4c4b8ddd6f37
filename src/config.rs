//! Client configuration parsed from the app-settings document.
//!
//! SYSTEM CONTEXT
//! ==============
//! The host page ships an `appsettings.json` next to the WASM bundle. Only the
//! keys the auth client needs are read here; unknown keys are ignored.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;
use url::Url;

pub const DEFAULT_API_BASE_PATH: &str = "/api";
pub const DEFAULT_STORAGE_KEY: &str = "app_auth_session";
pub const DEFAULT_LOG_LEVEL: log::Level = log::Level::Trace;

/// Errors produced while reading client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The settings document is not valid JSON of the expected shape.
    #[error("config parse failed: {0}")]
    Parse(String),

    /// `ApiBaseUrl` is set but is not an absolute http(s) URL.
    #[error("invalid ApiBaseUrl '{0}': expected http:// or https://")]
    InvalidBaseUrl(String),

    /// `LogLevel` does not name a `log::Level`.
    #[error("invalid LogLevel '{0}'")]
    InvalidLogLevel(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSettings {
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    api_base_path: Option<String>,
    #[serde(default)]
    storage_key: Option<String>,
    #[serde(default)]
    log_level: Option<String>,
}

/// Typed client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute API origin; `None` means "same origin as the page".
    pub api_base_url: Option<String>,
    /// Path prefix for every API route, normalized to `/segment` form.
    pub api_base_path: String,
    /// `localStorage` key holding the stored session.
    pub storage_key: String,
    /// Minimum level forwarded to the browser console.
    pub log_level: log::Level,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_base_path: DEFAULT_API_BASE_PATH.to_owned(),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl ClientConfig {
    /// Parse the app-settings JSON document.
    ///
    /// Recognized keys: `ApiBaseUrl`, `ApiBasePath`, `StorageKey`, `LogLevel`.
    /// Blank values fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document does not parse, the base URL is
    /// not http(s), or the log level is unknown.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let settings: RawSettings = serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let api_base_url = match non_blank(settings.api_base_url) {
            Some(url) => Some(parse_base_url(&url)?),
            None => None,
        };
        let api_base_path =
            normalize_base_path(non_blank(settings.api_base_path).as_deref().unwrap_or(DEFAULT_API_BASE_PATH));
        let storage_key = non_blank(settings.storage_key).unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_owned());
        let log_level = match non_blank(settings.log_level) {
            Some(level) => level.parse::<log::Level>().map_err(|_| ConfigError::InvalidLogLevel(level))?,
            None => DEFAULT_LOG_LEVEL,
        };

        Ok(Self { api_base_url, api_base_path, storage_key, log_level })
    }

    /// Full API root: configured base URL (or the page origin) plus the path prefix.
    pub fn resolve_api_root(&self, page_origin: &str) -> String {
        let base = self.api_base_url.as_deref().unwrap_or(page_origin).trim_end_matches('/');
        format!("{base}{}", self.api_base_path)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Accepts absolute `http`/`https` URLs with a host; returns the normalized
/// form without a trailing slash.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidBaseUrl(raw.to_owned());
    let url = Url::parse(raw).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
        return Err(invalid());
    }
    Ok(url.as_str().trim_end_matches('/').to_owned())
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() { String::new() } else { format!("/{trimmed}") }
}
