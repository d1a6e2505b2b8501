//! Client configuration and the runtime config loader.
//!
//! Two layers:
//! - [`ClientConfig`]: static settings from `CROWDFUND_*` environment
//!   variables, overridable by CLI flags.
//! - [`RuntimeConfig`]: the backend base URL, fetched once from the
//!   front-end origin's `/api/config` so deployments can move the backend
//!   without rebuilding clients.

use std::path::PathBuf;

use reqwest::Method;
use serde::Deserialize;
use url::Url;

use crate::net::transport::{HttpRequest, HttpTransport, TransportError};

pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_USER_AGENT: &str = "crowdfund-client";
const CONFIG_PATH: &str = "/api/config";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config fetch failed: {0}")]
    Fetch(#[from] TransportError),
    #[error("config endpoint returned status {0}")]
    Status(u16),
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("invalid URL in {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },
}

// =============================================================================
// CLIENT CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Front-end origin serving `/api/config` and the search proxy.
    pub origin: Url,
    /// Backend base URL; when set, the runtime config fetch is skipped.
    pub api_base_url: Option<Url>,
    pub cookie_file: PathBuf,
    pub user_agent: String,
}

impl ClientConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `CROWDFUND_ORIGIN`: default `http://localhost:3000`
    /// - `CROWDFUND_API_BASE_URL`: no default (resolved at runtime)
    /// - `CROWDFUND_COOKIE_FILE`: default `<config dir>/crowdfund/cookies.json`
    /// - `CROWDFUND_USER_AGENT`: default `crowdfund-client`
    ///
    /// # Errors
    ///
    /// Returns an error if a URL variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let origin = parse_url("CROWDFUND_ORIGIN", &non_empty("CROWDFUND_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_owned()))?;
        let api_base_url = non_empty("CROWDFUND_API_BASE_URL")
            .map(|raw| parse_url("CROWDFUND_API_BASE_URL", &raw))
            .transpose()?;
        let cookie_file = non_empty("CROWDFUND_COOKIE_FILE").map_or_else(default_cookie_file, PathBuf::from);
        let user_agent = non_empty("CROWDFUND_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

        Ok(Self { origin, api_base_url, cookie_file, user_agent })
    }
}

/// `<config dir>/crowdfund/cookies.json`, or `./crowdfund-cookies.json` when
/// the platform has no config directory.
#[must_use]
pub fn default_cookie_file() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("./crowdfund-cookies.json"),
        |dirs| dirs.config_dir().join("crowdfund").join("cookies.json"),
    )
}

/// Parse a URL-valued setting, naming the setting on failure.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] if `raw` is not an absolute URL.
pub fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|_| ConfigError::InvalidUrl { field, value: raw.to_owned() })
}

// =============================================================================
// RUNTIME CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub api_base_url: Url,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeConfigBody {
    api_base_url: Option<String>,
}

/// Parse the `/api/config` document.
///
/// # Errors
///
/// Returns an error if the body is not JSON, lacks `apiBaseUrl`, or the
/// value is not a URL.
pub fn parse_runtime_config(body: &str) -> Result<RuntimeConfig, ConfigError> {
    let parsed: RuntimeConfigBody = serde_json::from_str(body).map_err(|e| ConfigError::Parse(e.to_string()))?;
    let raw = parsed
        .api_base_url
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::Parse("missing apiBaseUrl".to_owned()))?;
    Ok(RuntimeConfig { api_base_url: parse_url("apiBaseUrl", raw.trim())? })
}

/// Fetch `GET {origin}/api/config`, bypassing caches.
///
/// # Errors
///
/// Transport failure, non-2xx status, or an unparseable document.
pub async fn load_runtime_config(transport: &dyn HttpTransport, origin: &Url) -> Result<RuntimeConfig, ConfigError> {
    let url = origin
        .join(CONFIG_PATH)
        .map_err(|_| ConfigError::InvalidUrl { field: "origin", value: origin.to_string() })?;

    let mut request = HttpRequest::new(Method::GET, url);
    request.headers.push(("Cache-Control".to_owned(), "no-store".to_owned()));

    let resp = transport.send(request).await?;
    if !resp.is_success() {
        return Err(ConfigError::Status(resp.status));
    }
    parse_runtime_config(&resp.body)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
