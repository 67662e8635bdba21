//! Upstream configuration parsed from environment variables.

use super::types::UpstreamError;

pub const DEFAULT_DIFY_ENDPOINT: &str = "https://api.dify.ai/v1/chat-messages";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    /// Whole-request timeout. `None` leaves abandoned requests to the caller.
    pub request_secs: Option<u64>,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifyConfig {
    pub api_key: String,
    pub endpoint: String,
    pub streaming: bool,
    pub timeouts: UpstreamTimeouts,
}

impl DifyConfig {
    /// Build typed upstream config from environment variables.
    ///
    /// Required:
    /// - `DIFY_API_KEY`
    ///
    /// Optional:
    /// - `DIFY_ENDPOINT`: default [`DEFAULT_DIFY_ENDPOINT`]
    /// - `DIFY_STREAMING`: `true` (default) or `false`
    /// - `DIFY_CONNECT_TIMEOUT_SECS`: default 10
    /// - `DIFY_REQUEST_TIMEOUT_SECS`: unset by default (no request timeout)
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or a value does not parse.
    pub fn from_env() -> Result<Self, UpstreamError> {
        let api_key = std::env::var("DIFY_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| UpstreamError::MissingApiKey { var: "DIFY_API_KEY".into() })?;

        let endpoint = std::env::var("DIFY_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DIFY_ENDPOINT.to_string());
        let streaming = parse_bool("DIFY_STREAMING", std::env::var("DIFY_STREAMING").ok().as_deref(), true)?;
        let timeouts = UpstreamTimeouts {
            request_secs: std::env::var("DIFY_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok()),
            connect_secs: env_parse_u64("DIFY_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_key, endpoint, streaming, timeouts })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

pub(crate) fn parse_bool(key: &str, raw: Option<&str>, default: bool) -> Result<bool, UpstreamError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(UpstreamError::ConfigParse(format!("invalid boolean for {key}: {other}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
