//! Server configuration parsed from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Directory holding the built browser client, served at `/`.
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Build server config from environment variables.
    ///
    /// - `PORT`: default 3000
    /// - `BIND_ADDR`: default `0.0.0.0`
    /// - `STATIC_DIR`: optional
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` or `BIND_ADDR` is set but does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match non_empty_var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };
        let bind_addr = match non_empty_var("BIND_ADDR") {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::Invalid { key: "BIND_ADDR", value: raw })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let static_dir = non_empty_var("STATIC_DIR").map(PathBuf::from);

        Ok(Self { bind_addr, port, static_dir })
    }

    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
