//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Key | Default |
//! |---|---|
//! | `LISTEN_ADDR` | `0.0.0.0:3000` |
//! | `DEVICE_HOST` | `127.0.0.1` |
//! | `DEVICE_PORT` | `5007` |
//! | `RELAY_CONNECT_TIMEOUT_MS` | `3000` |
//! | `RELAY_READ_TIMEOUT_MS` | `5000` |
//! | `POLL_INTERVAL_SECS` | `10` |
//! | `POLL_STARTUP_DELAY_SECS` | `3` |
//! | `PROBE_TIMEOUT_MS` | `3000` |
//! | `POLLER_ENABLED` | `true` |
//! | `WS_CLIENT_BUFFER` | `256` |
//! | `LOG_FORMAT` | `text` |

use std::net::{AddrParseError, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::monitor::PollerSettings;
use crate::relay::RelaySettings;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Host of the box controller.
    pub device_host: String,

    /// Command port of the box controller.
    pub device_port: u16,

    /// Relay connect timeout in milliseconds.
    pub relay_connect_timeout_ms: u64,

    /// Relay read timeout in milliseconds.
    pub relay_read_timeout_ms: u64,

    /// Seconds between reachability probes.
    pub poll_interval_secs: u64,

    /// Seconds to wait after startup before the first probe.
    pub poll_startup_delay_secs: u64,

    /// Bound on a single reachability probe in milliseconds.
    pub probe_timeout_ms: u64,

    /// Master switch for the reachability poller.
    pub poller_enabled: bool,

    /// Outbound queue capacity per WebSocket client.
    pub ws_client_buffer: usize,

    /// Log output format.
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, AddrParseError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AddrParseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()?;

        let device_host = lookup("DEVICE_HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "127.0.0.1".to_string());

        Ok(Self {
            listen_addr,
            device_host,
            device_port: parse_or(&lookup, "DEVICE_PORT", 5007),
            relay_connect_timeout_ms: parse_or(&lookup, "RELAY_CONNECT_TIMEOUT_MS", 3000),
            relay_read_timeout_ms: parse_or(&lookup, "RELAY_READ_TIMEOUT_MS", 5000),
            poll_interval_secs: parse_or(&lookup, "POLL_INTERVAL_SECS", 10),
            poll_startup_delay_secs: parse_or(&lookup, "POLL_STARTUP_DELAY_SECS", 3),
            probe_timeout_ms: parse_or(&lookup, "PROBE_TIMEOUT_MS", 3000),
            poller_enabled: parse_bool_or(&lookup, "POLLER_ENABLED", true),
            ws_client_buffer: parse_or(&lookup, "WS_CLIENT_BUFFER", 256),
            log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Text),
        })
    }

    /// Relay client settings derived from this configuration.
    #[must_use]
    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            host: self.device_host.clone(),
            port: self.device_port,
            connect_timeout: Duration::from_millis(self.relay_connect_timeout_ms),
            read_timeout: Duration::from_millis(self.relay_read_timeout_ms),
        }
    }

    /// Poller timing derived from this configuration. A zero interval is
    /// raised to one second.
    #[must_use]
    pub fn poller_settings(&self) -> PollerSettings {
        PollerSettings {
            interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            startup_delay: Duration::from_secs(self.poll_startup_delay_secs),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
        }
    }
}

/// Parses `key` as `T`, returning `default` on missing or invalid values.
fn parse_or<T: FromStr, F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses `key` as a boolean. Accepts `"true"`, `"1"`, `"false"`, `"0"`
/// (case-insensitive). Returns `default` otherwise.
fn parse_bool_or<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, default: bool) -> bool {
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
