//! Service configuration parsed from environment variables.
//!
//! Every bot reads the same listener and retention knobs; provider-specific
//! settings live next to their clients (`llm::config`, `tts::config`).

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_RETENTION_SECS: u64 = 86_400;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3_600;

/// Parse `key` from the environment, falling back to `default` when the
/// variable is unset or does not parse.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Request and connect timeouts for an outbound provider client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Build a `reqwest` client honoring the configured timeouts.
pub(crate) fn build_http_client(timeouts: HttpTimeouts) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
}

/// Listener address and store maintenance settings shared by all bots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Records older than this are evicted by the sweep.
    pub retention: Duration,
    /// Period between two sweeps.
    pub sweep_interval: Duration,
}

impl ServiceConfig {
    /// Read `HOST`, `PORT`, `RETENTION_SECS` and `SWEEP_INTERVAL_SECS`.
    #[must_use]
    pub fn from_env(default_port: u16) -> Self {
        let host = std::env::var("HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        // A zero interval would make `tokio::time::interval` panic.
        let sweep_secs = env_parse("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS).max(1);
        Self {
            host,
            port: env_parse("PORT", default_port),
            retention: Duration::from_secs(env_parse("RETENTION_SECS", DEFAULT_RETENTION_SECS)),
            sweep_interval: Duration::from_secs(sweep_secs),
        }
    }

    /// Socket address to bind, e.g. `0.0.0.0:8000` or `[::]:8000`.
    ///
    /// # Errors
    ///
    /// Returns an error if `host` is not a valid IPv4 or IPv6 address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let ip: IpAddr = self.host.trim().parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

// =============================================================================
// BOT-SPECIFIC SETTINGS
// =============================================================================

pub const VOICE_BOT_PORT: u16 = 8000;
pub const EMAIL_BOT_PORT: u16 = 8001;
pub const ASSISTANT_BOT_PORT: u16 = 5000;
pub const DEFAULT_DELIVERY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_FAQ_PATH: &str = "faq_database.json";

/// `AUDIO_DIR`, or the system temp directory.
#[must_use]
pub fn audio_dir() -> PathBuf {
    std::env::var_os("AUDIO_DIR")
        .filter(|v| !v.is_empty())
        .map_or_else(std::env::temp_dir, PathBuf::from)
}

/// `EMAIL_DELIVERY_DELAY_MS` as a duration.
#[must_use]
pub fn delivery_delay() -> Duration {
    Duration::from_millis(env_parse("EMAIL_DELIVERY_DELAY_MS", DEFAULT_DELIVERY_DELAY_MS))
}

/// `FAQ_PATH`, or `faq_database.json` in the working directory.
#[must_use]
pub fn faq_path() -> PathBuf {
    std::env::var_os("FAQ_PATH")
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_FAQ_PATH), PathBuf::from)
}

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) fn test_env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
