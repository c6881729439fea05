//! Display configuration from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `SPOOLDESK_HOST` (or `DEVICE_HOST`) | `localhost` | device host, optionally `host:port` |
//! | `SPOOLDESK_RECONNECT_MS` | `5000` | delay before each reconnect attempt |
//! | `SPOOLDESK_HEARTBEAT_MS` | `5000` | liveness heartbeat period |

use std::time::Duration;

use url::Url;

// Device cadence defaults
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5_000);
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(5_000);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive number of milliseconds, got {value:?}")]
    InvalidDuration { name: &'static str, value: String },
    #[error("Host {host:?} does not form a valid endpoint: {reason}")]
    InvalidHost { host: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    pub host: String,
    pub reconnect_delay: Duration,
    pub heartbeat_interval: Duration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}

impl DisplayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("SPOOLDESK_HOST")
            .or_else(|| lookup("DEVICE_HOST"))
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let config = Self {
            host,
            reconnect_delay: millis(&lookup, "SPOOLDESK_RECONNECT_MS", DEFAULT_RECONNECT_DELAY)?,
            heartbeat_interval: millis(
                &lookup,
                "SPOOLDESK_HEARTBEAT_MS",
                DEFAULT_HEARTBEAT_INTERVAL,
            )?,
        };
        config.validate_endpoint()?;
        Ok(config)
    }

    /// The device's WebSocket endpoint, `ws://<host>/ws`.
    pub fn endpoint(&self) -> String {
        format!("ws://{}/ws", self.host)
    }

    fn validate_endpoint(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidHost {
            host: self.host.clone(),
            reason,
        };
        let url = Url::parse(&self.endpoint()).map_err(|e| invalid(e.to_string()))?;
        if url.path() != "/ws" {
            return Err(invalid("host must not contain a path".to_string()));
        }
        Ok(())
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidDuration { name, value: raw }),
    }
}
