//! Connection configuration for the write clients.

use std::time::Duration;

use go_parse_duration::parse_duration;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::precision::Precision;

/// Username and password sent as HTTP basic auth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Create credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Settings for [`HttpClient`](crate::HttpClient).
///
/// Every field except `database` has a default, so a minimal JSON document is:
///
/// ```
/// use influxdb_line_writer::ClientConfig;
///
/// let config = ClientConfig::from_json(r#"{ "database": "telemetry", "timeout": "2s" }"#)?;
/// assert_eq!(config.server, "localhost");
/// assert_eq!(config.port, 8086);
/// assert_eq!(config.timeout_duration()?.as_secs(), 2);
/// # Ok::<(), influxdb_line_writer::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Host name or IP address of the server.
    #[serde(default = "default_server")]
    pub server: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Target database.
    pub database: String,
    /// Optional basic auth credentials.
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Timestamp precision for encoded batches.
    #[serde(default)]
    pub precision: Precision,
    /// Request timeout as a Go-style duration ("10s", "1m30s").
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

fn default_server() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8086
}

fn default_timeout() -> String {
    "10s".to_string()
}

impl ClientConfig {
    /// Configuration with defaults for everything but the database.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            server: default_server(),
            port: default_port(),
            database: database.into(),
            credentials: None,
            precision: Precision::default(),
            timeout: default_timeout(),
        }
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can produce a usable client.
    pub fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            return Err(config_error("server must not be empty"));
        }
        if self.port == 0 {
            return Err(config_error("port must be between 1 and 65535"));
        }
        if self.database.trim().is_empty() {
            return Err(config_error("database must not be empty"));
        }
        self.timeout_duration()?;
        Ok(())
    }

    /// The request timeout as a [`Duration`].
    pub fn timeout_duration(&self) -> Result<Duration> {
        let nanos = parse_duration(&self.timeout)
            .map_err(|_| config_error(format!("invalid timeout '{}'", self.timeout)))?;
        let nanos = u64::try_from(nanos)
            .map_err(|_| config_error(format!("timeout '{}' is negative", self.timeout)))?;
        Ok(Duration::from_nanos(nanos))
    }
}

fn config_error(message: impl Into<String>) -> Error {
    Error::Config {
        message: message.into(),
    }
}
