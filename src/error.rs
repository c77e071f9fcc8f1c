//! Error types for influxdb-line-writer.

use thiserror::Error;

/// Error type for influxdb-line-writer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A measurement, tag key or field key is empty.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The point carries no fields.
    #[error("Point '{measurement}' has no fields")]
    EmptyFieldSet {
        /// Measurement of the rejected point.
        measurement: String,
    },

    /// A value has no representation in line protocol.
    #[error("Unsupported value: {message}")]
    UnsupportedValue {
        /// Description of the rejected value.
        message: String,
    },

    /// A field value of a type with no line protocol formatting.
    #[error("Unsupported field type '{type_name}' for field '{field}'")]
    UnsupportedType {
        /// Key of the offending field.
        field: String,
        /// Name of the value's type.
        type_name: String,
    },

    /// Invalid client configuration.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to (de)serialize configuration as JSON.
    #[error("Failed to serialize configuration: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server rejected the batch as malformed (HTTP 400).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The target database does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server failed to handle the batch (HTTP 500).
    #[error("Server error: {0}")]
    Server(String),

    /// A response header the client relies on was absent or unreadable.
    #[error("Missing header: {0}")]
    MissingHeader(String),

    /// I/O error on a socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for influxdb-line-writer operations.
pub type Result<T> = std::result::Result<T, Error>;
