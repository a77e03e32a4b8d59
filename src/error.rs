//! Error types for telemetry ingestion.
//!
//! Two layers of errors exist in this crate:
//!
//! - [`DecodeError`] is produced by the frame codec when a datagram cannot be
//!   turned into a [`TelemetrySample`](crate::TelemetrySample). It never
//!   leaves the receiver task; the datagram is simply dropped.
//! - [`TelemetryError`] covers everything an application can observe:
//!   configuration problems, address resolution, socket binding and the
//!   receiver task itself.
//!
//! ## Error Categories
//!
//! - **Startup Errors**: invalid configuration, unresolvable address, bind failure
//! - **Stream Errors**: transient socket receive failures, malformed datagrams
//! - **Output Errors**: overlay serialization failures
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use rallywire::TelemetryError;
//!
//! let error = TelemetryError::invalid_address("not-an-address");
//! assert!(!error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Failure to decode a single datagram into a sample.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("Datagram too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("Field '{field}' at offset {offset} lies outside the record")]
    FieldOutOfBounds { field: &'static str, offset: usize },
}

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Invalid listen address '{addr}'")]
    InvalidAddress {
        addr: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Failed to bind UDP socket on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to receive datagram")]
    Receive {
        #[source]
        source: std::io::Error,
    },

    #[error("Frame decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Configuration error in {context}: {details}")]
    Config { context: String, details: String },

    #[error("Configuration file error: {path}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to serialize overlay frame")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("Receiver task failed")]
    Join {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Bind { .. } => true,
            TelemetryError::Receive { .. } => true,
            TelemetryError::InvalidAddress { .. } => false,
            TelemetryError::Decode(_) => false,
            TelemetryError::Config { .. } => false,
            TelemetryError::ConfigFile { .. } => false,
            TelemetryError::Serialize { .. } => false,
            TelemetryError::Join { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::InvalidAddress { .. } => vec![
                "Use a host:port pair such as 127.0.0.1:20777",
                "Check that the host name resolves on this machine",
            ],
            TelemetryError::Bind { .. } => vec![
                "Check that no other telemetry tool is listening on the same port",
                "Pick a different port and update the game's UDP settings",
                "Bind to a local interface address",
            ],
            TelemetryError::Receive { .. } => vec![
                "Check that the simulator is still running",
                "Verify the UDP port is not blocked by a firewall",
            ],
            TelemetryError::Decode(_) => vec![
                "Enable extradata=3 in the game's hardware_settings_config.xml",
                "Check that only the simulator sends to this port",
            ],
            TelemetryError::Config { .. } => vec![
                "Check configuration values",
                "Remove overrides to fall back to defaults",
            ],
            TelemetryError::ConfigFile { .. } => vec![
                "Check the file exists and is readable",
                "Verify the YAML syntax",
            ],
            TelemetryError::Serialize { .. } => vec!["Report the sample that failed to serialize"],
            TelemetryError::Join { .. } => vec![
                "Inspect the logs for a panic in the receiver task",
                "Restart the listener",
            ],
        }
    }

    /// Helper constructor for unparseable or unresolvable addresses.
    pub fn invalid_address(addr: impl Into<String>) -> Self {
        TelemetryError::InvalidAddress { addr: addr.into(), source: None }
    }

    /// Helper constructor for address resolution failures.
    pub fn invalid_address_with_source(addr: impl Into<String>, source: std::io::Error) -> Self {
        TelemetryError::InvalidAddress { addr: addr.into(), source: Some(source) }
    }

    /// Helper constructor for socket bind failures.
    pub fn bind_failed(addr: SocketAddr, source: std::io::Error) -> Self {
        TelemetryError::Bind { addr, source }
    }

    /// Helper constructor for socket receive failures.
    pub fn receive_failed(source: std::io::Error) -> Self {
        TelemetryError::Receive { source }
    }

    /// Helper constructor for configuration validation errors.
    pub fn config(context: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::Config { context: context.into(), details: details.into() }
    }

    /// Helper constructor for configuration file errors.
    pub fn config_file(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        TelemetryError::ConfigFile { path: path.into(), source: source.into() }
    }
}

impl From<serde_json::Error> for TelemetryError {
    fn from(err: serde_json::Error) -> Self {
        TelemetryError::Serialize { source: err }
    }
}

impl From<tokio::task::JoinError> for TelemetryError {
    fn from(err: tokio::task::JoinError) -> Self {
        TelemetryError::Join { source: err }
    }
}
