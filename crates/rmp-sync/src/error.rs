//! Error types for the sync engine

use rmp_protocol::ProtocolError;
use thiserror::Error;

/// Failure on the telemetry or device link
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error on the underlying port or socket
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Simulator telemetry channel failure
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// Panel device failure
    #[error("device error: {0}")]
    Device(String),

    /// The link has already been closed
    #[error("link closed")]
    Closed,
}

/// Errors that can occur in the sync engine
#[derive(Debug, Error)]
pub enum SyncError {
    /// Protocol error (bad frequency, unrecognized input)
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Transport error
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration rejected
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    /// Returns true if the error came from the telemetry or device link
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true if a panel line matched no known token
    pub fn is_unrecognized_input(&self) -> bool {
        matches!(self, Self::Protocol(ProtocolError::UnrecognizedInput(_)))
    }
}
