//! Error types for panel protocol parsing and encoding

use thiserror::Error;

/// Errors produced by the frequency codec, frame codec and input parser
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Malformed textual or digit frequency input
    #[error("invalid frequency format: {0}")]
    Format(String),

    /// Frequency field outside the encodable band
    #[error("{field} {value} is out of range")]
    Range {
        /// Which half of the frequency was rejected ("prefix" or "suffix")
        field: &'static str,
        /// The offending value
        value: u16,
    },

    /// Inbound line matches no known token
    #[error("unrecognized input: {0:?}")]
    UnrecognizedInput(String),

    /// Malformed wire frame
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

impl ProtocolError {
    /// Returns true for errors raised by the frequency codec
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::Format(_) | Self::Range { .. })
    }
}
