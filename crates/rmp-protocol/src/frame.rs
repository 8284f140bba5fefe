//! Outbound wire frames (host -> panel)
//!
//! Every frame is exactly four bytes:
//!
//! ```text
//! [0xFF] [CMD] [P1] [P2]
//! ```
//!
//! - Byte 0: sentinel marking the start of a frame
//! - Byte 1: command code
//! - Bytes 2-3: payload. Frequencies use the packed 16-bit form from
//!   [`crate::frequency`]; brightness and power put their value in P1 and
//!   leave P2 zero.

use crate::error::ProtocolError;
use crate::frequency::Frequency;
use crate::EncodeFrame;

/// Start-of-frame marker
pub const SENTINEL: u8 = 0xFF;

/// Total frame length in bytes
pub const FRAME_LEN: usize = 4;

/// Panel command codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameCommand {
    /// Show a frequency in the standby window
    SetStandbyFrequency = 0x00,
    /// Show a frequency in the active window
    SetActiveFrequency = 0x01,
    /// Set display backlight level
    SetBrightness = 0x02,
    /// Switch the panel on or off
    SetPower = 0x03,
}

impl FrameCommand {
    /// Command byte as sent on the wire
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FrameCommand {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::SetStandbyFrequency),
            0x01 => Ok(Self::SetActiveFrequency),
            0x02 => Ok(Self::SetBrightness),
            0x03 => Ok(Self::SetPower),
            _ => Err(ProtocolError::InvalidFrame(format!(
                "unknown command 0x{:02X}",
                value
            ))),
        }
    }
}

/// A single 4-byte panel frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFrame {
    command: FrameCommand,
    payload: [u8; 2],
}

impl WireFrame {
    /// Build a frame from a command and raw payload
    pub fn new(command: FrameCommand, payload: [u8; 2]) -> Self {
        Self { command, payload }
    }

    /// Active window frequency frame
    pub fn active_frequency(freq: &Frequency) -> Result<Self, ProtocolError> {
        Ok(Self::new(FrameCommand::SetActiveFrequency, freq.encode()?))
    }

    /// Standby window frequency frame
    pub fn standby_frequency(freq: &Frequency) -> Result<Self, ProtocolError> {
        Ok(Self::new(FrameCommand::SetStandbyFrequency, freq.encode()?))
    }

    /// Backlight level frame
    pub fn brightness(level: u8) -> Self {
        Self::new(FrameCommand::SetBrightness, [level, 0x00])
    }

    /// Power frame
    pub fn power(on: bool) -> Self {
        Self::new(FrameCommand::SetPower, [u8::from(on), 0x00])
    }

    /// Command carried by this frame
    pub fn command(&self) -> FrameCommand {
        self.command
    }

    /// Raw payload bytes
    pub fn payload(&self) -> [u8; 2] {
        self.payload
    }

    /// Decode the payload as a frequency (frequency commands only)
    pub fn frequency(&self) -> Option<Result<Frequency, ProtocolError>> {
        match self.command {
            FrameCommand::SetActiveFrequency | FrameCommand::SetStandbyFrequency => {
                Some(Frequency::decode(self.payload))
            }
            _ => None,
        }
    }

    /// Serialize to the fixed 4-byte layout
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        [SENTINEL, self.command.code(), self.payload[0], self.payload[1]]
    }

    /// Parse exactly one frame
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() != FRAME_LEN {
            return Err(ProtocolError::InvalidFrame(format!(
                "expected {} bytes, got {}",
                FRAME_LEN,
                bytes.len()
            )));
        }
        if bytes[0] != SENTINEL {
            return Err(ProtocolError::InvalidFrame(format!(
                "missing sentinel, got 0x{:02X}",
                bytes[0]
            )));
        }
        let command = FrameCommand::try_from(bytes[1])?;
        Ok(Self::new(command, [bytes[2], bytes[3]]))
    }
}

impl EncodeFrame for WireFrame {
    fn encode(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }
}

/// Streaming frame parser for the panel side of the link
///
/// Payload bytes may legitimately be `0xFF`, so the parser only hunts for a
/// sentinel while it is out of step. A sentinel followed by an unknown
/// command byte is discarded one byte at a time until alignment is found.
#[derive(Debug, Default)]
pub struct FrameCodec {
    buffer: Vec<u8>,
}

impl FrameCodec {
    /// Create an empty codec
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(FRAME_LEN * 4),
        }
    }

    /// Push raw bytes received from the host
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to extract the next complete frame
    pub fn next_frame(&mut self) -> Option<WireFrame> {
        loop {
            let start = self.buffer.iter().position(|&b| b == SENTINEL);
            match start {
                Some(0) => {}
                Some(skip) => {
                    tracing::debug!("Dropping {} bytes before frame sentinel", skip);
                    self.buffer.drain(..skip);
                }
                None => {
                    self.buffer.clear();
                    return None;
                }
            }

            if self.buffer.len() < FRAME_LEN {
                return None;
            }

            match WireFrame::parse(&self.buffer[..FRAME_LEN]) {
                Ok(frame) => {
                    self.buffer.drain(..FRAME_LEN);
                    return Some(frame);
                }
                Err(e) => {
                    tracing::warn!("Resynchronising frame stream: {}", e);
                    self.buffer.drain(..1);
                }
            }
        }
    }

    /// Number of buffered bytes not yet parsed
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the internal buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
