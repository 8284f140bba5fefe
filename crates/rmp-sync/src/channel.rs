//! Synchronized panel channels
//!
//! A channel is one piece of display state the panel shows. Each channel
//! maps to exactly one frame command and carries one kind of value.

use rmp_protocol::{FrameCommand, Frequency, ProtocolError, WireFrame};
use serde::{Deserialize, Serialize};

/// Identifies a synchronized display channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelId {
    /// Active window frequency
    ActiveFrequency,
    /// Standby window frequency
    StandbyFrequency,
    /// Backlight level
    Brightness,
    /// Panel power
    Power,
}

impl ChannelId {
    /// All channels in the order they are synchronized each tick
    pub const ALL: [ChannelId; 4] = [
        Self::ActiveFrequency,
        Self::StandbyFrequency,
        Self::Brightness,
        Self::Power,
    ];

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::ActiveFrequency => "active frequency",
            Self::StandbyFrequency => "standby frequency",
            Self::Brightness => "brightness",
            Self::Power => "power",
        }
    }

    /// Frame command that updates this channel on the panel
    pub fn frame_command(&self) -> FrameCommand {
        match self {
            Self::ActiveFrequency => FrameCommand::SetActiveFrequency,
            Self::StandbyFrequency => FrameCommand::SetStandbyFrequency,
            Self::Brightness => FrameCommand::SetBrightness,
            Self::Power => FrameCommand::SetPower,
        }
    }

    /// Returns true for the two frequency windows
    pub fn is_frequency(&self) -> bool {
        matches!(self, Self::ActiveFrequency | Self::StandbyFrequency)
    }
}

/// A value last written to (or about to be written to) a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelValue {
    /// Frequency window contents
    Frequency(Frequency),
    /// Backlight level
    Level(u8),
    /// On/off switch
    Switch(bool),
}

impl ChannelValue {
    /// Build the frame that shows this value on `channel`
    pub fn to_frame(&self, channel: ChannelId) -> Result<WireFrame, ProtocolError> {
        match (channel, self) {
            (ChannelId::ActiveFrequency, Self::Frequency(freq)) => {
                WireFrame::active_frequency(freq)
            }
            (ChannelId::StandbyFrequency, Self::Frequency(freq)) => {
                WireFrame::standby_frequency(freq)
            }
            (ChannelId::Brightness, Self::Level(level)) => Ok(WireFrame::brightness(*level)),
            (ChannelId::Power, Self::Switch(on)) => Ok(WireFrame::power(*on)),
            (channel, value) => Err(ProtocolError::InvalidFrame(format!(
                "{:?} cannot be shown on {}",
                value,
                channel.name()
            ))),
        }
    }
}
