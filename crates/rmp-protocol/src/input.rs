//! Inbound text protocol (panel -> host)
//!
//! The panel reports one event per newline-terminated line:
//!
//! ```text
//! reset
//! cmd=OuterUp
//! cmd=OuterDown
//! cmd=InnerUp
//! cmd=InnerDown
//! cmd=Swap
//! ```
//!
//! Tokens are case-sensitive. `reset` is sent when the panel reboots and
//! has lost its display contents.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Prefix of control event lines
pub const CONTROL_PREFIX: &str = "cmd=";

/// Token announcing a panel reboot
pub const RESET_TOKEN: &str = "reset";

/// A physical control on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlEvent {
    /// Outer (MHz) knob clockwise
    OuterUp,
    /// Outer (MHz) knob counter-clockwise
    OuterDown,
    /// Inner (kHz) knob clockwise
    InnerUp,
    /// Inner (kHz) knob counter-clockwise
    InnerDown,
    /// Transfer button
    Swap,
}

impl ControlEvent {
    /// Every control event, in wire-token order
    pub const ALL: [ControlEvent; 5] = [
        Self::OuterUp,
        Self::OuterDown,
        Self::InnerUp,
        Self::InnerDown,
        Self::Swap,
    ];

    /// Token after the `cmd=` prefix
    pub fn token(&self) -> &'static str {
        match self {
            Self::OuterUp => "OuterUp",
            Self::OuterDown => "OuterDown",
            Self::InnerUp => "InnerUp",
            Self::InnerDown => "InnerDown",
            Self::Swap => "Swap",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.token() == token)
    }
}

/// A decoded panel line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelInput {
    /// Panel rebooted; every display value must be resent
    Reset,
    /// A knob or button was operated
    Control(ControlEvent),
}

impl PanelInput {
    /// Parse one line, ignoring trailing whitespace and line terminators
    pub fn parse_line(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim_end();
        if line == RESET_TOKEN {
            return Ok(Self::Reset);
        }

        line.strip_prefix(CONTROL_PREFIX)
            .and_then(ControlEvent::from_token)
            .map(Self::Control)
            .ok_or_else(|| ProtocolError::UnrecognizedInput(line.to_string()))
    }
}

impl FromStr for PanelInput {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_line(s)
    }
}

impl fmt::Display for PanelInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str(RESET_TOKEN),
            Self::Control(event) => write!(f, "{}{}", CONTROL_PREFIX, event.token()),
        }
    }
}
