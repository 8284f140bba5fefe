//! Radio Management Panel Protocol Library
//!
//! This crate provides the wire protocol spoken between the host and a
//! serial cockpit radio management panel (RMP):
//!
//! - **Frequency codec**: text (`118.300`), six-digit telemetry (`118300`)
//!   and packed 16-bit forms of a COM frequency
//! - **Wire frames**: fixed 4-byte `0xFF`-prefixed commands sent to the panel
//! - **Panel input**: newline-terminated text events sent by the panel
//!
//! # Example
//!
//! ```rust
//! use rmp_protocol::{EncodeFrame, Frequency, PanelInput, ControlEvent, WireFrame};
//!
//! let freq = Frequency::parse_digits(118_300).unwrap();
//! let frame = WireFrame::active_frequency(&freq).unwrap();
//! assert_eq!(frame.encode(), vec![0xFF, 0x01, 0x49, 0x2C]);
//!
//! let input = PanelInput::parse_line("cmd=Swap\n").unwrap();
//! assert_eq!(input, PanelInput::Control(ControlEvent::Swap));
//! ```

pub mod error;
pub mod frame;
pub mod frequency;
pub mod input;

pub use error::ProtocolError;
pub use frame::{FrameCodec, FrameCommand, WireFrame, FRAME_LEN, SENTINEL};
pub use frequency::{Frequency, PREFIX_MAX, PREFIX_MIN, SUFFIX_MAX};
pub use input::{ControlEvent, PanelInput};

/// Trait for messages that can be encoded to bytes
pub trait EncodeFrame {
    /// Encode this message to its wire format
    fn encode(&self) -> Vec<u8>;
}
