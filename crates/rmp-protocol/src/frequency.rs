//! COM radio frequency representation
//!
//! A frequency is carried as two three-digit halves: the MHz `prefix`
//! (118..=136 for the aviation COM band) and the kHz `suffix` (000..=999,
//! 8.33 kHz channel names). The panel receives it packed into 16 bits:
//!
//! ```text
//!  15          10 9                    0
//! +--------------+----------------------+
//! | prefix - 100 |        suffix        |
//! +--------------+----------------------+
//! ```
//!
//! Example: 118.300 = prefix bits 18, suffix 300 = `0x49 0x2C`.
//!
//! The reserved value `888.888` lights every segment for a lamp test. It
//! bypasses the band check and encodes with an all-zero prefix field.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Lowest encodable prefix (MHz)
pub const PREFIX_MIN: u16 = 118;
/// Highest encodable prefix (MHz)
pub const PREFIX_MAX: u16 = 136;
/// Highest suffix value (kHz)
pub const SUFFIX_MAX: u16 = 999;

const PREFIX_OFFSET: u16 = 100;
const SUFFIX_BITS: u32 = 10;
const SUFFIX_MASK: u16 = (1 << SUFFIX_BITS) - 1;
const TEST_VALUE: u16 = 888;

/// A two-part COM frequency, e.g. 118.300
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frequency {
    prefix: u16,
    suffix: u16,
}

impl Frequency {
    /// Lamp-test value shown while the panel self-test is active
    pub const TEST: Frequency = Frequency {
        prefix: TEST_VALUE,
        suffix: TEST_VALUE,
    };

    /// Create a frequency from its halves
    ///
    /// No validation happens here; [`Frequency::encode`] enforces the band.
    pub const fn new(prefix: u16, suffix: u16) -> Self {
        Self { prefix, suffix }
    }

    /// MHz part
    pub fn prefix(&self) -> u16 {
        self.prefix
    }

    /// kHz part
    pub fn suffix(&self) -> u16 {
        self.suffix
    }

    /// Returns true for the lamp-test sentinel
    pub fn is_test(&self) -> bool {
        *self == Self::TEST
    }

    /// Returns true if the frequency can be encoded without error
    pub fn is_encodable(&self) -> bool {
        self.is_test()
            || ((PREFIX_MIN..=PREFIX_MAX).contains(&self.prefix) && self.suffix <= SUFFIX_MAX)
    }

    /// Frequency in kHz (118.300 -> 118300)
    pub fn as_khz(&self) -> u32 {
        u32::from(self.prefix) * 1000 + u32::from(self.suffix)
    }

    /// Parse the `ppp.sss` text form
    pub fn parse_text(value: &str) -> Result<Self, ProtocolError> {
        let bytes = value.as_bytes();
        if bytes.len() != 7 {
            return Err(ProtocolError::Format(format!(
                "expected 7 characters (ppp.sss), got {} in {:?}",
                bytes.len(),
                value
            )));
        }
        if bytes[3] != b'.' {
            return Err(ProtocolError::Format(format!(
                "expected '.' at position 3 in {:?}",
                value
            )));
        }

        let prefix = parse_three_digits(&bytes[..3], value)?;
        let suffix = parse_three_digits(&bytes[4..], value)?;
        Ok(Self { prefix, suffix })
    }

    /// Split a six-digit integer into prefix and suffix (118300 -> 118.300)
    pub fn parse_digits(value: u32) -> Result<Self, ProtocolError> {
        if !(100_000..=999_999).contains(&value) {
            return Err(ProtocolError::Format(format!(
                "expected exactly 6 digits, got {} ({})",
                value.to_string().len(),
                value
            )));
        }
        Ok(Self {
            prefix: (value / 1000) as u16,
            suffix: (value % 1000) as u16,
        })
    }

    /// Convert a numeric telemetry reading (e.g. `118300.0`)
    ///
    /// The reading is rounded to the nearest integer before being split.
    pub fn from_reading(raw: f64) -> Result<Self, ProtocolError> {
        if !raw.is_finite() || raw < 0.0 {
            return Err(ProtocolError::Format(format!(
                "telemetry reading {} is not a frequency",
                raw
            )));
        }
        let rounded = raw.round();
        if rounded > f64::from(u32::MAX) {
            return Err(ProtocolError::Format(format!(
                "expected exactly 6 digits, got {}",
                rounded
            )));
        }
        Self::parse_digits(rounded as u32)
    }

    /// Pack into the 16-bit wire representation (big-endian)
    pub fn encode(&self) -> Result<[u8; 2], ProtocolError> {
        let prefix_bits = if self.is_test() {
            0
        } else {
            if !(PREFIX_MIN..=PREFIX_MAX).contains(&self.prefix) {
                return Err(ProtocolError::Range {
                    field: "prefix",
                    value: self.prefix,
                });
            }
            self.prefix - PREFIX_OFFSET
        };

        if self.suffix > SUFFIX_MAX {
            return Err(ProtocolError::Range {
                field: "suffix",
                value: self.suffix,
            });
        }

        let packed = (prefix_bits << SUFFIX_BITS) | self.suffix;
        Ok(packed.to_be_bytes())
    }

    /// Unpack the 16-bit wire representation
    pub fn decode(bytes: [u8; 2]) -> Result<Self, ProtocolError> {
        let packed = u16::from_be_bytes(bytes);
        let prefix_bits = packed >> SUFFIX_BITS;
        let suffix = packed & SUFFIX_MASK;

        if prefix_bits == 0 {
            if suffix == TEST_VALUE {
                return Ok(Self::TEST);
            }
            return Err(ProtocolError::InvalidFrame(format!(
                "zero prefix with suffix {}",
                suffix
            )));
        }

        let prefix = prefix_bits + PREFIX_OFFSET;
        if !(PREFIX_MIN..=PREFIX_MAX).contains(&prefix) {
            return Err(ProtocolError::Range {
                field: "prefix",
                value: prefix,
            });
        }
        if suffix > SUFFIX_MAX {
            return Err(ProtocolError::Range {
                field: "suffix",
                value: suffix,
            });
        }

        Ok(Self { prefix, suffix })
    }
}

fn parse_three_digits(digits: &[u8], whole: &str) -> Result<u16, ProtocolError> {
    digits.iter().try_fold(0u16, |acc, &b| {
        if b.is_ascii_digit() {
            Ok(acc * 10 + u16::from(b - b'0'))
        } else {
            Err(ProtocolError::Format(format!(
                "non-digit {:?} in {:?}",
                b as char, whole
            )))
        }
    })
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}.{:03}", self.prefix, self.suffix)
    }
}

impl FromStr for Frequency {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_text(s)
    }
}
