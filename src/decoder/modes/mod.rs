//! QR data mode decoders
//!
//! Each decoder consumes one segment body from a [`BitReader`] after the
//! mode indicator and character count have been read:
//! - Numeric: digits packed three per 10 bits
//! - Alphanumeric: 45-character set packed two per 11 bits
//! - Byte: raw 8-bit data, interpreted with the active character set
//! - Kanji / Hanzi: 13-bit double-byte characters
//! - ECI: character set designators
//!
//! [`BitReader`]: crate::decoder::bitstream::BitReader

pub mod alphanumeric;
pub mod byte;
pub mod eci;
pub mod kanji;
pub mod numeric;

use crate::config::BarcodeFormat;
use crate::error::NoSymbolFoundError;
use crate::models::Version;

/// Segment mode indicator (4 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// End of data
    Terminator,
    /// Digits
    Numeric,
    /// Alphanumeric characters
    Alphanumeric,
    /// Structured append header
    StructuredAppend,
    /// 8-bit bytes
    Byte,
    /// GS1 data follows
    Fnc1FirstPosition,
    /// ECI designator
    Eci,
    /// Shift JIS double-byte characters
    Kanji,
    /// AIM application indicator follows
    Fnc1SecondPosition,
    /// GB 2312 double-byte characters
    Hanzi,
}

impl Mode {
    /// Mode for a 4-bit indicator
    pub fn from_bits(bits: u32) -> Result<Self, NoSymbolFoundError> {
        Ok(match bits {
            0x0 => Mode::Terminator,
            0x1 => Mode::Numeric,
            0x2 => Mode::Alphanumeric,
            0x3 => Mode::StructuredAppend,
            0x4 => Mode::Byte,
            0x5 => Mode::Fnc1FirstPosition,
            0x7 => Mode::Eci,
            0x8 => Mode::Kanji,
            0x9 => Mode::Fnc1SecondPosition,
            0xD => Mode::Hanzi,
            _ => return Err(malformed()),
        })
    }

    /// Width of the character count field for this mode at `version`
    pub fn count_bits(&self, version: Version) -> usize {
        let tier = match version.number() {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        let widths = match self {
            Mode::Numeric => [10, 12, 14],
            Mode::Alphanumeric => [9, 11, 13],
            Mode::Byte => [8, 16, 16],
            Mode::Kanji | Mode::Hanzi => [8, 10, 12],
            _ => [0, 0, 0],
        };
        widths[tier]
    }
}

/// Structural failure of the QR data stream
pub(crate) fn malformed() -> NoSymbolFoundError {
    NoSymbolFoundError::Malformed(BarcodeFormat::QrCode)
}
