//! Data stream parsing: segments of mixed modes into text and raw bytes

use crate::decoder::bitstream::BitReader;
use crate::decoder::modes::{Mode, alphanumeric, byte, eci, kanji, malformed, numeric};
use crate::error::NoSymbolFoundError;
use crate::models::Version;
use encoding_rs::{Encoding, GBK, SHIFT_JIS};
use tracing::trace;

/// Decoded content of a QR data stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Text of every segment, in order
    pub text: String,
    /// Segment bytes before character-set interpretation
    pub raw: Vec<u8>,
}

/// Parse the corrected data codewords of a `version` symbol.
///
/// Byte segments are decoded with `charset` until an ECI designator selects
/// another character set.
pub fn decode_payload(
    data: &[u8],
    version: Version,
    charset: &'static Encoding,
) -> Result<Payload, NoSymbolFoundError> {
    let mut reader = BitReader::new(data);
    let mut text = String::new();
    let mut raw = Vec::new();
    let mut current = charset;
    let mut fnc1 = false;

    loop {
        // Fewer than four bits left is an implicit terminator.
        let mode = match reader.read(4) {
            Some(bits) => Mode::from_bits(bits)?,
            None => Mode::Terminator,
        };
        trace!(?mode, available = reader.available(), "segment");

        match mode {
            Mode::Terminator => break,
            Mode::Fnc1FirstPosition => fnc1 = true,
            Mode::Fnc1SecondPosition => {
                // Application indicator
                reader.read(8).ok_or_else(malformed)?;
                fnc1 = true;
            }
            Mode::StructuredAppend => {
                // Sequence number and parity; each symbol decodes on its own.
                reader.read(16).ok_or_else(malformed)?;
            }
            Mode::Eci => {
                let designator = eci::read_designator(&mut reader)?;
                current = eci::encoding_for(designator).ok_or_else(malformed)?;
            }
            Mode::Numeric => {
                let count = read_count(&mut reader, mode, version)?;
                let digits = numeric::decode(&mut reader, count)?;
                raw.extend_from_slice(digits.as_bytes());
                text.push_str(&digits);
            }
            Mode::Alphanumeric => {
                let count = read_count(&mut reader, mode, version)?;
                let chars = alphanumeric::decode(&mut reader, count, fnc1)?;
                raw.extend_from_slice(chars.as_bytes());
                text.push_str(&chars);
            }
            Mode::Byte => {
                let count = read_count(&mut reader, mode, version)?;
                let bytes = byte::read_bytes(&mut reader, count)?;
                text.push_str(&byte::decode_text(&bytes, current)?);
                raw.extend_from_slice(&bytes);
            }
            Mode::Kanji => {
                let count = read_count(&mut reader, mode, version)?;
                let bytes = kanji::read_kanji(&mut reader, count)?;
                text.push_str(&byte::decode_text(&bytes, SHIFT_JIS)?);
                raw.extend_from_slice(&bytes);
            }
            Mode::Hanzi => {
                let bytes = kanji::read_hanzi(&mut reader, mode.count_bits(version))?;
                text.push_str(&byte::decode_text(&bytes, GBK)?);
                raw.extend_from_slice(&bytes);
            }
        }
    }

    Ok(Payload { text, raw })
}

fn read_count(reader: &mut BitReader<'_>, mode: Mode, version: Version) -> Result<usize, NoSymbolFoundError> {
    reader
        .read(mode.count_bits(version))
        .map(|count| count as usize)
        .ok_or_else(malformed)
}
