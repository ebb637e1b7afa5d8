//! Byte mode (0100): eight bits per character

use super::malformed;
use crate::decoder::bitstream::BitReader;
use crate::error::NoSymbolFoundError;
use encoding_rs::Encoding;

/// Read `count` raw bytes
pub fn read_bytes(reader: &mut BitReader<'_>, count: usize) -> Result<Vec<u8>, NoSymbolFoundError> {
    (0..count)
        .map(|_| reader.read(8).map(|b| b as u8).ok_or_else(malformed))
        .collect()
}

/// Interpret `bytes` in `encoding`; bytes that are not valid in it are an
/// error rather than replacement characters.
pub fn decode_text(bytes: &[u8], encoding: &'static Encoding) -> Result<String, NoSymbolFoundError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or(NoSymbolFoundError::Encoding {
            charset: encoding.name(),
        })
}
