//! Numeric mode (0001): three digits per 10 bits, a trailing pair in 7 bits
//! or a single digit in 4 bits

use super::malformed;
use crate::decoder::bitstream::BitReader;
use crate::error::NoSymbolFoundError;

/// Decode `count` digits
pub fn decode(reader: &mut BitReader<'_>, count: usize) -> Result<String, NoSymbolFoundError> {
    let mut out = String::with_capacity(count);
    let mut remaining = count;
    while remaining > 0 {
        let group = remaining.min(3);
        let (bits, limit) = match group {
            3 => (10, 1000),
            2 => (7, 100),
            _ => (4, 10),
        };
        let value = reader.read(bits).ok_or_else(malformed)?;
        if value >= limit {
            return Err(malformed());
        }
        out.push_str(&format!("{value:0group$}"));
        remaining -= group;
    }
    Ok(out)
}
