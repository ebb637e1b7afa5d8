//! Extended Channel Interpretation: designators that switch the character
//! set of the byte segments that follow

use super::malformed;
use crate::decoder::bitstream::BitReader;
use crate::error::NoSymbolFoundError;
use encoding_rs::Encoding;

/// Read a 1-3 byte ECI designator
pub fn read_designator(reader: &mut BitReader<'_>) -> Result<u32, NoSymbolFoundError> {
    let first = reader.read(8).ok_or_else(malformed)?;
    if first & 0x80 == 0 {
        return Ok(first & 0x7F);
    }
    if first & 0xC0 == 0x80 {
        let second = reader.read(8).ok_or_else(malformed)?;
        return Ok(((first & 0x3F) << 8) | second);
    }
    if first & 0xE0 == 0xC0 {
        let rest = reader.read(16).ok_or_else(malformed)?;
        return Ok(((first & 0x1F) << 16) | rest);
    }
    Err(malformed())
}

// Designator to WHATWG label. ISO-8859-1 and US-ASCII resolve to
// windows-1252, their WHATWG superset.
const ECI_LABELS: &[(u32, &str)] = &[
    (1, "iso-8859-1"),
    (3, "iso-8859-1"),
    (4, "iso-8859-2"),
    (5, "iso-8859-3"),
    (6, "iso-8859-4"),
    (7, "iso-8859-5"),
    (8, "iso-8859-6"),
    (9, "iso-8859-7"),
    (10, "iso-8859-8"),
    (11, "iso-8859-9"),
    (12, "iso-8859-10"),
    (13, "iso-8859-11"),
    (15, "iso-8859-13"),
    (16, "iso-8859-14"),
    (17, "iso-8859-15"),
    (18, "iso-8859-16"),
    (20, "shift_jis"),
    (21, "windows-1250"),
    (22, "windows-1251"),
    (23, "windows-1252"),
    (24, "windows-1256"),
    (25, "utf-16be"),
    (26, "utf-8"),
    (27, "us-ascii"),
    (28, "big5"),
    (29, "gbk"),
    (30, "euc-kr"),
    (170, "us-ascii"),
];

/// Encoding selected by an ECI designator, if it is one this decoder knows
pub fn encoding_for(designator: u32) -> Option<&'static Encoding> {
    ECI_LABELS
        .iter()
        .find(|(value, _)| *value == designator)
        .and_then(|(_, label)| Encoding::for_label(label.as_bytes()))
}
