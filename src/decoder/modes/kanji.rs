//! Kanji (1000) and Hanzi (1101) modes: 13-bit values that expand to
//! double-byte Shift JIS or GB 2312 codes

use super::malformed;
use crate::decoder::bitstream::BitReader;
use crate::error::NoSymbolFoundError;

/// GB 2312 subset indicator of a Hanzi segment
const GB2312_SUBSET: u32 = 1;

/// Read `count` Kanji characters as Shift JIS bytes
pub fn read_kanji(reader: &mut BitReader<'_>, count: usize) -> Result<Vec<u8>, NoSymbolFoundError> {
    let mut bytes = Vec::with_capacity(count * 2);
    for _ in 0..count {
        let value = reader.read(13).ok_or_else(malformed)?;
        let mut code = ((value / 0xC0) << 8) | (value % 0xC0);
        code += if code < 0x1F00 { 0x8140 } else { 0xC140 };
        bytes.extend_from_slice(&(code as u16).to_be_bytes());
    }
    Ok(bytes)
}

/// Read the subset indicator and `count` Hanzi characters as GB 2312 bytes.
/// The count field follows the subset indicator, so the caller passes the
/// count width rather than the count.
pub fn read_hanzi(reader: &mut BitReader<'_>, count_bits: usize) -> Result<Vec<u8>, NoSymbolFoundError> {
    let subset = reader.read(4).ok_or_else(malformed)?;
    let count = reader.read(count_bits).ok_or_else(malformed)? as usize;
    if subset != GB2312_SUBSET {
        return Err(malformed());
    }
    let mut bytes = Vec::with_capacity(count * 2);
    for _ in 0..count {
        let value = reader.read(13).ok_or_else(malformed)?;
        let mut code = ((value / 0x060) << 8) | (value % 0x060);
        code += if code < 0x00A00 { 0x0A1A1 } else { 0x0A6A1 };
        bytes.extend_from_slice(&(code as u16).to_be_bytes());
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kanji_expansion() {
        // 0x935F (from the QR standard example) packs to 0x0D9F
        let value: u16 = 0x0D9F;
        let bytes = (value << 3).to_be_bytes();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_kanji(&mut reader, 1).unwrap(), vec![0x93, 0x5F]);
    }

    #[test]
    fn test_kanji_upper_range() {
        // 0xE4AA packs to 0x1AAA
        let value: u16 = 0x1AAA;
        let bytes = (value << 3).to_be_bytes();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_kanji(&mut reader, 1).unwrap(), vec![0xE4, 0xAA]);
    }

    #[test]
    fn test_hanzi_requires_gb2312_subset() {
        // subset 2, count 0
        let bytes = [0b0010_0000, 0x00];
        let mut reader = BitReader::new(&bytes);
        assert!(read_hanzi(&mut reader, 8).is_err());
    }
}
