//! Alphanumeric mode (0010): pairs in 11 bits, a trailing character in 6

use super::malformed;
use crate::decoder::bitstream::BitReader;
use crate::error::NoSymbolFoundError;

const ALPHANUMERIC_CHARS: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Group separator substituted for `%` under FNC1
const GS: char = '\u{1D}';

fn char_at(value: u32) -> Result<char, NoSymbolFoundError> {
    ALPHANUMERIC_CHARS
        .get(value as usize)
        .map(|&c| c as char)
        .ok_or_else(malformed)
}

/// Decode `count` characters. Under FNC1 `%%` stands for `%` and a lone `%`
/// for the GS separator.
pub fn decode(
    reader: &mut BitReader<'_>,
    count: usize,
    fnc1: bool,
) -> Result<String, NoSymbolFoundError> {
    let mut out = String::with_capacity(count);
    let mut remaining = count;
    while remaining > 1 {
        let pair = reader.read(11).ok_or_else(malformed)?;
        out.push(char_at(pair / 45)?);
        out.push(char_at(pair % 45)?);
        remaining -= 2;
    }
    if remaining == 1 {
        out.push(char_at(reader.read(6).ok_or_else(malformed)?)?);
    }

    if fnc1 {
        let mut translated = String::with_capacity(out.len());
        let mut chars = out.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '%' {
                if chars.peek() == Some(&'%') {
                    chars.next();
                    translated.push('%');
                } else {
                    translated.push(GS);
                }
            } else {
                translated.push(c);
            }
        }
        out = translated;
    }
    Ok(out)
}
