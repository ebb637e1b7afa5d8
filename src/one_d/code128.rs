//! Code 128
//!
//! Symbols are six runs summing to eleven modules. A start code selects code
//! set A, B or C, data codes follow, then a mod-103 check code and the stop
//! pattern (the stop code plus a two-module terminating bar).

use super::{RowDecoder, RowRuns, pattern_variance};
use crate::config::BarcodeFormat;
use crate::error::NoSymbolFoundError;
use crate::models::Symbol;
use tracing::trace;

const MAX_AVG_VARIANCE: f32 = 0.25;
const MAX_INDIVIDUAL_VARIANCE: f32 = 0.7;

const FNC3: u8 = 96;
const FNC2: u8 = 97;
const SHIFT: u8 = 98;
const CODE_C: u8 = 99;
const CODE_B: u8 = 100;
const CODE_A: u8 = 101;
const FNC1: u8 = 102;
const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;
const STOP: u8 = 106;

/// ASCII group separator emitted for FNC1 inside the data
const GS: u8 = 0x1D;

/// Run widths of codes 0-105 and the first six runs of the stop pattern
pub(crate) const CODE_PATTERNS: [[u8; 6]; 107] = [
    [2, 1, 2, 2, 2, 2], [2, 2, 2, 1, 2, 2], [2, 2, 2, 2, 2, 1], [1, 2, 1, 2, 2, 3],
    [1, 2, 1, 3, 2, 2], [1, 3, 1, 2, 2, 2], [1, 2, 2, 2, 1, 3], [1, 2, 2, 3, 1, 2],
    [1, 3, 2, 2, 1, 2], [2, 2, 1, 2, 1, 3], [2, 2, 1, 3, 1, 2], [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2], [1, 2, 2, 1, 3, 2], [1, 2, 2, 2, 3, 1], [1, 1, 3, 2, 2, 2],
    [1, 2, 3, 1, 2, 2], [1, 2, 3, 2, 2, 1], [2, 2, 3, 2, 1, 1], [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1], [2, 1, 3, 2, 1, 2], [2, 2, 3, 1, 1, 2], [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2], [3, 2, 1, 1, 2, 2], [3, 2, 1, 2, 2, 1], [3, 1, 2, 2, 1, 2],
    [3, 2, 2, 1, 1, 2], [3, 2, 2, 2, 1, 1], [2, 1, 2, 1, 2, 3], [2, 1, 2, 3, 2, 1],
    [2, 3, 2, 1, 2, 1], [1, 1, 1, 3, 2, 3], [1, 3, 1, 1, 2, 3], [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3], [1, 3, 2, 1, 1, 3], [1, 3, 2, 3, 1, 1], [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3], [2, 3, 1, 3, 1, 1], [1, 1, 2, 1, 3, 3], [1, 1, 2, 3, 3, 1],
    [1, 3, 2, 1, 3, 1], [1, 1, 3, 1, 2, 3], [1, 1, 3, 3, 2, 1], [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1], [2, 1, 1, 3, 3, 1], [2, 3, 1, 1, 3, 1], [2, 1, 3, 1, 1, 3],
    [2, 1, 3, 3, 1, 1], [2, 1, 3, 1, 3, 1], [3, 1, 1, 1, 2, 3], [3, 1, 1, 3, 2, 1],
    [3, 3, 1, 1, 2, 1], [3, 1, 2, 1, 1, 3], [3, 1, 2, 3, 1, 1], [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1], [2, 2, 1, 4, 1, 1], [4, 3, 1, 1, 1, 1], [1, 1, 1, 2, 2, 4],
    [1, 1, 1, 4, 2, 2], [1, 2, 1, 1, 2, 4], [1, 2, 1, 4, 2, 1], [1, 4, 1, 1, 2, 2],
    [1, 4, 1, 2, 2, 1], [1, 1, 2, 2, 1, 4], [1, 1, 2, 4, 1, 2], [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1], [1, 4, 2, 1, 1, 2], [1, 4, 2, 2, 1, 1], [2, 4, 1, 2, 1, 1],
    [2, 2, 1, 1, 1, 4], [4, 1, 3, 1, 1, 1], [2, 4, 1, 1, 1, 2], [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2], [1, 2, 1, 1, 4, 2], [1, 2, 1, 2, 4, 1], [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2], [1, 2, 4, 2, 1, 1], [4, 1, 1, 2, 1, 2], [4, 2, 1, 1, 1, 2],
    [4, 2, 1, 2, 1, 1], [2, 1, 2, 1, 4, 1], [2, 1, 4, 1, 2, 1], [4, 1, 2, 1, 2, 1],
    [1, 1, 1, 1, 4, 3], [1, 1, 1, 3, 4, 1], [1, 3, 1, 1, 4, 1], [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1], [4, 1, 1, 1, 1, 3], [4, 1, 1, 3, 1, 1], [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1], [3, 1, 1, 1, 4, 1], [4, 1, 1, 1, 3, 1], [2, 1, 1, 4, 1, 2],
    [2, 1, 1, 2, 1, 4], [2, 1, 1, 2, 3, 2], [2, 3, 3, 1, 1, 1],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

/// Code 128 reader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code128Reader;

impl RowDecoder for Code128Reader {
    fn format(&self) -> BarcodeFormat {
        BarcodeFormat::Code128
    }

    fn decode_row(&self, row: &RowRuns) -> Result<Symbol, NoSymbolFoundError> {
        let mut result = Err(NoSymbolFoundError::NotLocated);
        for start in (1..row.len()).step_by(2) {
            let Some(counters) = row.window(start, 6) else {
                break;
            };
            let Some(start_code) = match_code(counters, START_A..=START_C) else {
                continue;
            };
            let width: usize = counters.iter().sum();
            if !row.quiet_zone(start - 1, width as f32 / 2.0) {
                continue;
            }
            let Some(codes) = read_codes(row, start + 6, start_code) else {
                continue;
            };
            match decode_codes(&codes) {
                Ok(symbol) => return Ok(symbol),
                Err(err) => {
                    trace!(%err, start, "code 128 candidate rejected");
                    result = Err(err);
                }
            }
        }
        result
    }
}

/// Best code in `range` for six runs, if close enough
fn match_code(counters: &[usize], range: std::ops::RangeInclusive<u8>) -> Option<u8> {
    let mut best = None;
    let mut best_variance = MAX_AVG_VARIANCE;
    for code in range {
        let variance = pattern_variance(counters, &CODE_PATTERNS[code as usize], MAX_INDIVIDUAL_VARIANCE);
        if variance < best_variance {
            best_variance = variance;
            best = Some(code);
        }
    }
    best
}

/// Codes from the start code up to (not including) the stop code, after
/// checking the terminating bar and trailing quiet zone.
fn read_codes(row: &RowRuns, mut index: usize, start_code: u8) -> Option<Vec<u8>> {
    let mut codes = vec![start_code];
    loop {
        let counters = row.window(index, 6)?;
        let code = match_code(counters, 0..=STOP)?;
        index += 6;
        if code == STOP {
            let code_width: usize = counters.iter().sum();
            let bar = row.get(index) as f32;
            let module = code_width as f32 / 11.0;
            if (bar - 2.0 * module).abs() > module || !row.quiet_zone(index + 1, code_width as f32 / 2.0) {
                return None;
            }
            return Some(codes);
        }
        codes.push(code);
    }
}

/// Verify the check code and turn data codes into text.
fn decode_codes(codes: &[u8]) -> Result<Symbol, NoSymbolFoundError> {
    let checksum_failed = NoSymbolFoundError::Checksum(BarcodeFormat::Code128);
    let malformed = NoSymbolFoundError::Malformed(BarcodeFormat::Code128);

    let (&check, body) = codes.split_last().ok_or(malformed.clone())?;
    if body.len() < 2 {
        return Err(malformed);
    }
    let sum = body
        .iter()
        .enumerate()
        .skip(1)
        .fold(body[0] as usize, |acc, (i, &code)| acc + i * code as usize);
    if sum % 103 != check as usize {
        return Err(checksum_failed);
    }

    let mut set = match body[0] {
        START_A => CodeSet::A,
        START_B => CodeSet::B,
        START_C => CodeSet::C,
        _ => return Err(malformed),
    };
    let mut raw = Vec::new();
    let mut shift = false;
    let mut fnc4_latch = false;
    let mut fnc4_once = false;
    let mut last = None;

    for (position, &code) in body.iter().enumerate().skip(1) {
        let active = match (shift, set) {
            (true, CodeSet::A) => CodeSet::B,
            (true, CodeSet::B) => CodeSet::A,
            (_, set) => set,
        };
        shift = false;

        let upper = fnc4_latch != fnc4_once;
        match (active, code) {
            (_, FNC1) if position == 1 => {}
            (_, FNC1) => raw.push(GS),
            (_, START_A..=STOP) => return Err(malformed),
            (CodeSet::C, 0..=99) => {
                raw.push(b'0' + code / 10);
                raw.push(b'0' + code % 10);
            }
            (CodeSet::C, CODE_B) => set = CodeSet::B,
            (CodeSet::C, CODE_A) => set = CodeSet::A,
            (_, FNC2 | FNC3) => {}
            (_, SHIFT) => shift = true,
            (_, CODE_C) => set = CodeSet::C,
            (CodeSet::A, CODE_B) | (CodeSet::B, CODE_A) => {
                set = if active == CodeSet::A {
                    CodeSet::B
                } else {
                    CodeSet::A
                }
            }
            (CodeSet::A, CODE_A) | (CodeSet::B, CODE_B) => {
                // FNC4: twice in a row toggles the latch, once shifts the next character.
                if last == Some(code) && fnc4_once {
                    fnc4_latch = !fnc4_latch;
                    fnc4_once = false;
                } else {
                    fnc4_once = true;
                }
            }
            (CodeSet::A, 0..=63) | (CodeSet::B, 0..=95) => {
                raw.push(character(b' ' + code, upper));
                fnc4_once = false;
            }
            (CodeSet::A, 64..=95) => {
                raw.push(character(code - 64, upper));
                fnc4_once = false;
            }
            _ => return Err(malformed),
        }
        last = Some(code);
    }

    if raw.is_empty() {
        return Err(malformed);
    }
    let text = raw.iter().map(|&b| char::from(b)).collect();
    Ok(Symbol {
        format: BarcodeFormat::Code128,
        text,
        raw,
    })
}

/// Character byte, moved to the upper half after FNC4
fn character(value: u8, upper: bool) -> u8 {
    if upper { value | 0x80 } else { value }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Module widths (light first, quiet zones included) for a sequence of
    /// codes starting with a start code; the check code and stop pattern are
    /// appended.
    pub fn code128_modules(codes: &[u8]) -> Vec<u8> {
        let sum = codes
            .iter()
            .enumerate()
            .skip(1)
            .fold(codes[0] as usize, |acc, (i, &c)| acc + i * c as usize);
        let mut modules = vec![10u8];
        for &code in codes {
            modules.extend(CODE_PATTERNS[code as usize]);
        }
        modules.extend(CODE_PATTERNS[sum % 103]);
        modules.extend(CODE_PATTERNS[STOP as usize]);
        modules.push(2);
        modules.push(10);
        modules
    }

    /// Code set B codes for printable ASCII
    pub fn code_b(text: &str) -> Vec<u8> {
        std::iter::once(START_B).chain(text.bytes().map(|b| b - b' ')).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{code_b, code128_modules};
    use super::*;
    use crate::one_d::scan_rows;
    use crate::one_d::testing::paint;

    fn decode(codes: &[u8], scale: usize) -> Result<Symbol, NoSymbolFoundError> {
        let matrix = paint(&code128_modules(codes), scale, 1);
        Code128Reader.decode_row(&RowRuns::from_row(&matrix.row(0)))
    }

    #[test]
    fn test_patterns_are_eleven_modules() {
        for pattern in &CODE_PATTERNS {
            assert_eq!(pattern.iter().map(|&m| m as usize).sum::<usize>(), 11);
        }
    }

    #[test]
    fn test_code_set_b() {
        let symbol = decode(&code_b("HELLO-128"), 2).unwrap();
        assert_eq!(symbol.format, BarcodeFormat::Code128);
        assert_eq!(symbol.text, "HELLO-128");
    }

    #[test]
    fn test_code_set_c_and_switch() {
        // 12 34 then CODE B "ab"
        let codes = [START_C, 12, 34, CODE_B, b'a' - b' ', b'b' - b' '];
        assert_eq!(decode(&codes, 3).unwrap().text, "1234ab");
    }

    #[test]
    fn test_code_set_a_controls_and_shift() {
        // "A", TAB (code 73), SHIFT to B for "x", then "B"
        let codes = [START_A, 33, 73, SHIFT, b'x' - b' ', 34];
        assert_eq!(decode(&codes, 2).unwrap().text, "A\txB");
    }

    #[test]
    fn test_fnc1_positions() {
        // Leading FNC1 marks GS1 data; later ones are separators.
        let codes = [START_C, FNC1, 1, 23, FNC1, 45];
        assert_eq!(decode(&codes, 2).unwrap().text, "0123\u{1d}45");
    }

    #[test]
    fn test_checksum_failure() {
        let mut modules = code128_modules(&code_b("AB"));
        // Replace the check code (after quiet zone, start, two data codes)
        let at = 1 + 3 * 6;
        modules[at..at + 6].copy_from_slice(&CODE_PATTERNS[0]);
        let matrix = paint(&modules, 2, 1);
        assert_eq!(
            Code128Reader.decode_row(&RowRuns::from_row(&matrix.row(0))),
            Err(NoSymbolFoundError::Checksum(BarcodeFormat::Code128))
        );
    }

    #[test]
    fn test_scan_reversed_rows() {
        let mut modules = code128_modules(&code_b("rev"));
        modules.reverse();
        let matrix = paint(&modules, 2, 20);
        assert_eq!(scan_rows(&matrix, &Code128Reader, false).unwrap().text, "rev");
    }
}
