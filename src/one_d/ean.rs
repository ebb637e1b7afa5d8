//! EAN-13, UPC-A and EAN-8
//!
//! Digits are four runs summing to seven modules. Left-half digits use the
//! L (odd parity) or G (even parity) set; in EAN-13 the parity sequence of
//! the six left digits encodes the leading digit. Right-half digits use the
//! R set, which has the same run widths as L starting with a bar.

use super::{RowDecoder, RowRuns, pattern_variance};
use crate::config::BarcodeFormat;
use crate::error::NoSymbolFoundError;
use crate::models::Symbol;

const MAX_AVG_VARIANCE: f32 = 0.48;
const MAX_INDIVIDUAL_VARIANCE: f32 = 0.7;

const GUARD: [u8; 3] = [1, 1, 1];
const MIDDLE_GUARD: [u8; 5] = [1, 1, 1, 1, 1];

/// L-set run widths, space first
pub(crate) const L_PATTERNS: [[u8; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];

/// G-set run widths: the L widths reversed
pub(crate) const G_PATTERNS: [[u8; 4]; 10] = {
    let mut out = [[0u8; 4]; 10];
    let mut i = 0;
    while i < 10 {
        let l = L_PATTERNS[i];
        out[i] = [l[3], l[2], l[1], l[0]];
        i += 1;
    }
    out
};

/// G/L choice of the six left digits (bit 5 = first digit, set = G) for each
/// leading digit
pub(crate) const FIRST_DIGIT_PARITY: [u8; 10] = [0x00, 0x0B, 0x0D, 0x0E, 0x13, 0x19, 0x1C, 0x15, 0x16, 0x1A];

/// EAN-13 reader, optionally reporting leading-zero symbols as UPC-A
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ean13Reader {
    /// Report a leading `0` symbol as 12-digit UPC-A
    pub report_upc_a: bool,
    /// Accept symbols whose leading digit is not `0`
    pub accept_ean13: bool,
}

/// EAN-8 reader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ean8Reader;

impl RowDecoder for Ean13Reader {
    fn format(&self) -> BarcodeFormat {
        if self.accept_ean13 {
            BarcodeFormat::Ean13
        } else {
            BarcodeFormat::UpcA
        }
    }

    fn decode_row(&self, row: &RowRuns) -> Result<Symbol, NoSymbolFoundError> {
        let digits = scan_guards(row, self.format(), |row, index| {
            let mut digits = Vec::with_capacity(13);
            let mut parity = 0u8;
            let mut index = index;
            for i in 0..6 {
                let (digit, set) = read_digit(row, index, &[&L_PATTERNS, &G_PATTERNS])?;
                digits.push(digit);
                if set == 1 {
                    parity |= 1 << (5 - i);
                }
                index += 4;
            }
            let first = FIRST_DIGIT_PARITY.iter().position(|&p| p == parity)? as u8;
            digits.insert(0, first);
            let index = read_right_half(row, index, 6, &mut digits)?;
            Some((digits, index))
        })?;

        if digits[0] == 0 && self.report_upc_a {
            return Ok(Symbol::ascii(BarcodeFormat::UpcA, to_text(&digits[1..])));
        }
        if !self.accept_ean13 {
            return Err(NoSymbolFoundError::NotLocated);
        }
        Ok(Symbol::ascii(BarcodeFormat::Ean13, to_text(&digits)))
    }
}

impl RowDecoder for Ean8Reader {
    fn format(&self) -> BarcodeFormat {
        BarcodeFormat::Ean8
    }

    fn decode_row(&self, row: &RowRuns) -> Result<Symbol, NoSymbolFoundError> {
        let digits = scan_guards(row, self.format(), |row, index| {
            let mut digits = Vec::with_capacity(8);
            let mut index = index;
            for _ in 0..4 {
                digits.push(read_digit(row, index, &[&L_PATTERNS])?.0);
                index += 4;
            }
            let index = read_right_half(row, index, 4, &mut digits)?;
            Some((digits, index))
        })?;
        Ok(Symbol::ascii(BarcodeFormat::Ean8, to_text(&digits)))
    }
}

/// Try every start guard on the row. `body` reads from just after the guard
/// up to the end guard and returns the digits plus the end guard index.
fn scan_guards<F>(row: &RowRuns, format: BarcodeFormat, body: F) -> Result<Vec<u8>, NoSymbolFoundError>
where
    F: Fn(&RowRuns, usize) -> Option<(Vec<u8>, usize)>,
{
    let mut result = Err(NoSymbolFoundError::NotLocated);
    for start in (1..row.len()).step_by(2) {
        let Some(guard) = row.window(start, 3) else {
            break;
        };
        if pattern_variance(guard, &GUARD, MAX_INDIVIDUAL_VARIANCE) > MAX_AVG_VARIANCE {
            continue;
        }
        let guard_width: usize = guard.iter().sum();
        if !row.quiet_zone(start - 1, guard_width as f32) {
            continue;
        }
        let Some((digits, end)) = body(row, start + 3) else {
            continue;
        };
        let Some(end_guard) = row.window(end, 3) else {
            continue;
        };
        if pattern_variance(end_guard, &GUARD, MAX_INDIVIDUAL_VARIANCE) > MAX_AVG_VARIANCE
            || !row.quiet_zone(end + 3, end_guard.iter().sum::<usize>() as f32)
        {
            continue;
        }
        if check_digit_ok(&digits) {
            return Ok(digits);
        }
        result = Err(NoSymbolFoundError::Checksum(format));
    }
    result
}

/// Middle guard then `count` R-set digits; returns the end guard index
fn read_right_half(row: &RowRuns, index: usize, count: usize, digits: &mut Vec<u8>) -> Option<usize> {
    let middle = row.window(index, 5)?;
    if pattern_variance(middle, &MIDDLE_GUARD, MAX_INDIVIDUAL_VARIANCE) > MAX_AVG_VARIANCE {
        return None;
    }
    let mut index = index + 5;
    for _ in 0..count {
        digits.push(read_digit(row, index, &[&L_PATTERNS])?.0);
        index += 4;
    }
    Some(index)
}

/// Best digit over `sets` at `index`, with the index of the set it came from
fn read_digit(row: &RowRuns, index: usize, sets: &[&[[u8; 4]; 10]]) -> Option<(u8, usize)> {
    let counters = row.window(index, 4)?;
    let mut best = None;
    let mut best_variance = MAX_AVG_VARIANCE;
    for (set_index, set) in sets.iter().enumerate() {
        for (digit, pattern) in set.iter().enumerate() {
            let variance = pattern_variance(counters, pattern, MAX_INDIVIDUAL_VARIANCE);
            if variance < best_variance {
                best_variance = variance;
                best = Some((digit as u8, set_index));
            }
        }
    }
    best
}

/// Mod-10 check with weights 3, 1, 3, ... counted leftward from the check digit
pub(crate) fn check_digit_ok(digits: &[u8]) -> bool {
    let Some((&check, body)) = digits.split_last() else {
        return false;
    };
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| d as u32 * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    (10 - sum % 10) % 10 == check as u32
}

fn to_text(digits: &[u8]) -> String {
    digits.iter().map(|&d| char::from(b'0' + d)).collect()
}
