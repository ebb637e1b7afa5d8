//! Linear (1D) barcode readers
//!
//! Rows of the bit matrix are scanned from the middle outward. Each row is
//! turned into run lengths and handed to a [`RowDecoder`], first as read and
//! then reversed so upside-down symbols decode too.

pub mod code128;
pub mod ean;

use crate::config::BarcodeFormat;
use crate::error::NoSymbolFoundError;
use crate::models::{BitMatrix, Symbol};
use tracing::trace;

/// Rows tried without `try_harder`
const MAX_ROWS: usize = 15;

/// Alternating run lengths of one scan line.
///
/// `runs[0]` is always light (possibly empty), so dark runs sit at odd
/// indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRuns {
    runs: Vec<usize>,
}

impl RowRuns {
    /// Run lengths of `row`, `true` meaning dark
    pub fn from_row(row: &[bool]) -> Self {
        let mut runs = vec![0usize];
        let mut dark = false;
        for &cell in row {
            if cell != dark {
                runs.push(0);
                dark = cell;
            }
            if let Some(last) = runs.last_mut() {
                *last += 1;
            }
        }
        Self { runs }
    }

    /// All runs, light first
    pub fn runs(&self) -> &[usize] {
        &self.runs
    }

    /// Number of runs
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// True when the row holds no pixels
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|&r| r == 0)
    }

    /// Up to `count` runs starting at `index`
    pub fn window(&self, index: usize, count: usize) -> Option<&[usize]> {
        self.runs.get(index..index + count)
    }

    /// Length of run `index`; zero past either end
    pub fn get(&self, index: usize) -> usize {
        self.runs.get(index).copied().unwrap_or(0)
    }

    /// Whether a light run of at least `width` pixels (or the row edge)
    /// lies at `index`
    pub fn quiet_zone(&self, index: usize, width: f32) -> bool {
        match self.runs.get(index) {
            Some(&len) => index + 1 == self.runs.len() || index == 0 || len as f32 >= width,
            None => true,
        }
    }
}

/// Reads one symbology from a single scan line
pub trait RowDecoder {
    /// Symbology this decoder is looking for, used in error reports
    fn format(&self) -> BarcodeFormat;

    /// Decode the first symbol on the line. `NotLocated` when no start
    /// pattern leads anywhere, `Checksum` when one was read but failed its
    /// check.
    fn decode_row(&self, row: &RowRuns) -> Result<Symbol, NoSymbolFoundError>;
}

/// Average deviation of `counters` from `pattern` per pixel, or `f32::MAX`
/// when any single element deviates by more than `max_individual` modules.
pub fn pattern_variance(counters: &[usize], pattern: &[u8], max_individual: f32) -> f32 {
    let total: usize = counters.iter().sum();
    let pattern_len: usize = pattern.iter().map(|&p| p as usize).sum();
    if total < pattern_len || pattern_len == 0 {
        return f32::MAX;
    }
    let unit = total as f32 / pattern_len as f32;
    let max_individual = max_individual * unit;

    let mut variance = 0.0;
    for (&counter, &expected) in counters.iter().zip(pattern) {
        let diff = (counter as f32 - expected as f32 * unit).abs();
        if diff > max_individual {
            return f32::MAX;
        }
        variance += diff;
    }
    variance / total as f32
}

/// Scan rows of `binary` with `decoder`.
///
/// Rows are visited from the middle outward: 15 of them, or every row with
/// `try_harder`.
pub fn scan_rows<D: RowDecoder + ?Sized>(
    binary: &BitMatrix,
    decoder: &D,
    try_harder: bool,
) -> Result<Symbol, NoSymbolFoundError> {
    let height = binary.height();
    if height == 0 || binary.width() == 0 {
        return Err(NoSymbolFoundError::NotLocated);
    }

    let middle = height / 2;
    let step = (height >> if try_harder { 8 } else { 5 }).max(1);
    let max_rows = if try_harder { height } else { MAX_ROWS };

    let mut best = NoSymbolFoundError::NotLocated;
    for attempt in 0..max_rows {
        let offset = step * attempt.div_ceil(2);
        let y = if attempt % 2 == 0 {
            middle.checked_sub(offset)
        } else {
            Some(middle + offset).filter(|&y| y < height)
        };
        let Some(y) = y else {
            break;
        };

        let mut cells = binary.row(y);
        for reversed in [false, true] {
            if reversed {
                cells.reverse();
            }
            match decoder.decode_row(&RowRuns::from_row(&cells)) {
                Ok(symbol) => {
                    trace!(format = %symbol.format, row = y, reversed, "row decoded");
                    return Ok(symbol);
                }
                Err(NoSymbolFoundError::NotLocated) => {}
                Err(err) => best = err,
            }
        }
    }
    Err(best)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::models::BitMatrix;

    /// Paint alternating light/dark module widths (starting light) into a
    /// `height`-row matrix at `scale` pixels per module.
    pub fn paint(modules: &[u8], scale: usize, height: usize) -> BitMatrix {
        let width: usize = modules.iter().map(|&m| m as usize * scale).sum();
        let mut matrix = BitMatrix::new(width, height);
        let mut x = 0;
        for (i, &m) in modules.iter().enumerate() {
            let w = m as usize * scale;
            if i % 2 == 1 {
                matrix.set_region(x, 0, w, height);
            }
            x += w;
        }
        matrix
    }
}
