//! Luminance → bit matrix conversion
//!
//! Two strategies implement [`Binarizer`]:
//! - [`HybridBinarizer`]: per-block thresholds smoothed over a 5x5 block
//!   neighbourhood. Handles uneven lighting; used first.
//! - [`GlobalHistogramBinarizer`]: one threshold picked from the valley of the
//!   luminance histogram. Tolerates low contrast and noise; used as fallback.

use crate::error::BinarizationError;
use crate::models::{BitMatrix, LuminanceMap};
use std::fmt;

/// Which strategy produced a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinarizerKind {
    /// Block-adaptive thresholding
    Hybrid,
    /// Single histogram-derived threshold
    GlobalHistogram,
}

impl fmt::Display for BinarizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinarizerKind::Hybrid => f.write_str("adaptive"),
            BinarizerKind::GlobalHistogram => f.write_str("global-histogram"),
        }
    }
}

/// Converts luminance into a dark/light matrix
pub trait Binarizer {
    /// Strategy identifier, reported with decode results
    fn kind(&self) -> BinarizerKind;

    /// Produce a fresh matrix; never reuses one from an earlier call
    fn binarize(&self, luminance: &LuminanceMap) -> Result<BitMatrix, BinarizationError>;
}

const LUMINANCE_BITS: usize = 5;
const LUMINANCE_SHIFT: usize = 8 - LUMINANCE_BITS;
const LUMINANCE_BUCKETS: usize = 1 << LUMINANCE_BITS;

/// Global threshold from the luminance histogram
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalHistogramBinarizer;

impl GlobalHistogramBinarizer {
    /// Threshold for a map: pixels strictly below it are dark
    pub fn threshold(luminance: &LuminanceMap) -> Result<u8, BinarizationError> {
        if luminance.as_bytes().is_empty() {
            return Err(BinarizationError::Empty);
        }
        let mut buckets = [0u32; LUMINANCE_BUCKETS];
        for &pixel in luminance.as_bytes() {
            buckets[(pixel as usize) >> LUMINANCE_SHIFT] += 1;
        }
        estimate_black_point(&buckets)
    }
}

impl Binarizer for GlobalHistogramBinarizer {
    fn kind(&self) -> BinarizerKind {
        BinarizerKind::GlobalHistogram
    }

    fn binarize(&self, luminance: &LuminanceMap) -> Result<BitMatrix, BinarizationError> {
        let threshold = Self::threshold(luminance)?;
        let (width, height) = (luminance.width(), luminance.height());
        let mut matrix = BitMatrix::new(width, height);
        for y in 0..height {
            for (x, &pixel) in luminance.row(y).iter().enumerate() {
                if pixel < threshold {
                    matrix.set(x, y, true);
                }
            }
        }
        Ok(matrix)
    }
}

/// Pick the valley between the two dominant histogram peaks.
fn estimate_black_point(buckets: &[u32; LUMINANCE_BUCKETS]) -> Result<u8, BinarizationError> {
    let mut max_bucket_count = 0u32;
    let mut first_peak = 0usize;
    for (x, &count) in buckets.iter().enumerate() {
        if count > buckets[first_peak] {
            first_peak = x;
        }
        max_bucket_count = max_bucket_count.max(count);
    }

    // Second peak: tall and far from the first one.
    let mut second_peak = 0usize;
    let mut second_peak_score = 0u64;
    for (x, &count) in buckets.iter().enumerate() {
        let distance = x.abs_diff(first_peak) as u64;
        let score = count as u64 * distance * distance;
        if score > second_peak_score {
            second_peak = x;
            second_peak_score = score;
        }
    }
    // Only one populated bucket.
    if second_peak_score == 0 {
        return Err(BinarizationError::NoThreshold);
    }

    let (first_peak, second_peak) = if first_peak > second_peak {
        (second_peak, first_peak)
    } else {
        (first_peak, second_peak)
    };

    if second_peak - first_peak <= LUMINANCE_BUCKETS / 16 {
        return Err(BinarizationError::NoThreshold);
    }

    let mut best_valley = second_peak - 1;
    let mut best_valley_score = -1i64;
    for x in (first_peak + 1..second_peak).rev() {
        let from_first = (x - first_peak) as i64;
        let score = from_first
            * from_first
            * (second_peak - x) as i64
            * (max_bucket_count - buckets[x]) as i64;
        if score > best_valley_score {
            best_valley = x;
            best_valley_score = score;
        }
    }

    Ok((best_valley << LUMINANCE_SHIFT) as u8)
}

const BLOCK_SIZE_POWER: usize = 3;
const BLOCK_SIZE: usize = 1 << BLOCK_SIZE_POWER;
const MINIMUM_DIMENSION: usize = BLOCK_SIZE * 5;
const MIN_DYNAMIC_RANGE: u32 = 24;

/// Block-adaptive thresholding over 8x8 blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridBinarizer;

impl Binarizer for HybridBinarizer {
    fn kind(&self) -> BinarizerKind {
        BinarizerKind::Hybrid
    }

    fn binarize(&self, luminance: &LuminanceMap) -> Result<BitMatrix, BinarizationError> {
        let (width, height) = (luminance.width(), luminance.height());
        if width == 0 || height == 0 {
            return Err(BinarizationError::Empty);
        }
        if width < MINIMUM_DIMENSION || height < MINIMUM_DIMENSION {
            return Err(BinarizationError::TooSmall {
                width,
                height,
                minimum: MINIMUM_DIMENSION,
            });
        }

        let sub_width = width.div_ceil(BLOCK_SIZE);
        let sub_height = height.div_ceil(BLOCK_SIZE);
        let black_points = block_black_points(luminance, sub_width, sub_height);

        let mut matrix = BitMatrix::new(width, height);
        let max_x = width - BLOCK_SIZE;
        let max_y = height - BLOCK_SIZE;
        for by in 0..sub_height {
            let y_offset = (by << BLOCK_SIZE_POWER).min(max_y);
            let top = by.clamp(2, sub_height - 3);
            for bx in 0..sub_width {
                let x_offset = (bx << BLOCK_SIZE_POWER).min(max_x);
                let left = bx.clamp(2, sub_width - 3);
                let mut sum = 0u32;
                for row in &black_points[top - 2..=top + 2] {
                    sum += row[left - 2..=left + 2].iter().sum::<u32>();
                }
                let threshold = sum / 25;
                threshold_block(luminance, x_offset, y_offset, threshold, &mut matrix);
            }
        }
        Ok(matrix)
    }
}

/// Per-block black point: the block mean, or a low-contrast estimate that
/// leans on already computed neighbours.
fn block_black_points(luminance: &LuminanceMap, sub_width: usize, sub_height: usize) -> Vec<Vec<u32>> {
    let max_x = luminance.width() - BLOCK_SIZE;
    let max_y = luminance.height() - BLOCK_SIZE;
    let mut points = vec![vec![0u32; sub_width]; sub_height];

    for by in 0..sub_height {
        let y_offset = (by << BLOCK_SIZE_POWER).min(max_y);
        for bx in 0..sub_width {
            let x_offset = (bx << BLOCK_SIZE_POWER).min(max_x);
            let (mut sum, mut min, mut max) = (0u32, u32::MAX, 0u32);
            for yy in 0..BLOCK_SIZE {
                let row = &luminance.row(y_offset + yy)[x_offset..x_offset + BLOCK_SIZE];
                for &pixel in row {
                    let pixel = pixel as u32;
                    sum += pixel;
                    min = min.min(pixel);
                    max = max.max(pixel);
                }
            }

            let mut average = sum >> (2 * BLOCK_SIZE_POWER);
            if max - min <= MIN_DYNAMIC_RANGE {
                // Flat block: assume background unless neighbours say otherwise.
                average = min / 2;
                if by > 0 && bx > 0 {
                    let neighbours = (points[by - 1][bx]
                        + 2 * points[by][bx - 1]
                        + points[by - 1][bx - 1])
                        / 4;
                    if min < neighbours {
                        average = neighbours;
                    }
                }
            }
            points[by][bx] = average;
        }
    }
    points
}

fn threshold_block(
    luminance: &LuminanceMap,
    x_offset: usize,
    y_offset: usize,
    threshold: u32,
    matrix: &mut BitMatrix,
) {
    for yy in 0..BLOCK_SIZE {
        let y = y_offset + yy;
        let row = &luminance.row(y)[x_offset..x_offset + BLOCK_SIZE];
        for (xx, &pixel) in row.iter().enumerate() {
            if pixel as u32 <= threshold {
                matrix.set(x_offset + xx, y, true);
            }
        }
    }
}
