//! Version information extraction for QR codes v7+

use crate::decoder::bch::BchCode;
use crate::models::{BitMatrix, Version};

/// Smallest grid carrying version information blocks (version 7)
pub const MIN_VERSION_INFO_DIMENSION: usize = 45;

/// Version encoded in the two 6x3 blocks next to the top-right and
/// bottom-left finders. `None` below version 7 or when both copies are
/// unreadable.
pub fn read_version_info(grid: &BitMatrix) -> Option<Version> {
    let dimension = grid.width();
    if dimension < MIN_VERSION_INFO_DIMENSION {
        return None;
    }

    let min = dimension - 11;
    let mut top_right = 0u32;
    for y in (0..6).rev() {
        for x in (min..=dimension - 9).rev() {
            top_right = (top_right << 1) | grid.get(x, y) as u32;
        }
    }
    let mut bottom_left = 0u32;
    for x in (0..6).rev() {
        for y in (min..=dimension - 9).rev() {
            bottom_left = (bottom_left << 1) | grid.get(x, y) as u32;
        }
    }

    let number = BchCode::VERSION.decode(&[top_right, bottom_left], 7..=40)?;
    Version::new(number as u8)
}

/// Version of a grid: from its size below version 7, from the version
/// blocks above it.
pub fn resolve_version(grid: &BitMatrix) -> Option<Version> {
    let provisional = Version::from_dimension(grid.width())?;
    if provisional.number() < 7 {
        return Some(provisional);
    }
    read_version_info(grid)
}
