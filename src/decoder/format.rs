//! Format information extraction from a sampled QR grid

use crate::decoder::bch::BchCode;
use crate::models::{BitMatrix, ECLevel, MaskPattern};

/// Error correction level and mask pattern of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Error correction level
    pub ec_level: ECLevel,
    /// Data mask applied to the symbol
    pub mask: MaskPattern,
}

impl FormatInfo {
    /// Read both format copies and decode whichever is closer to a valid
    /// codeword.
    pub fn read(grid: &BitMatrix) -> Option<Self> {
        let dimension = grid.width();
        if dimension < 21 {
            return None;
        }
        let (first, second) = read_copies(grid);
        Self::decode(first, second)
    }

    /// Decode two raw 15-bit reads
    pub fn decode(first: u32, second: u32) -> Option<Self> {
        let data = BchCode::FORMAT.decode(&[first, second], 0..=31)?;
        Some(Self {
            ec_level: ECLevel::from_format_bits((data >> 3) as u8),
            mask: MaskPattern::from_bits(data as u8),
        })
    }
}

/// Raw bits of the copy around the top-left finder and of the copy split
/// between the other two finders.
fn read_copies(grid: &BitMatrix) -> (u32, u32) {
    let dimension = grid.width();
    let bit = |bits: u32, x: usize, y: usize| (bits << 1) | grid.get(x, y) as u32;

    let mut first = 0;
    for x in 0..6 {
        first = bit(first, x, 8);
    }
    first = bit(first, 7, 8);
    first = bit(first, 8, 8);
    first = bit(first, 8, 7);
    for y in (0..6).rev() {
        first = bit(first, 8, y);
    }

    let mut second = 0;
    for y in (dimension - 7..dimension).rev() {
        second = bit(second, 8, y);
    }
    for x in dimension - 8..dimension {
        second = bit(second, x, 8);
    }
    (first, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Write a format codeword into both copies, mirroring `read_copies`.
    fn place_format(grid: &mut BitMatrix, codeword: u32) {
        let dimension = grid.width();
        let mut cells: Vec<(usize, usize)> = (0..6).map(|x| (x, 8)).collect();
        cells.extend([(7, 8), (8, 8), (8, 7)]);
        cells.extend((0..6).rev().map(|y| (8, y)));
        for (i, &(x, y)) in cells.iter().enumerate() {
            grid.set(x, y, (codeword >> (14 - i)) & 1 == 1);
        }

        let mut cells: Vec<(usize, usize)> = (dimension - 7..dimension).rev().map(|y| (8, y)).collect();
        cells.extend((dimension - 8..dimension).map(|x| (x, 8)));
        for (i, &(x, y)) in cells.iter().enumerate() {
            grid.set(x, y, (codeword >> (14 - i)) & 1 == 1);
        }
    }

    #[test]
    fn test_reads_placed_format() {
        let mut grid = BitMatrix::square(21);
        // EC level H (10), mask 5
        place_format(&mut grid, BchCode::FORMAT.encode(0b10_101));
        let info = FormatInfo::read(&grid).unwrap();
        assert_eq!(info.ec_level, ECLevel::H);
        assert_eq!(info.mask.number(), 5);
    }

    #[test]
    fn test_one_damaged_copy() {
        let codeword = BchCode::FORMAT.encode(0b01_011);
        let info = FormatInfo::decode(codeword ^ 0x7F00, codeword ^ 0b1).unwrap();
        assert_eq!(info.ec_level, ECLevel::L);
        assert_eq!(info.mask.number(), 3);
    }

    #[test]
    fn test_blank_grid_has_no_format() {
        // An all-light grid reads as zero, at least five bits from any codeword.
        let grid = BitMatrix::square(21);
        assert!(FormatInfo::read(&grid).is_none());
    }
}
