//! Codeword extraction from a QR grid and bit-level reading of the data
//! stream

use crate::decoder::function_mask::FunctionMask;
use crate::models::{BitMatrix, MaskPattern, Version};

/// Unmask the grid and read codewords along the two-column zig-zag,
/// starting bottom-right and moving upward. Remainder bits are dropped.
pub fn read_codewords(grid: &BitMatrix, version: Version, mask: MaskPattern) -> Vec<u8> {
    let function = FunctionMask::new(version);
    let dimension = version.dimension();
    let mut codewords = Vec::with_capacity(function.data_module_count() / 8);
    let mut current = 0u8;
    let mut bits_read = 0;
    let mut upward = true;

    let mut right = dimension - 1;
    while right > 0 {
        // The vertical timing pattern shifts every pair left of it by one.
        if right == 6 {
            right -= 1;
        }
        for count in 0..dimension {
            let y = if upward { dimension - 1 - count } else { count };
            for x in [right, right - 1] {
                if function.is_function(x, y) {
                    continue;
                }
                let bit = grid.get(x, y) ^ mask.is_masked(y, x);
                current = (current << 1) | bit as u8;
                bits_read += 1;
                if bits_read == 8 {
                    codewords.push(current);
                    current = 0;
                    bits_read = 0;
                }
            }
        }
        upward = !upward;
        if right < 2 {
            break;
        }
        right -= 2;
    }
    codewords
}

/// MSB-first reader over a byte slice
pub struct BitReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    /// Reader positioned at the first bit
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Bits left to read
    pub fn available(&self) -> usize {
        self.bytes.len() * 8 - self.position
    }

    /// Read `count` (at most 32) bits as an unsigned value
    pub fn read(&mut self, count: usize) -> Option<u32> {
        if count > 32 || count > self.available() {
            return None;
        }
        let mut value = 0u32;
        for _ in 0..count {
            let byte = self.bytes[self.position / 8];
            let bit = (byte >> (7 - self.position % 8)) & 1;
            value = (value << 1) | bit as u32;
            self.position += 1;
        }
        Some(value)
    }
}
