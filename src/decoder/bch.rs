//! BCH codes protecting the QR format and version information
//!
//! Both codes are short enough that decoding is a nearest-codeword search
//! over every valid data value.

use std::ops::RangeInclusive;

/// Most bit errors either code can correct
pub const MAX_CORRECTABLE: u32 = 3;

/// A systematic BCH code with an optional XOR mask
#[derive(Debug, Clone, Copy)]
pub struct BchCode {
    generator: u32,
    ecc_bits: u32,
    mask: u32,
}

impl BchCode {
    /// BCH(15,5) format information, masked with 0x5412
    pub const FORMAT: BchCode = BchCode {
        generator: 0x537,
        ecc_bits: 10,
        mask: 0x5412,
    };

    /// BCH(18,6) version information, unmasked
    pub const VERSION: BchCode = BchCode {
        generator: 0x1F25,
        ecc_bits: 12,
        mask: 0,
    };

    /// Full codeword for `data`: data bits, then the remainder, then the mask
    pub fn encode(&self, data: u32) -> u32 {
        let degree = 31 - self.generator.leading_zeros();
        let mut remainder = data << self.ecc_bits;
        while remainder >> self.ecc_bits != 0 {
            let shift = (31 - remainder.leading_zeros()) - degree;
            remainder ^= self.generator << shift;
        }
        ((data << self.ecc_bits) | remainder) ^ self.mask
    }

    /// Data value whose codeword is closest to any of `reads`, if within
    /// [`MAX_CORRECTABLE`] bit errors.
    pub fn decode(&self, reads: &[u32], data: RangeInclusive<u32>) -> Option<u32> {
        let mut best: Option<(u32, u32)> = None;
        for value in data {
            let codeword = self.encode(value);
            for &read in reads {
                let distance = (read ^ codeword).count_ones();
                if distance == 0 {
                    return Some(value);
                }
                if best.is_none_or(|(_, d)| distance < d) {
                    best = Some((value, distance));
                }
            }
        }
        best.filter(|&(_, d)| d <= MAX_CORRECTABLE).map(|(value, _)| value)
    }
}
