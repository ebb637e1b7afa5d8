//! Reed-Solomon error correction for QR codes
//!
//! Codes live in GF(256) with primitive polynomial x^8 + x^4 + x^3 + x^2 + 1
//! (0x11D) and generator roots alpha^0 .. alpha^(n-1).

use thiserror::Error;

const PRIMITIVE: u16 = 0x11D;

struct Tables {
    exp: [u8; 512],
    log: [u8; 256],
}

impl Tables {
    const fn build() -> Self {
        let mut exp = [0u8; 512];
        let mut log = [0u8; 256];
        let mut x: u16 = 1;
        let mut i = 0;
        while i < 255 {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= PRIMITIVE;
            }
            i += 1;
        }
        while i < 512 {
            exp[i] = exp[i - 255];
            i += 1;
        }
        Self { exp, log }
    }
}

static GF: Tables = Tables::build();

/// GF(256) arithmetic
pub struct Gf256;

impl Gf256 {
    /// Product of two field elements
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        GF.exp[GF.log[a as usize] as usize + GF.log[b as usize] as usize]
    }

    /// Quotient `a / b`; `b` must be non-zero
    pub fn div(a: u8, b: u8) -> u8 {
        debug_assert!(b != 0, "division by zero in GF(256)");
        if a == 0 {
            return 0;
        }
        GF.exp[GF.log[a as usize] as usize + 255 - GF.log[b as usize] as usize]
    }

    /// alpha^n
    pub fn exp(n: usize) -> u8 {
        GF.exp[n % 255]
    }

    /// Multiplicative inverse of a non-zero element
    pub fn inverse(a: u8) -> u8 {
        GF.exp[255 - GF.log[a as usize] as usize]
    }
}

/// Why a block could not be corrected
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReedSolomonError {
    /// More errors than the ECC codewords can locate
    #[error("too many errors ({found} locator roots, degree {degree})")]
    TooManyErrors {
        /// Roots found by the Chien search
        found: usize,
        /// Degree of the error locator
        degree: usize,
    },
    /// An error position fell outside the block
    #[error("error location outside the block")]
    BadLocation,
    /// Correction did not produce a valid codeword
    #[error("correction did not converge")]
    Unresolved,
}

/// Reed-Solomon decoder for blocks with a fixed number of ECC codewords
pub struct ReedSolomonDecoder {
    ecc_len: usize,
}

impl ReedSolomonDecoder {
    /// Decoder for blocks ending in `ecc_len` error correction codewords
    pub fn new(ecc_len: usize) -> Self {
        Self { ecc_len }
    }

    /// Correct `block` in place (first codeword is the highest-degree
    /// coefficient). Returns the number of corrected codewords.
    pub fn decode(&self, block: &mut [u8]) -> Result<usize, ReedSolomonError> {
        let syndromes = syndromes(block, self.ecc_len);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok(0);
        }

        let locator = berlekamp_massey(&syndromes);
        let degree = locator.len() - 1;
        if degree == 0 || 2 * degree > self.ecc_len {
            return Err(ReedSolomonError::TooManyErrors { found: 0, degree });
        }

        let n = block.len();
        if n > 255 {
            return Err(ReedSolomonError::BadLocation);
        }
        let positions: Vec<usize> = (0..n)
            .filter(|&j| eval(&locator, Gf256::inverse(Gf256::exp(n - 1 - j))) == 0)
            .collect();
        if positions.len() != degree {
            return Err(ReedSolomonError::TooManyErrors {
                found: positions.len(),
                degree,
            });
        }

        // Omega(x) = S(x) * Lambda(x) mod x^ecc_len
        let mut omega = vec![0u8; self.ecc_len];
        for (i, &s) in syndromes.iter().enumerate() {
            for (j, &l) in locator.iter().enumerate() {
                if i + j < self.ecc_len {
                    omega[i + j] ^= Gf256::mul(s, l);
                }
            }
        }

        for &j in &positions {
            let x = Gf256::exp(n - 1 - j);
            let x_inv = Gf256::inverse(x);
            // Formal derivative keeps the odd-power terms.
            let mut derivative = 0u8;
            let mut power = 1u8;
            for (i, &l) in locator.iter().enumerate().skip(1) {
                if i % 2 == 1 {
                    derivative ^= Gf256::mul(l, power);
                }
                power = Gf256::mul(power, x_inv);
            }
            if derivative == 0 {
                return Err(ReedSolomonError::Unresolved);
            }
            let magnitude = Gf256::mul(x, Gf256::div(eval(&omega, x_inv), derivative));
            block[j] ^= magnitude;
        }

        if syndromes_of(block, self.ecc_len).any(|s| s != 0) {
            return Err(ReedSolomonError::Unresolved);
        }
        Ok(positions.len())
    }
}

/// S_i = R(alpha^i) for i in 0..count
fn syndromes(block: &[u8], count: usize) -> Vec<u8> {
    syndromes_of(block, count).collect()
}

fn syndromes_of(block: &[u8], count: usize) -> impl Iterator<Item = u8> + '_ {
    (0..count).map(move |i| {
        let alpha_i = Gf256::exp(i);
        block.iter().fold(0u8, |acc, &c| Gf256::mul(acc, alpha_i) ^ c)
    })
}

/// Error locator Lambda(x), lowest-degree coefficient first
fn berlekamp_massey(syndromes: &[u8]) -> Vec<u8> {
    let mut locator = vec![1u8];
    let mut previous = vec![1u8];
    let mut length = 0usize;
    let mut shift = 1usize;
    let mut last_discrepancy = 1u8;

    for k in 0..syndromes.len() {
        let mut discrepancy = syndromes[k];
        for i in 1..=length.min(locator.len() - 1) {
            discrepancy ^= Gf256::mul(locator[i], syndromes[k - i]);
        }
        if discrepancy == 0 {
            shift += 1;
            continue;
        }

        let scale = Gf256::div(discrepancy, last_discrepancy);
        let snapshot = locator.clone();
        if locator.len() < previous.len() + shift {
            locator.resize(previous.len() + shift, 0);
        }
        for (i, &p) in previous.iter().enumerate() {
            locator[i + shift] ^= Gf256::mul(scale, p);
        }

        if 2 * length <= k {
            length = k + 1 - length;
            previous = snapshot;
            last_discrepancy = discrepancy;
            shift = 1;
        } else {
            shift += 1;
        }
    }

    while locator.len() > 1 && locator.last() == Some(&0) {
        locator.pop();
    }
    locator
}

/// Evaluate a lowest-degree-first polynomial at `x`
fn eval(poly: &[u8], x: u8) -> u8 {
    poly.iter().rev().fold(0u8, |acc, &c| Gf256::mul(acc, x) ^ c)
}

/// Systematic encoder, used to build test blocks
#[cfg(test)]
pub(crate) fn encode(data: &[u8], ecc_len: usize) -> Vec<u8> {
    // Generator (x - a^0)(x - a^1)..., highest degree first
    let mut generator = vec![1u8];
    for i in 0..ecc_len {
        let mut next = vec![0u8; generator.len() + 1];
        for (j, &g) in generator.iter().enumerate() {
            next[j] ^= g;
            next[j + 1] ^= Gf256::mul(g, Gf256::exp(i));
        }
        generator = next;
    }

    let mut remainder = data.to_vec();
    remainder.resize(data.len() + ecc_len, 0);
    for i in 0..data.len() {
        let coef = remainder[i];
        if coef != 0 {
            for (j, &g) in generator.iter().enumerate() {
                remainder[i + j] ^= Gf256::mul(g, coef);
            }
        }
    }

    let mut block = data.to_vec();
    block.extend_from_slice(&remainder[data.len()..]);
    block
}
