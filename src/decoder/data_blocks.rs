//! De-interleaving and error correction of the codeword stream

use crate::decoder::reed_solomon::{ReedSolomonDecoder, ReedSolomonError};
use crate::decoder::tables::{ec_blocks, total_codewords};
use crate::models::{ECLevel, Version};
use tracing::trace;

/// Split interleaved codewords into blocks, correct each one and return the
/// concatenated data codewords.
///
/// Shorter blocks come first; the longer ones carry one extra data codeword.
pub fn correct_codewords(
    codewords: &[u8],
    version: Version,
    level: ECLevel,
) -> Result<Vec<u8>, ReedSolomonError> {
    let layout = ec_blocks(version, level);
    let total = total_codewords(version);
    if codewords.len() != total {
        return Err(ReedSolomonError::BadLocation);
    }

    let num_blocks = layout.num_blocks;
    let data_total = total - num_blocks * layout.ecc_per_block;
    let short_data = data_total / num_blocks;
    let long_blocks = data_total % num_blocks;
    let short_blocks = num_blocks - long_blocks;
    let data_len = |b: usize| short_data + usize::from(b >= short_blocks);

    let mut blocks: Vec<Vec<u8>> = (0..num_blocks)
        .map(|b| Vec::with_capacity(data_len(b) + layout.ecc_per_block))
        .collect();
    let mut stream = codewords.iter().copied();
    for i in 0..=short_data {
        for (b, block) in blocks.iter_mut().enumerate() {
            if i < data_len(b) {
                block.extend(stream.next());
            }
        }
    }
    for _ in 0..layout.ecc_per_block {
        for block in blocks.iter_mut() {
            block.extend(stream.next());
        }
    }

    let decoder = ReedSolomonDecoder::new(layout.ecc_per_block);
    let mut data = Vec::with_capacity(data_total);
    for (b, block) in blocks.iter_mut().enumerate() {
        let corrected = decoder.decode(block)?;
        if corrected > 0 {
            trace!(block = b, corrected, "reed-solomon corrected codewords");
        }
        data.extend_from_slice(&block[..data_len(b)]);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::reed_solomon::encode;

    #[test]
    fn test_rejects_wrong_length() {
        let version = Version::new(1).unwrap();
        assert_eq!(
            correct_codewords(&[0; 25], version, ECLevel::L),
            Err(ReedSolomonError::BadLocation)
        );
    }

    #[test]
    fn test_all_zero_stream_is_valid() {
        // The zero polynomial is a codeword of every block.
        let version = Version::new(5).unwrap();
        let data = correct_codewords(&[0; 134], version, ECLevel::Q).unwrap();
        assert_eq!(data.len(), 134 - 4 * 18);
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_deinterleaves_mixed_block_lengths() {
        // Version 5-Q: two 15-codeword and two 16-codeword data blocks.
        let version = Version::new(5).unwrap();
        let sizes = [15usize, 15, 16, 16];
        let blocks: Vec<Vec<u8>> = sizes
            .iter()
            .enumerate()
            .map(|(b, &len)| {
                let data: Vec<u8> = (0..len).map(|i| (b * 40 + i) as u8).collect();
                encode(&data, 18)
            })
            .collect();

        let mut stream = Vec::new();
        for i in 0..16 {
            for (b, block) in blocks.iter().enumerate() {
                if i < sizes[b] {
                    stream.push(block[i]);
                }
            }
        }
        for i in 0..18 {
            for (b, block) in blocks.iter().enumerate() {
                stream.push(block[sizes[b] + i]);
            }
        }
        assert_eq!(stream.len(), 134);

        // Damage a few codewords spread over several blocks.
        for pos in [0, 7, 61, 90, 133] {
            stream[pos] ^= 0x5A;
        }

        let data = correct_codewords(&stream, version, ECLevel::Q).unwrap();
        let expected: Vec<u8> = sizes
            .iter()
            .enumerate()
            .flat_map(|(b, &len)| (0..len).map(move |i| (b * 40 + i) as u8))
            .collect();
        assert_eq!(data, expected);
    }
}
