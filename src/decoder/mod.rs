//! QR symbol decoding, from a sampled module grid to text
//!
//! - Format (BCH(15,5)) and version (BCH(18,6)) information
//! - Function-pattern masking, unmasking and zig-zag codeword reading
//! - Block de-interleaving and Reed-Solomon correction over GF(256)
//! - Segment parsing: numeric, alphanumeric, byte, kanji/hanzi, ECI, FNC1

/// Nearest-codeword lookup for format and version words
pub mod bch;
/// Zig-zag codeword reader over the unmasked grid
pub mod bitstream;
/// Block de-interleaving and per-block correction
pub mod data_blocks;
/// Format word: EC level and mask
pub mod format;
/// Which modules belong to function patterns for a given version
pub mod function_mask;
/// Segment decoders per data mode
pub mod modes;
/// Segment stream to text
pub mod payload;
/// Locate, sample and decode a QR symbol in a bit matrix
pub mod qr_decoder;
/// Reed-Solomon error correction
pub mod reed_solomon;
/// EC block layout per version and level
pub mod tables;
/// Version word for versions 7-40
pub mod version;
