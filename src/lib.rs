//! barscan - local barcode and QR code decoding from images
//!
//! A pure Rust decode engine: an image goes through luminance extraction,
//! binarization and symbol reading, with one retry using a second
//! binarization strategy when the first attempt finds nothing.
//!
//! Supported symbologies: QR Code, EAN-13, UPC-A, EAN-8 and Code 128.
//!
//! ```no_run
//! use barscan::{BarcodeFormat, DecodeConfig, Engine, SymbologySet};
//!
//! let engine = Engine::new(
//!     DecodeConfig::new().with_formats(SymbologySet::only(BarcodeFormat::QrCode)),
//! );
//! let decoded = engine.decode_path("ticket.png")?;
//! println!("{} ({})", decoded.text, decoded.format);
//! # Ok::<(), barscan::DecodeError>(())
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Decode options and symbology identifiers
pub mod config;
/// QR code decoding modules (error correction, format extraction, data modes)
pub mod decoder;
/// QR code detection modules (finder patterns, alignment)
pub mod detector;
/// Load-binarize-read orchestration with binarizer fallback
pub mod engine;
/// Error taxonomy
pub mod error;
/// Image file loading and downsampling
pub mod loader;
/// Core data structures (BitMatrix, PixelBuffer, Point, Symbol, etc.)
pub mod models;
/// Linear barcode readers (EAN/UPC, Code 128)
pub mod one_d;
/// Symbol readers over a bit matrix
pub mod reader;
/// Utility functions (grayscale, binarization, geometry)
pub mod utils;

pub use config::{BarcodeFormat, DecodeConfig, SymbologySet};
pub use engine::{Decoded, Engine, FallbackController};
pub use error::{AttemptError, BinarizationError, ConfigError, DecodeError, ImageLoadError, NoSymbolFoundError};
pub use models::{BitMatrix, LuminanceMap, PixelBuffer, PixelLayout, Symbol};
pub use utils::binarization::{Binarizer, BinarizerKind, GlobalHistogramBinarizer, HybridBinarizer};

use std::path::Path;

/// Decode the first symbol in an image file with the default configuration
///
/// # Arguments
/// * `path` - Image file (any format the `image` crate can read)
///
/// # Returns
/// The decoded symbol, or why none was found
pub fn decode_file(path: impl AsRef<Path>) -> Result<Decoded, DecodeError> {
    Engine::default().decode_path(path)
}

/// Decode the first symbol in a raw pixel buffer with the default
/// configuration. The buffer is not downsampled.
pub fn decode_pixels(buffer: &PixelBuffer) -> Result<Decoded, DecodeError> {
    Engine::default().decode_buffer(buffer)
}
