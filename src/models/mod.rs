/// Per-pixel luminance plane
pub mod luminance;
/// Bit-packed dark/light matrix
pub mod matrix;
/// Raw pixel buffers in the supported layouts
pub mod pixels;
/// Sub-pixel image coordinates
pub mod point;
/// QR version, error correction level and mask pattern
pub mod qr_code;
/// Decoded symbol
pub mod symbol;

pub use luminance::LuminanceMap;
pub use matrix::BitMatrix;
pub use pixels::{PixelBuffer, PixelLayout};
pub use point::Point;
pub use qr_code::{ECLevel, MaskPattern, Version};
pub use symbol::Symbol;
