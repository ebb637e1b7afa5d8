//! Image-processing helpers shared by the readers
//!
//! - Luminance extraction (RGB/RGBA/ARGB to one byte per pixel)
//! - Binarization (hybrid block thresholding, global histogram)
//! - Geometry (perspective transforms for grid sampling)

pub mod binarization;
pub mod geometry;
pub mod grayscale;
