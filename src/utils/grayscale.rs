//! Luminance extraction
//!
//! Y = 0.299*R + 0.587*G + 0.114*B, computed in fixed point as
//! (76*R + 150*G + 29*B) >> 8

use crate::models::{LuminanceMap, PixelBuffer, PixelLayout};

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Convert a pixel buffer to one luminance byte per pixel. Alpha is ignored.
pub fn extract_luminance(buffer: &PixelBuffer) -> LuminanceMap {
    let samples = buffer.samples();
    let data: Vec<u8> = match buffer.layout() {
        PixelLayout::Luma8 => samples.to_vec(),
        PixelLayout::Rgb8 => samples
            .chunks_exact(3)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect(),
        PixelLayout::Rgba8 => samples
            .chunks_exact(4)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect(),
        PixelLayout::Argb32 => samples
            .chunks_exact(4)
            .map(|px| {
                let argb = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
                luma((argb >> 16) as u8, (argb >> 8) as u8, argb as u8)
            })
            .collect(),
    };
    LuminanceMap::from_parts(buffer.width(), buffer.height(), data)
}
