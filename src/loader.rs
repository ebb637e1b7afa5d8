//! Image loading and downsampling
//!
//! Files are decoded at full resolution by the `image` codecs, then reduced
//! by an integer factor so binarization and symbol reading touch roughly 400
//! rows regardless of the camera resolution. Peak memory during loading is
//! that of the full-size image. The header probe only rejects unreadable or
//! zero-sized files before the full decode.

use crate::error::ImageLoadError;
use crate::models::PixelBuffer;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError};
use std::path::Path;
use tracing::debug;

/// Row count the downsampling factor aims for
pub const TARGET_HEIGHT: u32 = 400;

/// Integer reduction factor for an image `height` pixels tall: `max(1, height / 400)`
pub fn sample_factor(height: u32) -> u32 {
    (height / TARGET_HEIGHT).max(1)
}

/// A decoded, possibly downsampled image
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// RGB samples after downsampling
    pub buffer: PixelBuffer,
    /// Factor the original was reduced by (1 = untouched)
    pub sample_factor: u32,
    /// Width before downsampling
    pub original_width: u32,
    /// Height before downsampling
    pub original_height: u32,
}

/// Load an image file, downsampling it by [`sample_factor`].
pub fn load_path(path: &Path) -> Result<LoadedImage, ImageLoadError> {
    if !path.exists() {
        return Err(ImageLoadError::NotFound(path.to_path_buf()));
    }

    // A file whose header cannot be read is never fully decoded.
    let (width, height) =
        image::image_dimensions(path).map_err(|source| classify(path, source))?;
    if width == 0 || height == 0 {
        return Err(ImageLoadError::Empty {
            width: width as usize,
            height: height as usize,
        });
    }
    debug!(path = %path.display(), width, height, factor = sample_factor(height), "probed image");

    let image = image::open(path).map_err(|source| classify(path, source))?;
    load_dynamic(image)
}

/// Downsample an already decoded image by [`sample_factor`].
pub fn load_dynamic(image: DynamicImage) -> Result<LoadedImage, ImageLoadError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(ImageLoadError::Empty {
            width: width as usize,
            height: height as usize,
        });
    }

    let factor = sample_factor(height);
    let rgb = if factor > 1 {
        let (w, h) = ((width / factor).max(1), (height / factor).max(1));
        debug!(factor, from = ?(width, height), to = ?(w, h), "downsampling");
        image::imageops::resize(&image.to_rgb8(), w, h, FilterType::Triangle)
    } else {
        image.to_rgb8()
    };

    let (w, h) = (rgb.width() as usize, rgb.height() as usize);
    let buffer = PixelBuffer::from_rgb8(w, h, rgb.into_raw())?;
    Ok(LoadedImage {
        buffer,
        sample_factor: factor,
        original_width: width,
        original_height: height,
    })
}

fn classify(path: &Path, source: ImageError) -> ImageLoadError {
    let path = path.to_path_buf();
    match source {
        ImageError::IoError(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
            ImageLoadError::NotFound(path)
        }
        ImageError::Unsupported(_) => ImageLoadError::Unsupported { path, source },
        source => ImageLoadError::Decode { path, source },
    }
}
