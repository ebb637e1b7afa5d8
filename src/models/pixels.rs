use crate::error::ImageLoadError;

/// Sample layout of a [`PixelBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 8-bit luminance, one byte per pixel
    Luma8,
    /// 8-bit RGB, three bytes per pixel
    Rgb8,
    /// 8-bit RGBA, four bytes per pixel
    Rgba8,
    /// Packed `0xAARRGGBB` words, four bytes per pixel in native order
    Argb32,
}

impl PixelLayout {
    /// Bytes per pixel
    pub fn channels(&self) -> usize {
        match self {
            PixelLayout::Luma8 => 1,
            PixelLayout::Rgb8 => 3,
            PixelLayout::Rgba8 | PixelLayout::Argb32 => 4,
        }
    }
}

/// Immutable, row-major pixel samples produced by the loader.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    layout: PixelLayout,
    samples: Vec<u8>,
}

impl PixelBuffer {
    fn from_samples(
        width: usize,
        height: usize,
        layout: PixelLayout,
        samples: Vec<u8>,
    ) -> Result<Self, ImageLoadError> {
        if width == 0 || height == 0 {
            return Err(ImageLoadError::Empty { width, height });
        }
        let expected = width * height * layout.channels();
        if samples.len() != expected {
            return Err(ImageLoadError::InvalidBuffer {
                width,
                height,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            samples,
        })
    }

    /// Wrap grayscale bytes
    pub fn from_luma8(width: usize, height: usize, samples: Vec<u8>) -> Result<Self, ImageLoadError> {
        Self::from_samples(width, height, PixelLayout::Luma8, samples)
    }

    /// Wrap RGB bytes
    pub fn from_rgb8(width: usize, height: usize, samples: Vec<u8>) -> Result<Self, ImageLoadError> {
        Self::from_samples(width, height, PixelLayout::Rgb8, samples)
    }

    /// Wrap RGBA bytes
    pub fn from_rgba8(width: usize, height: usize, samples: Vec<u8>) -> Result<Self, ImageLoadError> {
        Self::from_samples(width, height, PixelLayout::Rgba8, samples)
    }

    /// Wrap packed ARGB words (the layout of an Android `Bitmap.getPixels` call)
    pub fn from_argb32(width: usize, height: usize, pixels: &[u32]) -> Result<Self, ImageLoadError> {
        if pixels.len() != width * height {
            return Err(ImageLoadError::InvalidBuffer {
                width,
                height,
                expected: width * height,
                actual: pixels.len(),
            });
        }
        let samples = pixels.iter().flat_map(|p| p.to_ne_bytes()).collect();
        Self::from_samples(width, height, PixelLayout::Argb32, samples)
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample layout
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Raw samples, `width * height * layout.channels()` bytes
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }
}
