use crate::error::ImageLoadError;

/// Single-byte intensity per pixel, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuminanceMap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl LuminanceMap {
    /// Wrap luminance bytes, checking that `data.len()` is `width * height`.
    /// Zero-sized maps are accepted; binarizers reject them.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageLoadError> {
        let expected = width * height;
        if data.len() != expected {
            return Err(ImageLoadError::InvalidBuffer {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self::from_parts(width, height, data))
    }

    /// Length already guaranteed by the caller (a validated `PixelBuffer`)
    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row `y`
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// All samples
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Minimum, maximum and mean intensity
    pub fn stats(&self) -> (u8, u8, u8) {
        if self.data.is_empty() {
            return (0, 0, 0);
        }
        let (mut min, mut max, mut sum) = (u8::MAX, 0u8, 0u64);
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
            sum += v as u64;
        }
        (min, max, (sum / self.data.len() as u64) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_checked() {
        let err = LuminanceMap::new(4, 4, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            ImageLoadError::InvalidBuffer {
                expected: 16,
                actual: 15,
                ..
            }
        ));
        assert!(LuminanceMap::new(0, 0, Vec::new()).unwrap().as_bytes().is_empty());
    }

    #[test]
    fn test_rows_and_stats() {
        let map = LuminanceMap::new(3, 2, vec![10, 20, 30, 40, 50, 60]).unwrap();
        assert_eq!(map.row(1), &[40, 50, 60]);
        assert_eq!(map.stats(), (10, 60, 35));
    }
}
