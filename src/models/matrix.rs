/// One-bit-per-cell grid; a set bit is a dark cell.
///
/// Rows are padded to whole 32-bit words so a single row can be pulled out
/// without touching its neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    row_words: usize,
    bits: Vec<u32>,
}

impl BitMatrix {
    /// Create an all-light matrix
    pub fn new(width: usize, height: usize) -> Self {
        let row_words = width.div_ceil(32);
        Self {
            width,
            height,
            row_words,
            bits: vec![0; row_words * height],
        }
    }

    /// Square matrix, as used for sampled QR grids
    pub fn square(dimension: usize) -> Self {
        Self::new(dimension, dimension)
    }

    /// Matrix width in cells
    pub fn width(&self) -> usize {
        self.width
    }

    /// Matrix height in cells
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether (x, y) is dark; out-of-range cells read as light
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let word = self.bits[y * self.row_words + x / 32];
        (word >> (x % 32)) & 1 == 1
    }

    /// Set (x, y) dark or light; out-of-range writes are ignored
    pub fn set(&mut self, x: usize, y: usize, dark: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let word = &mut self.bits[y * self.row_words + x / 32];
        if dark {
            *word |= 1 << (x % 32);
        } else {
            *word &= !(1 << (x % 32));
        }
    }

    /// Invert (x, y)
    pub fn flip(&mut self, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.bits[y * self.row_words + x / 32] ^= 1 << (x % 32);
    }

    /// Mark a rectangle dark, clipped to the matrix
    pub fn set_region(&mut self, left: usize, top: usize, width: usize, height: usize) {
        let right = (left + width).min(self.width);
        let bottom = (top + height).min(self.height);
        for y in top..bottom {
            for x in left..right {
                self.set(x, y, true);
            }
        }
    }

    /// Copy of row `y` as one bool per cell
    pub fn row(&self, y: usize) -> Vec<bool> {
        (0..self.width).map(|x| self.get(x, y)).collect()
    }

    /// Number of dark cells
    pub fn count_dark(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Matrix mirrored across its main diagonal
    pub fn transposed(&self) -> BitMatrix {
        let mut out = BitMatrix::new(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    out.set(y, x, true);
                }
            }
        }
        out
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
