/// QR Code model 2 version (1-40)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(u8);

impl Version {
    /// Version `number`, or `None` outside 1-40
    pub fn new(number: u8) -> Option<Self> {
        (1..=40).contains(&number).then_some(Self(number))
    }

    /// Version for a grid of `dimension` modules per side
    pub fn from_dimension(dimension: usize) -> Option<Self> {
        if dimension < 21 || (dimension - 17) % 4 != 0 {
            return None;
        }
        Self::new(((dimension - 17) / 4) as u8)
    }

    /// Version number
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Modules per side
    pub fn dimension(&self) -> usize {
        17 + 4 * self.0 as usize
    }
}

/// Error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ECLevel {
    /// ~7% recovery
    L,
    /// ~15% recovery
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl ECLevel {
    /// Level from the two format-information bits (M=00, L=01, H=10, Q=11)
    pub fn from_format_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => ECLevel::M,
            1 => ECLevel::L,
            2 => ECLevel::H,
            _ => ECLevel::Q,
        }
    }

    /// Row index into the block tables (L, M, Q, H)
    pub fn table_index(&self) -> usize {
        match self {
            ECLevel::L => 0,
            ECLevel::M => 1,
            ECLevel::Q => 2,
            ECLevel::H => 3,
        }
    }
}

/// Data mask pattern (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskPattern(u8);

impl MaskPattern {
    /// Pattern from the three format-information bits
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0x07)
    }

    /// Pattern number
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Whether the module at (`row`, `col`) is inverted by this mask
    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        let (i, j) = (row, col);
        match self.0 {
            0 => (i + j) % 2 == 0,
            1 => i % 2 == 0,
            2 => j % 3 == 0,
            3 => (i + j) % 3 == 0,
            4 => (i / 2 + j / 3) % 2 == 0,
            5 => (i * j) % 2 + (i * j) % 3 == 0,
            6 => ((i * j) % 2 + (i * j) % 3) % 2 == 0,
            _ => ((i + j) % 2 + (i * j) % 3) % 2 == 0,
        }
    }
}
