use crate::models::{BitMatrix, Version};

/// Function module mask for a specific QR version.
/// Set cells are function modules (finders, timing, alignment, format and
/// version info); clear cells carry data.
pub struct FunctionMask {
    mask: BitMatrix,
}

impl FunctionMask {
    /// Build the mask for `version`
    pub fn new(version: Version) -> Self {
        let dimension = version.dimension();
        let mut mask = BitMatrix::square(dimension);

        // Finders with separators and format info (the dark module is inside
        // the bottom-left region).
        mask.set_region(0, 0, 9, 9);
        mask.set_region(dimension - 8, 0, 8, 9);
        mask.set_region(0, dimension - 8, 9, 8);

        let centers = alignment_pattern_positions(version);
        let last = centers.len().saturating_sub(1);
        for (i, &x) in centers.iter().enumerate() {
            for (j, &y) in centers.iter().enumerate() {
                let overlaps_finder = (i == 0 && (j == 0 || j == last)) || (i == last && j == 0);
                if !overlaps_finder {
                    mask.set_region(x - 2, y - 2, 5, 5);
                }
            }
        }

        // Timing patterns
        mask.set_region(6, 9, 1, dimension - 17);
        mask.set_region(9, 6, dimension - 17, 1);

        if version.number() >= 7 {
            mask.set_region(dimension - 11, 0, 3, 6);
            mask.set_region(0, dimension - 11, 6, 3);
        }

        Self { mask }
    }

    /// Modules per side
    pub fn dimension(&self) -> usize {
        self.mask.width()
    }

    /// Whether (x, y) is a function module
    pub fn is_function(&self, x: usize, y: usize) -> bool {
        self.mask.get(x, y)
    }

    /// Number of modules available for codewords and remainder bits
    pub fn data_module_count(&self) -> usize {
        let total = self.dimension() * self.dimension();
        total - self.mask.count_dark()
    }
}

/// Alignment pattern centre coordinates (row and column share them).
pub fn alignment_pattern_positions(version: Version) -> Vec<usize> {
    let v = version.number() as usize;
    if v == 1 {
        return Vec::new();
    }
    let count = v / 7 + 2;
    let step = if v == 32 {
        26
    } else {
        (v * 4 + count * 2 + 1) / (count * 2 - 2) * 2
    };

    // Last centre sits 7 modules in from the edge; the others step back from it.
    let last = version.dimension() - 7;
    std::iter::once(6)
        .chain((0..count - 1).rev().map(|k| last - k * step))
        .collect()
}
