//! Finder pattern detection using 1:1:3:1:1 ratio scanning with cross-checks

use crate::models::{BitMatrix, Point};
use tracing::trace;

/// Largest symbol (version 40) in modules, used to size the row step
const MAX_MODULES: usize = 97;
const MIN_SKIP: usize = 2;

/// A located finder pattern centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPattern {
    /// Centre of the 3x3 core
    pub center: Point,
    /// Estimated module size in pixels
    pub module_size: f32,
    /// Number of scan rows that confirmed this pattern
    pub count: usize,
}

impl FinderPattern {
    /// Pattern confirmed by a single scan
    pub fn new(x: f32, y: f32, module_size: f32) -> Self {
        Self {
            center: Point::new(x, y),
            module_size,
            count: 1,
        }
    }

    fn about_equals(&self, x: f32, y: f32, module_size: f32) -> bool {
        if (y - self.center.y).abs() <= module_size && (x - self.center.x).abs() <= module_size {
            let diff = (module_size - self.module_size).abs();
            return diff <= 1.0 || diff <= self.module_size;
        }
        false
    }

    // Count-weighted running average.
    fn combine(&self, x: f32, y: f32, module_size: f32) -> Self {
        let n = self.count as f32;
        let total = n + 1.0;
        Self {
            center: Point::new(
                (n * self.center.x + x) / total,
                (n * self.center.y + y) / total,
            ),
            module_size: (n * self.module_size + module_size) / total,
            count: self.count + 1,
        }
    }
}

/// Scans a bit matrix for finder patterns
pub struct FinderDetector;

impl FinderDetector {
    /// All finder candidates, strongest (most confirmations) first.
    ///
    /// With `try_harder` every row is scanned; otherwise rows are skipped in
    /// proportion to the image height.
    pub fn detect(matrix: &BitMatrix, try_harder: bool) -> Vec<FinderPattern> {
        let height = matrix.height();
        let step = if try_harder {
            1
        } else {
            ((3 * height) / (4 * MAX_MODULES)).max(MIN_SKIP)
        };

        let mut centers: Vec<FinderPattern> = Vec::new();
        for y in (0..height).step_by(step) {
            let runs = row_runs(matrix, y);
            for window in runs.windows(5) {
                if !window[0].dark {
                    continue;
                }
                let counts = [
                    window[0].len,
                    window[1].len,
                    window[2].len,
                    window[3].len,
                    window[4].len,
                ];
                if !found_pattern_cross(&counts) {
                    continue;
                }
                let end = window[4].start + window[4].len;
                if let Some((x, y, size)) = confirm(matrix, &counts, end, y) {
                    match centers.iter_mut().find(|c| c.about_equals(x, y, size)) {
                        Some(existing) => *existing = existing.combine(x, y, size),
                        None => centers.push(FinderPattern::new(x, y, size)),
                    }
                }
            }
        }

        centers.sort_by(|a, b| b.count.cmp(&a.count));
        trace!(candidates = centers.len(), step, "finder scan complete");
        centers
    }
}

#[derive(Debug, Clone, Copy)]
struct Run {
    start: usize,
    len: usize,
    dark: bool,
}

fn row_runs(matrix: &BitMatrix, y: usize) -> Vec<Run> {
    let width = matrix.width();
    let mut runs = Vec::new();
    if width == 0 {
        return runs;
    }
    let mut start = 0;
    let mut dark = matrix.get(0, y);
    for x in 1..width {
        let cell = matrix.get(x, y);
        if cell != dark {
            runs.push(Run {
                start,
                len: x - start,
                dark,
            });
            start = x;
            dark = cell;
        }
    }
    runs.push(Run {
        start,
        len: width - start,
        dark,
    });
    runs
}

/// Whether five run lengths look like dark:light:dark:light:dark = 1:1:3:1:1
fn found_pattern_cross(counts: &[usize; 5]) -> bool {
    let total: usize = counts.iter().sum();
    if total < 7 || counts.contains(&0) {
        return false;
    }
    let module = total as f32 / 7.0;
    let max_variance = module / 2.0;
    (module - counts[0] as f32).abs() < max_variance
        && (module - counts[1] as f32).abs() < max_variance
        && (3.0 * module - counts[2] as f32).abs() < 3.0 * max_variance
        && (module - counts[3] as f32).abs() < max_variance
        && (module - counts[4] as f32).abs() < max_variance
}

fn center_from_end(counts: &[usize; 5], end: usize) -> f32 {
    end as f32 - counts[4] as f32 - counts[3] as f32 - counts[2] as f32 / 2.0
}

/// Vertical then horizontal cross-check of a row hit; returns the refined
/// centre and module size.
fn confirm(matrix: &BitMatrix, counts: &[usize; 5], end: usize, row: usize) -> Option<(f32, f32, f32)> {
    let total: usize = counts.iter().sum();
    let center_x = center_from_end(counts, end);

    let column = center_x as usize;
    let (center_y, v_total) = cross_check(matrix.height(), row, counts[2], total, |i| {
        matrix.get(column, i)
    })?;

    let y = center_y as usize;
    let (center_x, h_total) = cross_check(matrix.width(), column, counts[2], total, |i| {
        matrix.get(i, y)
    })?;

    let module_size = (v_total + h_total) as f32 / 14.0;
    Some((center_x, center_y, module_size))
}

/// Walk outward from `center` along one axis and re-measure the five runs.
///
/// `max_count` bounds the outer runs so that a hit inside a large dark area
/// is rejected early; `original_total` is the pattern width seen on the scan
/// row and the cross section must agree with it.
fn cross_check(
    len: usize,
    center: usize,
    max_count: usize,
    original_total: usize,
    dark_at: impl Fn(usize) -> bool,
) -> Option<(f32, usize)> {
    if center >= len || !dark_at(center) {
        return None;
    }
    let mut counts = [0usize; 5];

    let mut i = center as isize;
    while i >= 0 && dark_at(i as usize) {
        counts[2] += 1;
        i -= 1;
    }
    while i >= 0 && !dark_at(i as usize) && counts[1] <= max_count {
        counts[1] += 1;
        i -= 1;
    }
    if i < 0 || counts[1] > max_count {
        return None;
    }
    while i >= 0 && dark_at(i as usize) && counts[0] <= max_count {
        counts[0] += 1;
        i -= 1;
    }
    if counts[0] > max_count {
        return None;
    }

    let mut j = center + 1;
    while j < len && dark_at(j) {
        counts[2] += 1;
        j += 1;
    }
    while j < len && !dark_at(j) && counts[3] < max_count {
        counts[3] += 1;
        j += 1;
    }
    if j == len || counts[3] >= max_count {
        return None;
    }
    while j < len && dark_at(j) && counts[4] < max_count {
        counts[4] += 1;
        j += 1;
    }
    if counts[4] >= max_count {
        return None;
    }

    let total: usize = counts.iter().sum();
    if 5 * total.abs_diff(original_total) >= 2 * original_total {
        return None;
    }
    if !found_pattern_cross(&counts) {
        return None;
    }
    Some((center_from_end(&counts, j), total))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Draw a 7x7 finder pattern with its top-left corner at (`x`, `y`)
    fn draw_finder(matrix: &mut BitMatrix, x: usize, y: usize, module: usize) {
        matrix.set_region(x, y, 7 * module, 7 * module);
        for yy in y + module..y + 6 * module {
            for xx in x + module..x + 6 * module {
                matrix.set(xx, yy, false);
            }
        }
        matrix.set_region(x + 2 * module, y + 2 * module, 3 * module, 3 * module);
    }

    #[test]
    fn test_pattern_ratios() {
        assert!(found_pattern_cross(&[3, 3, 9, 3, 3]));
        assert!(found_pattern_cross(&[2, 3, 10, 3, 3]));
        // Centre run gets three times the per-module allowance.
        assert!(found_pattern_cross(&[3, 3, 5, 3, 3]));
        assert!(!found_pattern_cross(&[3, 3, 3, 3, 3]));
        assert!(!found_pattern_cross(&[3, 3, 9, 3, 8]));
        assert!(!found_pattern_cross(&[1, 0, 3, 1, 1]));
        assert!(!found_pattern_cross(&[1, 1, 1, 1, 1]));
    }

    #[test]
    fn test_single_pattern_located() {
        let mut matrix = BitMatrix::new(60, 60);
        draw_finder(&mut matrix, 10, 12, 4);

        let patterns = FinderDetector::detect(&matrix, true);
        assert_eq!(patterns.len(), 1);
        let p = patterns[0];
        assert!((p.center.x - 24.0).abs() < 1.5, "x = {}", p.center.x);
        assert!((p.center.y - 26.0).abs() < 1.5, "y = {}", p.center.y);
        assert!((p.module_size - 4.0).abs() < 0.6);
        assert!(p.count > 1);
    }

    #[test]
    fn test_three_patterns() {
        let mut matrix = BitMatrix::new(120, 120);
        draw_finder(&mut matrix, 8, 8, 3);
        draw_finder(&mut matrix, 80, 8, 3);
        draw_finder(&mut matrix, 8, 80, 3);

        let patterns = FinderDetector::detect(&matrix, false);
        assert_eq!(patterns.len(), 3);
    }

    #[test]
    fn test_solid_block_rejected() {
        let mut matrix = BitMatrix::new(50, 50);
        matrix.set_region(10, 10, 30, 30);
        assert!(FinderDetector::detect(&matrix, true).is_empty());
    }
}
