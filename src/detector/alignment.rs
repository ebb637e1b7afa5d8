//! Alignment pattern search
//!
//! Versions 2 and up carry a 5x5 alignment pattern near the bottom-right
//! corner. Locating it corrects the parallelogram estimate of the fourth
//! corner for perspective distortion.

use crate::models::{BitMatrix, Point};

/// Mismatching cells (out of 25) still accepted as an alignment pattern
const MAX_MISMATCH: usize = 5;

/// Search a window of about four modules around `predicted` for the pattern
/// centre. Pixels tied on the best score are averaged; the result is in
/// continuous image coordinates (pixel `x` spans `x..x + 1`).
pub fn find_alignment(binary: &BitMatrix, predicted: Point, module_size: f32) -> Option<Point> {
    if !predicted.x.is_finite() || !predicted.y.is_finite() || module_size < 1.0 {
        return None;
    }

    let radius = (module_size * 4.0).max(4.0);
    let max_x = binary.width().saturating_sub(1) as f32;
    let max_y = binary.height().saturating_sub(1) as f32;
    let min_x = (predicted.x - radius).floor().max(0.0) as usize;
    let hi_x = (predicted.x + radius).ceil().min(max_x) as usize;
    let min_y = (predicted.y - radius).floor().max(0.0) as usize;
    let hi_y = (predicted.y + radius).ceil().min(max_y) as usize;
    if min_x > hi_x || min_y > hi_y {
        return None;
    }

    let mut best = usize::MAX;
    let (mut sum_x, mut sum_y, mut hits) = (0.0f32, 0.0f32, 0usize);
    for y in min_y..=hi_y {
        for x in min_x..=hi_x {
            if !binary.get(x, y) {
                continue;
            }
            let center = Point::new(x as f32, y as f32);
            let Some(mismatch) = pattern_mismatch(binary, &center, module_size) else {
                continue;
            };
            if mismatch < best {
                best = mismatch;
                (sum_x, sum_y, hits) = (0.0, 0.0, 0);
            }
            if mismatch == best {
                sum_x += center.x;
                sum_y += center.y;
                hits += 1;
            }
        }
    }

    (best <= MAX_MISMATCH && hits > 0)
        .then(|| Point::new(sum_x / hits as f32 + 0.5, sum_y / hits as f32 + 0.5))
}

/// Compare the 5x5 neighbourhood (in module steps) with the dark ring,
/// light ring, dark centre template. `None` when it leaves the image.
fn pattern_mismatch(binary: &BitMatrix, center: &Point, module_size: f32) -> Option<usize> {
    let mut mismatches = 0;
    for dy in -2i32..=2 {
        for dx in -2i32..=2 {
            let expected = dx.abs() == 2 || dy.abs() == 2 || (dx == 0 && dy == 0);
            let sx = (center.x + dx as f32 * module_size).round();
            let sy = (center.y + dy as f32 * module_size).round();
            if sx < 0.0 || sy < 0.0 {
                return None;
            }
            let (sx, sy) = (sx as usize, sy as usize);
            if sx >= binary.width() || sy >= binary.height() {
                return None;
            }
            if binary.get(sx, sy) != expected {
                mismatches += 1;
            }
        }
    }
    Some(mismatches)
}
