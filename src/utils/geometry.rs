//! Projective mapping between quadrilaterals

use crate::models::Point;

/// 3x3 homography with h33 fixed to 1
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveTransform {
    h: [f64; 8],
}

impl PerspectiveTransform {
    /// Transform taking each `src[i]` to `dst[i]`; `None` for degenerate quads
    pub fn from_quads(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        // Direct linear transform: two equations per correspondence.
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];
        for i in 0..4 {
            let (sx, sy) = (src[i].x as f64, src[i].y as f64);
            let (dx, dy) = (dst[i].x as f64, dst[i].y as f64);
            a[2 * i] = [sx, sy, 1.0, 0.0, 0.0, 0.0, -dx * sx, -dx * sy];
            b[2 * i] = dx;
            a[2 * i + 1] = [0.0, 0.0, 0.0, sx, sy, 1.0, -dy * sx, -dy * sy];
            b[2 * i + 1] = dy;
        }
        solve(a, b).map(|h| Self { h })
    }

    /// Map a point through the transform
    pub fn map(&self, p: &Point) -> Point {
        let (x, y) = (p.x as f64, p.y as f64);
        let h = &self.h;
        let w = h[6] * x + h[7] * y + 1.0;
        if w.abs() < 1e-12 {
            return Point::new(f32::NAN, f32::NAN);
        }
        Point::new(
            ((h[0] * x + h[1] * y + h[2]) / w) as f32,
            ((h[3] * x + h[4] * y + h[5]) / w) as f32,
        )
    }
}

/// Gaussian elimination with partial pivoting
#[allow(clippy::needless_range_loop)]
fn solve(mut a: [[f64; 8]; 8], mut b: [f64; 8]) -> Option<[f64; 8]> {
    const N: usize = 8;
    for col in 0..N {
        let pivot = (col..N).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..N {
            let factor = a[row][col] / a[col][col];
            b[row] -= factor * b[col];
            for k in col..N {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut x = [0.0f64; N];
    for row in (0..N).rev() {
        let mut sum = b[row];
        for k in row + 1..N {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}
