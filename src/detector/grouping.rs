use super::finder::FinderPattern;
use crate::models::Point;
use std::cmp::Ordering;

/// Three finder patterns assigned to their corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderTriple {
    /// Corner finder (the right angle)
    pub top_left: Point,
    /// Finder along the first row
    pub top_right: Point,
    /// Finder along the first column
    pub bottom_left: Point,
    /// Mean module size of the three patterns
    pub module_size: f32,
}

impl FinderTriple {
    /// Fourth corner of the parallelogram spanned by the three finders
    pub fn bottom_right(&self) -> Point {
        Point::new(
            self.top_right.x + self.bottom_left.x - self.top_left.x,
            self.top_right.y + self.bottom_left.y - self.top_left.y,
        )
    }

    /// Modules per side implied by finder spacing, snapped to `17 + 4v`
    pub fn estimate_dimension(&self) -> Option<usize> {
        if self.module_size <= 0.0 {
            return None;
        }
        let across = self.top_left.distance(&self.top_right) / self.module_size;
        let down = self.top_left.distance(&self.bottom_left) / self.module_size;
        let raw = (across + down) / 2.0 + 7.0;
        let version = ((raw - 17.0) / 4.0).round();
        if !(1.0..=40.0).contains(&version) {
            return None;
        }
        Some(17 + 4 * version as usize)
    }
}

/// Candidate finder triples, best-looking first, at most `limit` of them.
pub fn group_finder_patterns(patterns: &[FinderPattern], limit: usize) -> Vec<FinderTriple> {
    let mut scored: Vec<(f32, FinderTriple)> = Vec::new();
    for i in 0..patterns.len() {
        for j in i + 1..patterns.len() {
            for k in j + 1..patterns.len() {
                let (a, b, c) = (&patterns[i], &patterns[j], &patterns[k]);
                if let Some(score) = triple_score(a, b, c) {
                    if let Some(triple) = order_triple(a, b, c) {
                        scored.push((score, triple));
                    }
                }
            }
        }
    }
    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    scored.into_iter().take(limit).map(|(_, t)| t).collect()
}

/// Lower is better; `None` for triples that cannot be one symbol.
fn triple_score(a: &FinderPattern, b: &FinderPattern, c: &FinderPattern) -> Option<f32> {
    let sizes = [a.module_size, b.module_size, c.module_size];
    let min_size = sizes.iter().copied().fold(f32::INFINITY, f32::min);
    let max_size = sizes.iter().copied().fold(0.0, f32::max);
    if min_size < 1.0 {
        return None;
    }
    let size_ratio = max_size / min_size;
    if size_ratio > 2.0 {
        return None;
    }

    let distances = [
        a.center.distance(&b.center),
        a.center.distance(&c.center),
        b.center.distance(&c.center),
    ];
    let min_d = distances.iter().copied().fold(f32::INFINITY, f32::min);
    let max_d = distances.iter().copied().fold(0.0, f32::max);
    let avg_module = sizes.iter().sum::<f32>() / 3.0;
    // Finders of the smallest symbol are 14 modules apart.
    if min_d < avg_module * 10.0 {
        return None;
    }
    let distortion = max_d / min_d;
    if distortion > 2.0 {
        return None;
    }

    let best_cos = a
        .center
        .abs_cos(&b.center, &c.center)
        .min(b.center.abs_cos(&a.center, &c.center))
        .min(c.center.abs_cos(&a.center, &b.center));
    if best_cos > 0.4 {
        return None;
    }

    // Isoceles right triangle: hypotenuse / leg = sqrt(2).
    let shape = (distortion - std::f32::consts::SQRT_2).abs();
    Some(size_ratio * 2.0 + shape + best_cos)
}

/// Pick the right-angle corner as top-left, then use the cross product to
/// tell top-right from bottom-left.
fn order_triple(a: &FinderPattern, b: &FinderPattern, c: &FinderPattern) -> Option<FinderTriple> {
    let patterns = [a, b, c];
    let corner = (0..3).min_by(|&i, &j| {
        let cos = |n: usize| {
            patterns[n]
                .center
                .abs_cos(&patterns[(n + 1) % 3].center, &patterns[(n + 2) % 3].center)
        };
        cos(i).partial_cmp(&cos(j)).unwrap_or(Ordering::Equal)
    })?;

    let tl = patterns[corner];
    let p1 = patterns[(corner + 1) % 3];
    let p2 = patterns[(corner + 2) % 3];
    let (tr, bl) = if tl.center.cross(&p1.center, &p2.center) > 0.0 {
        (p1, p2)
    } else {
        (p2, p1)
    };

    Some(FinderTriple {
        top_left: tl.center,
        top_right: tr.center,
        bottom_left: bl.center,
        module_size: (tl.module_size + tr.module_size + bl.module_size) / 3.0,
    })
}
