/// Sub-pixel image position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// z component of (b - self) × (c - self); positive when c lies clockwise
    /// of b in image coordinates (y down)
    pub fn cross(&self, b: &Point, c: &Point) -> f32 {
        (b.x - self.x) * (c.y - self.y) - (b.y - self.y) * (c.x - self.x)
    }

    /// |cos| of the angle at `self` between the rays to `b` and `c`
    pub fn abs_cos(&self, b: &Point, c: &Point) -> f32 {
        let (v1x, v1y) = (b.x - self.x, b.y - self.y);
        let (v2x, v2y) = (c.x - self.x, c.y - self.y);
        let denom = (v1x * v1x + v1y * v1y).sqrt() * (v2x * v2x + v2y * v2y).sqrt();
        if denom == 0.0 {
            return 1.0;
        }
        ((v1x * v2x + v1y * v2y) / denom).abs()
    }
}
