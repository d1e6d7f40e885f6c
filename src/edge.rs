use usvg::tiny_skia_path::Point;

/// A flattened, non-horizontal edge in output pixel space, oriented top to bottom.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScanEdge {
    top: f32,
    bottom: f32,
    /// x at `top`
    x_top: f32,
    /// dx per unit of y
    inv_slope: f32,
    /// +1 for edges drawn upward, -1 for downward
    pub winding: i32,
}

impl ScanEdge {
    /// Returns `None` for horizontal edges, which never cross a scanline.
    pub fn new(from: Point, to: Point) -> Option<Self> {
        if from.y == to.y {
            return None;
        }
        let (upper, lower, winding) = if from.y < to.y {
            (from, to, -1)
        } else {
            (to, from, 1)
        };
        Some(Self {
            top: upper.y,
            bottom: lower.y,
            x_top: upper.x,
            inv_slope: (lower.x - upper.x) / (lower.y - upper.y),
            winding,
        })
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    /// x where a scanline at `y` crosses this edge, if it does.
    ///
    /// The range is half-open so a vertex shared by two edges is counted once.
    #[inline(always)]
    pub fn crossing(&self, y: f32) -> Option<f32> {
        (self.top <= y && y < self.bottom).then(|| self.x_top + (y - self.top) * self.inv_slope)
    }
}
