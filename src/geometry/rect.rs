/// Axis-aligned box in output pixel space. `right` and `bottom` are exclusive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl Rect {
    /// Returns `None` for inverted or non-finite boxes.
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Option<Self> {
        let finite = [left, top, right, bottom].iter().all(|v| v.is_finite());
        (finite && left <= right && top <= bottom).then_some(Rect {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Box covering pixel columns `x0..x1` and rows `y0..y1`.
    pub fn from_pixel_span(x0: u32, y0: u32, x1: u32, y1: u32) -> Option<Self> {
        Rect::from_ltrb(x0 as f32, y0 as f32, x1 as f32, y1 as f32)
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn right(&self) -> f32 {
        self.right
    }

    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn mid_point(&self) -> [f32; 2] {
        [
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        ]
    }
}
