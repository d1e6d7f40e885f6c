use crate::geometry::rect::Rect;

/// Row-major inside/outside flags at output resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    /// Threshold an 8-bit coverage mask: a pixel is inside when its value exceeds 127.
    ///
    /// The mask is taken as is; the pipeline rejects grids whose cell count does not
    /// match `width * height`.
    pub fn from_mask(width: u32, height: u32, mask: &[u8]) -> Self {
        Self {
            width,
            height,
            cells: mask.iter().map(|&v| v > 127).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline(always)]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.cells[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, inside: bool) {
        self.cells[(y * self.width + x) as usize] = inside;
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Smallest box containing every occupied pixel, or `None` for an empty grid.
    pub fn occupied_bounds(&self) -> Option<Rect> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut any = false;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    any = true;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }
        if !any {
            return None;
        }
        Rect::from_pixel_span(min_x, min_y, max_x + 1, max_y + 1)
    }
}
