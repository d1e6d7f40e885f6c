use crate::config::SigilConfig;
use usvg::tiny_skia_path::{Point, Transform};

/// Maps the virtual drawing space onto the output grid.
///
/// The canvas is scaled uniformly to fit the output, multiplied by the artwork
/// scale, and the scaled canvas box is centered.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SigilTransform {
    pub scale: f32,
    pub tx: f32,
    pub ty: f32,
}

impl SigilTransform {
    pub fn new(
        canvas_width: f32,
        canvas_height: f32,
        output_width: u32,
        output_height: u32,
        artwork_scale: f32,
    ) -> Self {
        let (out_w, out_h) = (output_width as f32, output_height as f32);
        let base_scale = (out_w / canvas_width).min(out_h / canvas_height);
        let scale = base_scale * artwork_scale;
        Self {
            scale,
            tx: (out_w - canvas_width * scale) / 2.0,
            ty: (out_h - canvas_height * scale) / 2.0,
        }
    }

    pub fn from_config(config: &SigilConfig) -> Self {
        Self::new(
            config.canvas_width,
            config.canvas_height,
            config.output_width,
            config.output_height,
            config.artwork_scale,
        )
    }

    pub fn map_point(&self, p: Point) -> Point {
        Point::from_xy(p.x * self.scale + self.tx, p.y * self.scale + self.ty)
    }

    pub fn to_skia(&self) -> Transform {
        Transform::from_row(self.scale, 0.0, 0.0, self.scale, self.tx, self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_canvas_fills_output() {
        let ts = SigilTransform::new(100.0, 100.0, 256, 256, 1.0);
        assert!((ts.scale - 2.56).abs() < 1e-6);
        assert!(ts.tx.abs() < 1e-4);
        let center = ts.map_point(Point::from_xy(50.0, 50.0));
        assert!((center.x - 128.0).abs() < 1e-3 && (center.y - 128.0).abs() < 1e-3);
    }

    #[test]
    fn half_scale_stays_centered() {
        let ts = SigilTransform::new(100.0, 100.0, 200, 200, 0.5);
        assert_eq!(ts.scale, 1.0);
        assert_eq!(ts.tx, 50.0);
        assert_eq!(ts.ty, 50.0);
        assert_eq!(ts.map_point(Point::from_xy(50.0, 50.0)), Point::from_xy(100.0, 100.0));
    }

    #[test]
    fn letterboxed_output() {
        let ts = SigilTransform::new(100.0, 100.0, 300, 100, 1.0);
        assert_eq!(ts.scale, 1.0);
        assert_eq!(ts.tx, 100.0);
        assert_eq!(ts.ty, 0.0);
    }
}
