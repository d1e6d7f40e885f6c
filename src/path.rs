use crate::geometry::arc::ArcSpec;
use usvg::tiny_skia_path::Point;

/// One geometric drawing step inside a [`Subpath`].
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    Arc(ArcSpec),
    QuadTo { ctrl: Point, to: Point },
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
    Close,
}

/// How a subpath was painted. Both flags may be set.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PaintFlags {
    pub stroke: bool,
    pub fill: bool,
}

impl PaintFlags {
    pub fn is_painted(&self) -> bool {
        self.stroke || self.fill
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Subpath {
    pub segments: Vec<Segment>,
    pub paint: PaintFlags,
}

impl Subpath {
    pub fn new(segments: Vec<Segment>, paint: PaintFlags) -> Self {
        Self { segments, paint }
    }

    /// True if any segment draws something under canvas rules.
    ///
    /// `moveTo` and `closePath` alone draw nothing, and neither does a `lineTo` with no
    /// current point, since it only starts one.
    pub fn has_geometry(&self) -> bool {
        let mut has_point = false;
        for segment in &self.segments {
            match segment {
                Segment::MoveTo(_) => has_point = true,
                Segment::LineTo(_) if !has_point => has_point = true,
                Segment::LineTo(_) | Segment::QuadTo { .. } | Segment::CubicTo { .. } => {
                    return true;
                }
                Segment::Arc(arc) => {
                    if has_point || (arc.radius > 0.0 && arc.sweep_angle() > 0.0) {
                        return true;
                    }
                    has_point = true;
                }
                Segment::Close => {}
            }
        }
        false
    }

    /// Painted and carrying geometry, so it can mark pixels.
    pub fn is_drawable(&self) -> bool {
        self.paint.is_painted() && self.has_geometry()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Path {
    pub subpaths: Vec<Subpath>,
}

impl Path {
    pub fn segment_count(&self) -> usize {
        self.subpaths.iter().map(|s| s.segments.len()).sum()
    }

    /// True if at least one subpath is stroked or filled and has geometry.
    pub fn is_painted(&self) -> bool {
        self.subpaths.iter().any(Subpath::is_drawable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn pt(x: f32, y: f32) -> Point {
        Point::from_xy(x, y)
    }

    fn stroked(segments: Vec<Segment>) -> Subpath {
        Subpath::new(
            segments,
            PaintFlags {
                stroke: true,
                fill: false,
            },
        )
    }

    #[test]
    fn move_and_close_draw_nothing() {
        assert!(!stroked(vec![]).has_geometry());
        assert!(!stroked(vec![Segment::MoveTo(pt(1.0, 1.0)), Segment::Close]).has_geometry());
        assert!(!stroked(vec![Segment::LineTo(pt(1.0, 1.0))]).has_geometry());
    }

    #[test]
    fn drawing_segments_count() {
        assert!(
            stroked(vec![Segment::LineTo(pt(1.0, 1.0)), Segment::LineTo(pt(2.0, 1.0))])
                .has_geometry()
        );
        assert!(
            stroked(vec![Segment::QuadTo {
                ctrl: pt(1.0, 0.0),
                to: pt(2.0, 2.0)
            }])
            .has_geometry()
        );
        let circle = ArcSpec {
            center: pt(5.0, 5.0),
            radius: 2.0,
            start_angle: 0.0,
            end_angle: TAU,
            counter_clockwise: false,
        };
        assert!(stroked(vec![Segment::Arc(circle)]).has_geometry());
        let dot = ArcSpec {
            radius: 0.0,
            ..circle
        };
        assert!(!stroked(vec![Segment::Arc(dot)]).has_geometry());
    }

    #[test]
    fn unpainted_geometry_is_not_drawable() {
        let subpath = Subpath::new(
            vec![Segment::MoveTo(pt(0.0, 0.0)), Segment::LineTo(pt(1.0, 1.0))],
            PaintFlags::default(),
        );
        assert!(subpath.has_geometry());
        assert!(!subpath.is_drawable());
    }
}
