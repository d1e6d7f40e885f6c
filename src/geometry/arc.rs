use std::f32::consts::{FRAC_PI_2, PI, TAU};
use usvg::tiny_skia_path::Point;

/// Sweeps within this distance of a full turn are treated as full circles.
pub const FULL_CIRCLE_EPS: f32 = 1e-3;

/// A circular arc in canvas form: center, radius and start/end angles.
///
/// Angles are in radians with the y axis pointing down, so increasing angles run
/// clockwise on screen.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcSpec {
    pub center: Point,
    pub radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub counter_clockwise: bool,
}

impl ArcSpec {
    pub fn point_at(&self, angle: f32) -> Point {
        Point::from_xy(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    pub fn start_point(&self) -> Point {
        self.point_at(self.start_angle)
    }

    pub fn end_point(&self) -> Point {
        self.point_at(self.start_angle + self.signed_sweep())
    }

    /// Angle swept in the arc's own direction, in `[0, 2π)`.
    ///
    /// A difference of a full turn or more stays at exactly `2π`, so a complete
    /// circle is never normalized down to an empty arc.
    pub fn sweep_angle(&self) -> f32 {
        let raw = if self.counter_clockwise {
            self.start_angle - self.end_angle
        } else {
            self.end_angle - self.start_angle
        };
        if raw >= TAU {
            return TAU;
        }
        raw.rem_euclid(TAU)
    }

    fn signed_sweep(&self) -> f32 {
        if self.counter_clockwise {
            -self.sweep_angle()
        } else {
            self.sweep_angle()
        }
    }

    pub fn is_full_circle(&self) -> bool {
        (self.sweep_angle() - TAU).abs() < FULL_CIRCLE_EPS
    }

    pub fn is_large_arc(&self) -> bool {
        self.sweep_angle() > PI
    }

    /// Split the arc into cubic Béziers of at most a quarter turn each.
    ///
    /// Each entry is `[ctrl1, ctrl2, to]`; the first piece starts at [`Self::start_point`].
    pub fn to_cubics(&self) -> Vec<[Point; 3]> {
        let sweep = self.signed_sweep();
        if self.radius <= 0.0 || sweep == 0.0 {
            return Vec::new();
        }

        // Slack keeps an exact quarter multiple from rounding up to an extra piece.
        let pieces = (sweep.abs() / FRAC_PI_2 - 1e-4).ceil().max(1.0) as usize;
        let step = sweep / pieces as f32;
        let k = 4.0 / 3.0 * (step / 4.0).tan() * self.radius;

        let mut cubics = Vec::with_capacity(pieces);
        for i in 0..pieces {
            let a0 = self.start_angle + step * i as f32;
            let a1 = a0 + step;
            let p0 = self.point_at(a0);
            let p1 = self.point_at(a1);
            let ctrl1 = Point::from_xy(p0.x - k * a0.sin(), p0.y + k * a0.cos());
            let ctrl2 = Point::from_xy(p1.x + k * a1.sin(), p1.y - k * a1.cos());
            cubics.push([ctrl1, ctrl2, p1]);
        }
        cubics
    }

    /// Reconstruct a circular arc from SVG endpoint parameters.
    ///
    /// `radius` is raised to half the chord when it is too small to span it. Returns
    /// `None` when the endpoints coincide or the radius is zero.
    pub fn from_endpoints(
        from: Point,
        to: Point,
        radius: f32,
        large_arc: bool,
        sweep: bool,
    ) -> Option<Self> {
        let (x0, y0) = (from.x as f64, from.y as f64);
        let (x1, y1) = (to.x as f64, to.y as f64);
        let dx = x1 - x0;
        let dy = y1 - y0;
        let chord = dx.hypot(dy);
        if chord == 0.0 || radius == 0.0 {
            return None;
        }

        let half_chord = chord / 2.0;
        let r = (radius.abs() as f64).max(half_chord);
        let h = (r * r - half_chord * half_chord).max(0.0).sqrt();
        let sign = if sweep == large_arc { -1.0 } else { 1.0 };
        let cx = (x0 + x1) / 2.0 + sign * h * (-dy / chord);
        let cy = (y0 + y1) / 2.0 + sign * h * (dx / chord);

        Some(ArcSpec {
            center: Point::from_xy(cx as f32, cy as f32),
            radius: r as f32,
            start_angle: (y0 - cy).atan2(x0 - cx) as f32,
            end_angle: (y1 - cy).atan2(x1 - cx) as f32,
            counter_clockwise: !sweep,
        })
    }
}
