//! CPU rasterization of a [`Path`] into an [`OccupancyGrid`].
//!
//! Subpaths are built as `tiny_skia_path` paths, moved into output space, stroked
//! there (so line width is in output pixels) and filled with a supersampled
//! nonzero-winding scanline pass. The resulting coverage mask is thresholded at
//! its midpoint.

use crate::deadline::Deadline;
use crate::edge::ScanEdge;
use crate::error::Result;
use crate::geometry::transform::SigilTransform;
use crate::grid::OccupancyGrid;
use crate::path::{Path, Segment};
use tracing::{debug, trace};
use usvg::tiny_skia_path::{
    self, LineCap, LineJoin, PathBuilder, PathSegment, Point, Stroke,
};

/// Samples per pixel along each axis.
const SUBSAMPLES: u32 = 4;
/// Maximum distance in pixels between a curve and its flattened polyline.
const FLATTEN_TOLERANCE: f32 = 0.1;
const MAX_FLATTEN_STEPS: usize = 128;

/// A drawing surface that turns paths into occupancy.
///
/// Passed explicitly to the pipeline so alternate rasterizers can be substituted.
pub trait Rasterizer {
    fn rasterize(
        &self,
        path: &Path,
        transform: &SigilTransform,
        stroke_width: f32,
        width: u32,
        height: u32,
        deadline: &Deadline,
    ) -> Result<OccupancyGrid>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CpuRasterizer;

impl Rasterizer for CpuRasterizer {
    fn rasterize(
        &self,
        path: &Path,
        transform: &SigilTransform,
        stroke_width: f32,
        width: u32,
        height: u32,
        deadline: &Deadline,
    ) -> Result<OccupancyGrid> {
        let mask = render_coverage_mask(path, transform, stroke_width, width, height, deadline)?;
        let grid = OccupancyGrid::from_mask(width, height, &mask);
        debug!(
            width,
            height,
            occupied = grid.occupied_count(),
            "Rasterized sigil path"
        );
        Ok(grid)
    }
}

/// Render every painted subpath into an 8-bit coverage mask, max-composited.
pub fn render_coverage_mask(
    path: &Path,
    transform: &SigilTransform,
    stroke_width: f32,
    width: u32,
    height: u32,
    deadline: &Deadline,
) -> Result<Vec<u8>> {
    let mut mask = vec![0u8; width as usize * height as usize];
    let stroke = Stroke {
        width: stroke_width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    for (i, subpath) in path.subpaths.iter().enumerate() {
        if !subpath.paint.is_painted() {
            continue;
        }
        let Some(skia_path) = build_skia_path(&subpath.segments)
            .and_then(|p| p.transform(transform.to_skia()))
        else {
            trace!(subpath = i, "Subpath has no drawable geometry");
            continue;
        };

        // Fill and stroke outline are separate layers; merging their edges would
        // let opposite windings cancel.
        if subpath.paint.fill {
            let mut edges = Vec::new();
            push_path_edges(&skia_path, &mut edges);
            fill_edges(&edges, width, height, &mut mask, deadline)?;
        }
        if subpath.paint.stroke {
            match skia_path.stroke(&stroke, 1.0) {
                Some(outline) => {
                    let mut edges = Vec::new();
                    push_path_edges(&outline, &mut edges);
                    fill_edges(&edges, width, height, &mut mask, deadline)?;
                }
                None => trace!(subpath = i, "Stroke produced no outline"),
            }
        }
    }
    Ok(mask)
}

/// Build a path in virtual space, following canvas drawing rules: an arc connects
/// to the current point with a line, and drawing without a current point starts one.
pub fn build_skia_path(segments: &[Segment]) -> Option<tiny_skia_path::Path> {
    let mut pb = PathBuilder::new();
    let mut has_point = false;

    for segment in segments {
        match segment {
            Segment::MoveTo(p) => {
                pb.move_to(p.x, p.y);
                has_point = true;
            }
            Segment::LineTo(p) => {
                if has_point {
                    pb.line_to(p.x, p.y);
                } else {
                    pb.move_to(p.x, p.y);
                    has_point = true;
                }
            }
            Segment::QuadTo { ctrl, to } => {
                if !has_point {
                    pb.move_to(ctrl.x, ctrl.y);
                    has_point = true;
                }
                pb.quad_to(ctrl.x, ctrl.y, to.x, to.y);
            }
            Segment::CubicTo { ctrl1, ctrl2, to } => {
                if !has_point {
                    pb.move_to(ctrl1.x, ctrl1.y);
                    has_point = true;
                }
                pb.cubic_to(ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y);
            }
            Segment::Arc(arc) => {
                let start = arc.start_point();
                if has_point {
                    pb.line_to(start.x, start.y);
                } else {
                    pb.move_to(start.x, start.y);
                    has_point = true;
                }
                for [ctrl1, ctrl2, to] in arc.to_cubics() {
                    pb.cubic_to(ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y);
                }
            }
            Segment::Close => pb.close(),
        }
    }
    pb.finish()
}

fn push_line(edges: &mut Vec<ScanEdge>, from: Point, to: Point) {
    edges.extend(ScanEdge::new(from, to));
}

fn lerp(a: Point, b: Point, t: f32) -> Point {
    Point::from_xy(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

fn flatten_steps(deviation: f32) -> usize {
    let steps = (deviation / FLATTEN_TOLERANCE).sqrt().ceil();
    (steps as usize).clamp(1, MAX_FLATTEN_STEPS)
}

fn flatten_quad(edges: &mut Vec<ScanEdge>, p0: Point, p1: Point, p2: Point) {
    let dx = p0.x - 2.0 * p1.x + p2.x;
    let dy = p0.y - 2.0 * p1.y + p2.y;
    let steps = flatten_steps(dx.hypot(dy) / 4.0);

    let mut prev = p0;
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let next = if i == steps {
            p2
        } else {
            lerp(lerp(p0, p1, t), lerp(p1, p2, t), t)
        };
        push_line(edges, prev, next);
        prev = next;
    }
}

fn flatten_cubic(edges: &mut Vec<ScanEdge>, p0: Point, p1: Point, p2: Point, p3: Point) {
    let d1 = (p0.x - 2.0 * p1.x + p2.x).hypot(p0.y - 2.0 * p1.y + p2.y);
    let d2 = (p1.x - 2.0 * p2.x + p3.x).hypot(p1.y - 2.0 * p2.y + p3.y);
    let steps = flatten_steps(0.75 * d1.max(d2));

    let mut prev = p0;
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let next = if i == steps {
            p3
        } else {
            let a = lerp(p0, p1, t);
            let b = lerp(p1, p2, t);
            let c = lerp(p2, p3, t);
            lerp(lerp(a, b, t), lerp(b, c, t), t)
        };
        push_line(edges, prev, next);
        prev = next;
    }
}

/// Flatten `path` into edges. Every contour is closed for filling.
fn push_path_edges(path: &tiny_skia_path::Path, edges: &mut Vec<ScanEdge>) {
    let mut start: Option<Point> = None;
    let mut last: Option<Point> = None;

    for segment in path.segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                if let (Some(l), Some(s)) = (last, start) {
                    push_line(edges, l, s);
                }
                start = Some(p);
                last = Some(p);
            }
            PathSegment::LineTo(p) => {
                if let Some(l) = last {
                    push_line(edges, l, p);
                }
                last = Some(p);
            }
            PathSegment::QuadTo(c, p) => {
                if let Some(l) = last {
                    flatten_quad(edges, l, c, p);
                }
                last = Some(p);
            }
            PathSegment::CubicTo(c1, c2, p) => {
                if let Some(l) = last {
                    flatten_cubic(edges, l, c1, c2, p);
                }
                last = Some(p);
            }
            PathSegment::Close => {
                if let (Some(l), Some(s)) = (last, start) {
                    push_line(edges, l, s);
                }
                last = start;
            }
        }
    }
    if let (Some(l), Some(s)) = (last, start) {
        push_line(edges, l, s);
    }
}

/// Nonzero-winding supersampled fill of `edges`, max-composited into `mask`.
fn fill_edges(
    edges: &[ScanEdge],
    width: u32,
    height: u32,
    mask: &mut [u8],
    deadline: &Deadline,
) -> Result<()> {
    if edges.is_empty() {
        return Ok(());
    }
    let samples_per_pixel = SUBSAMPLES * SUBSAMPLES;
    let sample_cols = (width * SUBSAMPLES) as i64;
    let mut counts = vec![0u32; width as usize];
    let mut crossings: Vec<(f32, i32)> = Vec::new();
    let mut row_edges: Vec<&ScanEdge> = Vec::new();

    for y in 0..height {
        deadline.check()?;
        let (row_top, row_bottom) = (y as f32, (y + 1) as f32);
        row_edges.clear();
        row_edges.extend(
            edges
                .iter()
                .filter(|e| e.top() < row_bottom && e.bottom() > row_top),
        );
        if row_edges.is_empty() {
            continue;
        }
        counts.iter_mut().for_each(|c| *c = 0);

        for j in 0..SUBSAMPLES {
            let sample_y = row_top + (j as f32 + 0.5) / SUBSAMPLES as f32;
            crossings.clear();
            for edge in &row_edges {
                if let Some(x) = edge.crossing(sample_y) {
                    crossings.push((x, edge.winding));
                }
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 {
                    continue;
                }
                // Samples sit at (k + 0.5) / SUBSAMPLES; cover those within [x0, x1).
                let first = ((pair[0].0 * SUBSAMPLES as f32) - 0.5).ceil() as i64;
                let end = ((pair[1].0 * SUBSAMPLES as f32) - 0.5).ceil() as i64;
                for k in first.max(0)..end.min(sample_cols) {
                    counts[(k / SUBSAMPLES as i64) as usize] += 1;
                }
            }
        }

        let row = &mut mask[(y * width) as usize..((y + 1) * width) as usize];
        for (value, &count) in row.iter_mut().zip(&counts) {
            let coverage = ((count * 255 + samples_per_pixel / 2) / samples_per_pixel) as u8;
            *value = (*value).max(coverage);
        }
    }
    Ok(())
}
