//! Bounded distance fields over an [`OccupancyGrid`].
//!
//! Every builder keeps the same output contract: one byte per pixel, 128 on the
//! boundary, `128 + 127 * min(d / R, 1)` inside and `128 - 127 * min(d / R, 1)`
//! outside, where `d` is the distance to the nearest pixel of the opposite state.

use crate::deadline::Deadline;
use crate::error::Result;
use crate::grid::OccupancyGrid;
use tracing::debug;

pub const BOUNDARY_VALUE: u8 = 128;
const HALF_RANGE: f32 = 127.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    width: u32,
    height: u32,
    values: Vec<u8>,
}

impl DistanceField {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.values[(y * self.width + x) as usize]
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }
}

/// Map a distance to its field byte.
pub fn encode_distance(distance: f32, radius: u32, inside: bool) -> u8 {
    let normalized = (distance / radius as f32).min(1.0) * HALF_RANGE;
    let value = if inside {
        BOUNDARY_VALUE as f32 + normalized
    } else {
        BOUNDARY_VALUE as f32 - normalized
    };
    value.round().clamp(0.0, 255.0) as u8
}

/// Turns occupancy into a distance field. Implementations are interchangeable.
pub trait DistanceFieldBuilder {
    fn build(&self, grid: &OccupancyGrid, deadline: &Deadline) -> Result<DistanceField>;
}

/// Scans a `(2R + 1)²` window around every pixel. Cost is `O(width * height * R²)`.
#[derive(Debug, Clone, Copy)]
pub struct BoundedSearch {
    pub radius: u32,
}

impl BoundedSearch {
    pub fn new(radius: u32) -> Self {
        Self { radius }
    }

    fn nearest_opposite_sq(&self, grid: &OccupancyGrid, x: u32, y: u32) -> Option<u32> {
        let inside = grid.get(x, y);
        let r = self.radius as i64;
        let (w, h) = (grid.width() as i64, grid.height() as i64);
        let (x, y) = (x as i64, y as i64);
        let mut best: Option<u32> = None;

        for ny in (y - r).max(0)..=(y + r).min(h - 1) {
            let dy = ny - y;
            for nx in (x - r).max(0)..=(x + r).min(w - 1) {
                if grid.get(nx as u32, ny as u32) == inside {
                    continue;
                }
                let dx = nx - x;
                let d_sq = (dx * dx + dy * dy) as u32;
                if best.is_none_or(|b| d_sq < b) {
                    best = Some(d_sq);
                }
            }
        }
        best
    }
}

impl Default for BoundedSearch {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SEARCH_RADIUS)
    }
}

impl DistanceFieldBuilder for BoundedSearch {
    fn build(&self, grid: &OccupancyGrid, deadline: &Deadline) -> Result<DistanceField> {
        let (width, height) = (grid.width(), grid.height());
        let mut values = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                // A single pixel scans up to (2R + 1)² cells, so poll per pixel.
                deadline.check()?;
                let distance = match self.nearest_opposite_sq(grid, x, y) {
                    Some(d_sq) => (d_sq as f32).sqrt(),
                    None => self.radius as f32,
                };
                values.push(encode_distance(distance, self.radius, grid.get(x, y)));
            }
        }
        debug!(width, height, radius = self.radius, "Built bounded distance field");
        Ok(DistanceField {
            width,
            height,
            values,
        })
    }
}

/// Exact Euclidean transform (Felzenszwalb & Huttenlocher), clipped to the radius.
///
/// Runs in `O(width * height)` and yields the same bytes as [`BoundedSearch`]:
/// anything farther than `R` saturates either way.
#[derive(Debug, Clone, Copy)]
pub struct ExactTransform {
    pub radius: u32,
}

const FAR: f64 = 1e20;

impl ExactTransform {
    pub fn new(radius: u32) -> Self {
        Self { radius }
    }
}

/// 1D squared distance transform of `f` into `d` via the lower envelope of parabolas.
fn transform_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let mut k = 0;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;
    let intersect = |q: usize, p: usize| {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };
    for q in 1..n {
        let mut s = intersect(q, v[k]);
        // z[0] is -inf, so this stops at k == 0.
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }
    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        let qf = q as f64;
        while z[k + 1] < qf {
            k += 1;
        }
        let p = v[k];
        let dp = qf - p as f64;
        *out = dp * dp + f[p];
    }
}

/// Squared distance from every pixel to the nearest pixel where `is_feature` holds.
fn squared_distances(
    grid: &OccupancyGrid,
    is_feature: impl Fn(bool) -> bool,
    deadline: &Deadline,
) -> Result<Vec<f64>> {
    let (w, h) = (grid.width() as usize, grid.height() as usize);
    let mut dist: Vec<f64> = grid
        .cells()
        .iter()
        .map(|&c| if is_feature(c) { 0.0 } else { FAR })
        .collect();

    let n = w.max(h);
    let mut f = vec![0.0; n];
    let mut d = vec![0.0; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0; n + 1];

    for x in 0..w {
        deadline.check()?;
        for y in 0..h {
            f[y] = dist[y * w + x];
        }
        transform_1d(&f[..h], &mut d[..h], &mut v, &mut z);
        for y in 0..h {
            dist[y * w + x] = d[y];
        }
    }
    for y in 0..h {
        deadline.check()?;
        let row = &mut dist[y * w..(y + 1) * w];
        f[..w].copy_from_slice(row);
        transform_1d(&f[..w], &mut d[..w], &mut v, &mut z);
        row.copy_from_slice(&d[..w]);
    }
    deadline.check()?;
    Ok(dist)
}

impl DistanceFieldBuilder for ExactTransform {
    fn build(&self, grid: &OccupancyGrid, deadline: &Deadline) -> Result<DistanceField> {
        let to_outside = squared_distances(grid, |inside| !inside, deadline)?;
        let to_inside = squared_distances(grid, |inside| inside, deadline)?;
        let radius_sq = self.radius as f64 * self.radius as f64;

        let values = grid
            .cells()
            .iter()
            .enumerate()
            .map(|(i, &inside)| {
                let d_sq = if inside { to_outside[i] } else { to_inside[i] };
                // Squared distances are exact integers here, so the sqrt matches
                // the bounded search bit for bit.
                let distance = if d_sq > radius_sq {
                    self.radius as f32
                } else {
                    (d_sq as u32 as f32).sqrt()
                };
                encode_distance(distance, self.radius, inside)
            })
            .collect();

        debug!(
            width = grid.width(),
            height = grid.height(),
            radius = self.radius,
            "Built exact distance field"
        );
        Ok(DistanceField {
            width: grid.width(),
            height: grid.height(),
            values,
        })
    }
}
