//! Generation settings shared by every stage of the pipeline.

use crate::error::{ResourceLimit, Result, SigilError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default output texture width in pixels
pub const DEFAULT_OUTPUT_WIDTH: u32 = 256;

/// Default output texture height in pixels
pub const DEFAULT_OUTPUT_HEIGHT: u32 = 256;

/// Default virtual drawing space width
pub const DEFAULT_CANVAS_WIDTH: f32 = 100.0;

/// Default virtual drawing space height
pub const DEFAULT_CANVAS_HEIGHT: f32 = 100.0;

/// Default stroke width in output pixels
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;

/// Default artwork scale (1.0 = fill the output)
pub const DEFAULT_ARTWORK_SCALE: f32 = 1.0;

/// Default distance search radius in output pixels
pub const DEFAULT_SEARCH_RADIUS: u32 = 32;

pub const DEFAULT_MAX_INSTRUCTIONS: usize = 4096;
pub const DEFAULT_MAX_SUBPATHS: usize = 256;
pub const DEFAULT_MAX_SEGMENTS: usize = 8192;
pub const DEFAULT_MAX_OUTPUT_PIXELS: u64 = 4096 * 4096;
pub const DEFAULT_MAX_SEARCH_RADIUS: u32 = 256;
pub const DEFAULT_TIME_BUDGET_MS: u64 = 5_000;

/// Budgets enforced on each request, since instructions come from an untrusted generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceLimits {
    pub max_instructions: usize,
    pub max_subpaths: usize,
    pub max_segments: usize,
    pub max_output_pixels: u64,
    /// Largest accepted `searchRadius`; the bounded search costs `O(R²)` per pixel
    pub max_search_radius: u32,
    /// Wall-clock budget for the whole pipeline, in milliseconds
    pub time_budget_ms: u64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_instructions: DEFAULT_MAX_INSTRUCTIONS,
            max_subpaths: DEFAULT_MAX_SUBPATHS,
            max_segments: DEFAULT_MAX_SEGMENTS,
            max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
            max_search_radius: DEFAULT_MAX_SEARCH_RADIUS,
            time_budget_ms: DEFAULT_TIME_BUDGET_MS,
        }
    }
}

impl ResourceLimits {
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }
}

/// Which distance transform turns occupancy into the field. Both produce identical bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DistanceMethod {
    /// Windowed nearest-neighbour search, `O(w * h * R²)`
    #[default]
    BoundedSearch,
    /// Separable exact transform, `O(w * h)`
    Exact,
}

/// Output and drawing configuration for one sigil
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SigilConfig {
    /// Texture width in pixels
    pub output_width: u32,
    /// Texture height in pixels
    pub output_height: u32,
    /// Width of the virtual space instructions are authored in
    pub canvas_width: f32,
    /// Height of the virtual space instructions are authored in
    pub canvas_height: f32,
    /// Stroke width in output pixels, independent of `artwork_scale`
    pub stroke_width: f32,
    /// Extra scale applied on top of the fit-to-output scale
    pub artwork_scale: f32,
    /// Distance (in output pixels) at which the field saturates
    pub search_radius: u32,
    pub distance_method: DistanceMethod,
    pub limits: ResourceLimits,
}

impl Default for SigilConfig {
    fn default() -> Self {
        Self {
            output_width: DEFAULT_OUTPUT_WIDTH,
            output_height: DEFAULT_OUTPUT_HEIGHT,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            stroke_width: DEFAULT_STROKE_WIDTH,
            artwork_scale: DEFAULT_ARTWORK_SCALE,
            search_radius: DEFAULT_SEARCH_RADIUS,
            distance_method: DistanceMethod::default(),
            limits: ResourceLimits::default(),
        }
    }
}

impl SigilConfig {
    /// Create a config with the given output size and defaults elsewhere
    pub fn with_output_size(width: u32, height: u32) -> Self {
        Self {
            output_width: width,
            output_height: height,
            ..Self::default()
        }
    }

    pub fn output_pixels(&self) -> u64 {
        self.output_width as u64 * self.output_height as u64
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_width == 0 || self.output_height == 0 {
            return Err(SigilError::InvalidConfig(format!(
                "output size must be non-zero, got {}x{}",
                self.output_width, self.output_height
            )));
        }
        if !(self.canvas_width.is_finite() && self.canvas_width > 0.0)
            || !(self.canvas_height.is_finite() && self.canvas_height > 0.0)
        {
            return Err(SigilError::InvalidConfig(format!(
                "canvas size must be positive, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(SigilError::InvalidConfig(format!(
                "stroke width must be positive, got {}",
                self.stroke_width
            )));
        }
        if !(self.artwork_scale.is_finite() && self.artwork_scale > 0.0) {
            return Err(SigilError::InvalidConfig(format!(
                "artwork scale must be positive, got {}",
                self.artwork_scale
            )));
        }
        if self.search_radius == 0 {
            return Err(SigilError::InvalidConfig(
                "search radius must be at least 1".to_string(),
            ));
        }

        if self.search_radius > self.limits.max_search_radius {
            return Err(SigilError::ResourceLimitExceeded(
                ResourceLimit::SearchRadius {
                    radius: self.search_radius,
                    max: self.limits.max_search_radius,
                },
            ));
        }

        let pixels = self.output_pixels();
        if pixels > self.limits.max_output_pixels {
            return Err(SigilError::ResourceLimitExceeded(
                ResourceLimit::OutputPixels {
                    count: pixels,
                    max: self.limits.max_output_pixels,
                },
            ));
        }
        Ok(())
    }
}
