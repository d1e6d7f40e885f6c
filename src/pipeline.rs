//! End-to-end generation: instructions → path → occupancy → distance field → PNG.

use crate::config::{DistanceMethod, SigilConfig};
use crate::cpu_renderer::{CpuRasterizer, Rasterizer};
use crate::deadline::Deadline;
use crate::distance_field::{BoundedSearch, DistanceField, DistanceFieldBuilder, ExactTransform};
use crate::error::{Result, SigilError};
use crate::geometry::transform::SigilTransform;
use crate::instruction::{Instruction, decode_instructions};
use crate::interpreter::interpret;
use crate::path::Path;
use crate::png_writer::{SigilTexture, encode_png};
use tracing::debug;

/// Generates sigil textures with a fixed configuration and rasterizer.
///
/// Holds no per-request state, so one generator can serve many threads.
#[derive(Debug, Clone)]
pub struct SigilGenerator<R = CpuRasterizer> {
    config: SigilConfig,
    rasterizer: R,
}

impl SigilGenerator<CpuRasterizer> {
    pub fn new(config: SigilConfig) -> Result<Self> {
        Self::with_rasterizer(config, CpuRasterizer)
    }
}

impl<R: Rasterizer> SigilGenerator<R> {
    pub fn with_rasterizer(config: SigilConfig, rasterizer: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rasterizer })
    }

    pub fn config(&self) -> &SigilConfig {
        &self.config
    }

    pub fn transform(&self) -> SigilTransform {
        SigilTransform::from_config(&self.config)
    }

    pub fn generate(&self, instructions: &[Instruction]) -> Result<SigilTexture> {
        let deadline = Deadline::start(self.config.limits.time_budget());
        let path = interpret(instructions, &self.config.limits)?;
        self.generate_path(&path, &deadline)
    }

    /// Decode a JSON instruction list and generate from it.
    pub fn generate_json(&self, json: &str) -> Result<SigilTexture> {
        let deadline = Deadline::start(self.config.limits.time_budget());
        let instructions = decode_instructions(json, &self.config.limits)?;
        let path = interpret(&instructions, &self.config.limits)?;
        self.generate_path(&path, &deadline)
    }

    pub fn generate_path(&self, path: &Path, deadline: &Deadline) -> Result<SigilTexture> {
        let field = self.render_field(path, deadline)?;
        let texture = encode_png(&field)?;
        debug!(
            width = texture.width,
            height = texture.height,
            bytes = texture.data.len(),
            elapsed_ms = deadline.elapsed().as_millis() as u64,
            "Generated sigil texture"
        );
        Ok(texture)
    }

    pub fn render_field(&self, path: &Path, deadline: &Deadline) -> Result<DistanceField> {
        let config = &self.config;
        let grid = self.rasterizer.rasterize(
            path,
            &self.transform(),
            config.stroke_width,
            config.output_width,
            config.output_height,
            deadline,
        )?;
        let expected = (config.output_width, config.output_height);
        let actual = (grid.width(), grid.height());
        let cells = grid.cells().len();
        if actual != expected || cells != expected.0 as usize * expected.1 as usize {
            return Err(SigilError::RasterSize {
                expected,
                actual,
                cells,
            });
        }
        match config.distance_method {
            DistanceMethod::BoundedSearch => {
                BoundedSearch::new(config.search_radius).build(&grid, deadline)
            }
            DistanceMethod::Exact => ExactTransform::new(config.search_radius).build(&grid, deadline),
        }
    }
}

impl<R: Rasterizer + Sync> SigilGenerator<R> {
    /// Generate independent requests on `workers` threads. Results keep request order.
    pub fn generate_batch(
        &self,
        requests: &[Vec<Instruction>],
        workers: usize,
    ) -> Vec<Result<SigilTexture>> {
        let workers = workers.clamp(1, requests.len().max(1));
        let (job_tx, job_rx) = flume::unbounded::<(usize, &[Instruction])>();
        let (result_tx, result_rx) = flume::unbounded();

        for (i, request) in requests.iter().enumerate() {
            let _ = job_tx.send((i, request.as_slice()));
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for (i, instructions) in job_rx.iter() {
                        let _ = result_tx.send((i, self.generate(instructions)));
                    }
                });
            }
        });
        drop(result_tx);

        let mut results: Vec<Option<Result<SigilTexture>>> =
            (0..requests.len()).map(|_| None).collect();
        for (i, result) in result_rx.drain() {
            results[i] = Some(result);
        }
        results.into_iter().flatten().collect()
    }
}

/// Generate one sigil with a fresh CPU generator.
pub fn generate_sigil(instructions: &[Instruction], config: &SigilConfig) -> Result<SigilTexture> {
    SigilGenerator::new(config.clone())?.generate(instructions)
}
