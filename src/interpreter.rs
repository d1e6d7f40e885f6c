//! Builds a [`Path`] from a decoded instruction list.

use crate::config::ResourceLimits;
use crate::error::{ResourceLimit, Result, SigilError};
use crate::instruction::Instruction;
use crate::path::{PaintFlags, Path, Segment, Subpath};
use tracing::{debug, warn};

struct PathRecorder<'a> {
    limits: &'a ResourceLimits,
    subpaths: Vec<Subpath>,
    current: Subpath,
    segment_count: usize,
}

impl<'a> PathRecorder<'a> {
    fn new(limits: &'a ResourceLimits) -> Self {
        Self {
            limits,
            subpaths: Vec::new(),
            current: Subpath::default(),
            segment_count: 0,
        }
    }

    fn push_segment(&mut self, segment: Segment) -> Result<()> {
        self.segment_count += 1;
        if self.segment_count > self.limits.max_segments {
            return Err(SigilError::ResourceLimitExceeded(ResourceLimit::Segments {
                count: self.segment_count,
                max: self.limits.max_segments,
            }));
        }
        self.current.segments.push(segment);
        Ok(())
    }

    /// Keep the current subpath if it was painted and draws something, then start an
    /// empty one.
    fn begin_path(&mut self, index: usize) -> Result<()> {
        let previous = std::mem::take(&mut self.current);
        if previous.is_drawable() {
            self.subpaths.push(previous);
            if self.subpaths.len() > self.limits.max_subpaths {
                return Err(SigilError::ResourceLimitExceeded(ResourceLimit::Subpaths {
                    count: self.subpaths.len(),
                    max: self.limits.max_subpaths,
                }));
            }
        } else if previous.paint.is_painted() {
            warn!(
                index,
                segments = previous.segments.len(),
                "Discarding painted subpath without geometry"
            );
        } else if !previous.segments.is_empty() {
            warn!(
                index,
                segments = previous.segments.len(),
                "Discarding unpainted subpath"
            );
        }
        Ok(())
    }

    fn mark(&mut self, paint: PaintFlags) {
        self.current.paint.stroke |= paint.stroke;
        self.current.paint.fill |= paint.fill;
    }

    fn finish(mut self, end: usize) -> Result<Path> {
        self.begin_path(end)?;
        Ok(Path {
            subpaths: self.subpaths,
        })
    }
}

/// Interpret `instructions` into a [`Path`].
///
/// `beginPath` starts a new subpath; `stroke` and `fill` only flag the current one,
/// so a subpath may be filled and later stroked. Fails with [`SigilError::EmptyPath`]
/// when nothing ends up painted.
pub fn interpret(instructions: &[Instruction], limits: &ResourceLimits) -> Result<Path> {
    if instructions.len() > limits.max_instructions {
        return Err(SigilError::ResourceLimitExceeded(
            ResourceLimit::Instructions {
                count: instructions.len(),
                max: limits.max_instructions,
            },
        ));
    }

    let mut recorder = PathRecorder::new(limits);
    for (index, instruction) in instructions.iter().enumerate() {
        match instruction {
            Instruction::MoveTo(p) => recorder.push_segment(Segment::MoveTo(*p))?,
            Instruction::LineTo(p) => recorder.push_segment(Segment::LineTo(*p))?,
            Instruction::Arc(arc) => {
                if arc.radius < 0.0 {
                    return Err(SigilError::malformed(
                        index,
                        format!("arc radius must not be negative, got {}", arc.radius),
                    ));
                }
                recorder.push_segment(Segment::Arc(*arc))?
            }
            Instruction::QuadraticCurve { ctrl, to } => {
                recorder.push_segment(Segment::QuadTo {
                    ctrl: *ctrl,
                    to: *to,
                })?
            }
            Instruction::CubicCurve { ctrl1, ctrl2, to } => {
                recorder.push_segment(Segment::CubicTo {
                    ctrl1: *ctrl1,
                    ctrl2: *ctrl2,
                    to: *to,
                })?
            }
            Instruction::ClosePath => recorder.push_segment(Segment::Close)?,
            Instruction::BeginPath => recorder.begin_path(index)?,
            Instruction::Stroke => recorder.mark(PaintFlags {
                stroke: true,
                fill: false,
            }),
            Instruction::Fill => recorder.mark(PaintFlags {
                stroke: false,
                fill: true,
            }),
        }
    }

    let path = recorder.finish(instructions.len())?;
    if !path.is_painted() {
        return Err(SigilError::EmptyPath);
    }
    debug!(
        instructions = instructions.len(),
        subpaths = path.subpaths.len(),
        segments = path.segment_count(),
        "Interpreted sigil instructions"
    );
    Ok(path)
}
