use std::time::Duration;
use thiserror::Error;

/// A budget from [`crate::config::ResourceLimits`] that a request ran past.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceLimit {
    Instructions { count: usize, max: usize },
    Subpaths { count: usize, max: usize },
    Segments { count: usize, max: usize },
    OutputPixels { count: u64, max: u64 },
    SearchRadius { radius: u32, max: u32 },
    TimeBudget { budget: Duration },
}

impl std::fmt::Display for ResourceLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceLimit::Instructions { count, max } => {
                write!(f, "{count} instructions exceeds the maximum of {max}")
            }
            ResourceLimit::Subpaths { count, max } => {
                write!(f, "{count} subpaths exceeds the maximum of {max}")
            }
            ResourceLimit::Segments { count, max } => {
                write!(f, "{count} segments exceeds the maximum of {max}")
            }
            ResourceLimit::OutputPixels { count, max } => {
                write!(f, "{count} output pixels exceeds the maximum of {max}")
            }
            ResourceLimit::SearchRadius { radius, max } => {
                write!(f, "search radius {radius} exceeds the maximum of {max}")
            }
            ResourceLimit::TimeBudget { budget } => {
                write!(f, "generation ran past its {}ms budget", budget.as_millis())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum SigilError {
    #[error("Malformed instruction at index {index}: {reason}")]
    MalformedInstruction { index: usize, reason: String },
    #[error("No subpath was stroked or filled")]
    EmptyPath,
    #[error("Unsupported geometry: elliptical arc rx={rx}, ry={ry}")]
    UnsupportedGeometry { rx: f32, ry: f32 },
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(ResourceLimit),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid path data at byte {offset}: {reason}")]
    InvalidPathData { offset: usize, reason: String },
    #[error(
        "Rasterizer returned a {}x{} grid with {cells} cells, expected {}x{}",
        actual.0, actual.1, expected.0, expected.1
    )]
    RasterSize {
        expected: (u32, u32),
        actual: (u32, u32),
        cells: usize,
    },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Fieldless discriminant of [`SigilError`], for callers deciding whether to resubmit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInstruction,
    EmptyPath,
    UnsupportedGeometry,
    ResourceLimitExceeded,
    InvalidConfig,
    InvalidPathData,
    RasterSize,
    Encode,
}

impl SigilError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SigilError::MalformedInstruction { .. } => ErrorKind::MalformedInstruction,
            SigilError::EmptyPath => ErrorKind::EmptyPath,
            SigilError::UnsupportedGeometry { .. } => ErrorKind::UnsupportedGeometry,
            SigilError::ResourceLimitExceeded(_) => ErrorKind::ResourceLimitExceeded,
            SigilError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            SigilError::InvalidPathData { .. } => ErrorKind::InvalidPathData,
            SigilError::RasterSize { .. } => ErrorKind::RasterSize,
            SigilError::Encode(_) => ErrorKind::Encode,
        }
    }

    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        SigilError::MalformedInstruction {
            index,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SigilError>;
