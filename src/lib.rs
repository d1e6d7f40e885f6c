//! Turns a short list of canvas drawing instructions into a signed distance field
//! texture, encoded as PNG.
//!
//! The pipeline is `Instruction`s → [`path::Path`] → [`grid::OccupancyGrid`] →
//! [`distance_field::DistanceField`] → [`png_writer::SigilTexture`]. Paths can also be
//! moved across process boundaries as SVG-style path data via [`svg_parser`].

pub mod config;
pub mod cpu_renderer;
pub mod deadline;
pub mod distance_field;
pub mod edge;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod instruction;
pub mod interpreter;
pub mod path;
pub mod pipeline;
pub mod png_writer;
pub mod svg_parser;

pub use config::{DistanceMethod, ResourceLimits, SigilConfig};
pub use error::{ErrorKind, Result, SigilError};
pub use instruction::{Instruction, decode_instructions};
pub use pipeline::{SigilGenerator, generate_sigil};
pub use png_writer::{SigilTexture, TextureFormat};
