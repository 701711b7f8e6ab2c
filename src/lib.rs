//! # raster-pipe
//!
//! A compact anti-aliased 2D rasterizer with runtime-selected fill pipelines,
//! built to be verified differentially.
//!
//! The same drawing command can be executed by three backends behind the
//! [`Renderer`] trait:
//!
//! - **reference**: a portable pixel-at-a-time kernel
//! - **pipeline**: lane-specialized kernels compiled per CPU feature level and
//!   cached in a [`PipelineRuntime`]
//! - **threaded**: batched commands rendered in horizontal bands on a worker
//!   pool
//!
//! All three must produce bit-identical images.
//!
//! ## Architecture
//!
//! 1. **Command**: a fill of a rect, polygon, curve path or text run
//! 2. **Outline**: the command flattened into closed polygons
//! 3. **Rasterizer**: polygons converted to area/cover cells and swept into
//!    coverage spans
//! 4. **Span kernel**: source pixels (solid or gradient) composited onto the
//!    canvas with source-over

// Foundation types
pub mod basics;
pub mod color;
pub mod error;
pub mod image;

// Geometry and rasterization
pub mod glyph_raster_bin;
pub mod path_storage;
pub mod rasterizer_cells_aa;
pub mod rasterizer_scanline_aa;
pub mod scanline_u;

// Styles
pub mod gradient;
pub mod gradient_lut;
pub mod span_gradient;
pub mod style;

// Commands and filling
pub mod command;
pub mod compose;
pub mod cpu;
pub mod fill;
pub mod pipeline;

// Backends
pub mod renderer;
pub mod renderer_immediate;
pub mod renderer_threaded;

pub use basics::{BoxD, BoxI, PointD, RectD, RectI};
pub use color::Rgba32;
pub use command::{Command, Outline, TextRun};
pub use cpu::SimdLevel;
pub use error::RenderError;
pub use gradient::{ExtendMode, Gradient, GradientKind, GradientQuality, GradientStop};
pub use image::{Image, PixelFormat};
pub use pipeline::{PipelineRuntime, PipelineSignature};
pub use renderer::{create_renderer, Renderer, RendererConfig};
pub use style::Style;
