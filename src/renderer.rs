//! The renderer interface and backend selection.
//!
//! All backends share one contract: commands are composited in submission
//! order onto a premultiplied canvas, and after [`Renderer::flush`] the image
//! reflects every submitted command. Backends differ only in how they get
//! there:
//!
//! - [`ReferenceRenderer`]: immediate, pixel-at-a-time kernel.
//! - [`PipelineRenderer`]: immediate, cached lane pipelines for a SIMD level.
//! - [`ThreadedRenderer`]: batched, rendered in horizontal bands on a worker
//!   pool at flush time.

use std::sync::Arc;

use tracing::debug;

use crate::command::Command;
use crate::cpu::SimdLevel;
use crate::fill::{ReferenceKernel, SpanKernel};
use crate::gradient::GradientQuality;
use crate::image::{Image, PixelFormat};
use crate::pipeline::{FetchKind, PipelineRuntime, PipelineSignature};
use crate::style::Style;
use crate::RenderError;

pub use crate::renderer_immediate::{PipelineRenderer, ReferenceRenderer};
pub use crate::renderer_threaded::ThreadedRenderer;

/// A drawing backend owning its canvas.
pub trait Renderer: Send {
    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Discard pending work and reset every pixel to transparent.
    fn clear(&mut self);

    fn gradient_quality(&self) -> GradientQuality;

    /// Quality used by subsequently submitted gradient fills.
    fn set_gradient_quality(&mut self, quality: GradientQuality);

    /// Queue or execute one fill.
    fn submit(&mut self, command: &Command, style: &Style) -> Result<(), RenderError>;

    /// Block until every submitted command is visible in [`image`](Self::image).
    fn flush(&mut self) -> Result<(), RenderError>;

    fn image(&self) -> &Image;
}

/// Backend selection and tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendererConfig {
    /// Worker threads; 0 renders on the calling thread.
    pub thread_count: u32,
    /// Restrict pipelines to this level instead of the detected one.
    pub cpu_features: Option<SimdLevel>,
    /// Compile pipelines into a private cache.
    pub isolated_runtime: bool,
    /// Use the reference kernel instead of pipelines.
    pub disable_pipeline: bool,
}

impl RendererConfig {
    pub fn reference() -> Self {
        Self {
            disable_pipeline: true,
            ..Self::default()
        }
    }

    pub fn pipeline(simd: Option<SimdLevel>) -> Self {
        Self {
            cpu_features: simd,
            ..Self::default()
        }
    }

    pub fn threaded(thread_count: u32) -> Self {
        Self {
            thread_count,
            ..Self::default()
        }
    }
}

/// Create the backend described by `config`.
pub fn create_renderer(
    width: u32,
    height: u32,
    format: PixelFormat,
    config: &RendererConfig,
) -> Result<Box<dyn Renderer>, RenderError> {
    let image = Image::new(width, height, format)?;
    let kernels = KernelSource::new(config)?;
    debug!(
        width,
        height,
        %format,
        threads = config.thread_count,
        kernels = %kernels,
        "creating renderer"
    );

    if config.thread_count > 0 {
        return Ok(Box::new(ThreadedRenderer::new(image, kernels, config.thread_count)?));
    }
    match kernels {
        KernelSource::Reference => Ok(Box::new(ReferenceRenderer::new(image))),
        KernelSource::Pipelines { runtime, simd } => {
            Ok(Box::new(PipelineRenderer::new(image, runtime, simd)))
        }
    }
}

// ============================================================================
// KernelSource
// ============================================================================

/// Where a backend gets its span kernels.
#[derive(Clone)]
pub enum KernelSource {
    Reference,
    Pipelines {
        runtime: Arc<PipelineRuntime>,
        simd: SimdLevel,
    },
}

impl KernelSource {
    pub fn new(config: &RendererConfig) -> Result<Self, RenderError> {
        if config.disable_pipeline {
            return Ok(KernelSource::Reference);
        }
        let simd = match config.cpu_features {
            Some(level) if !level.is_supported() => {
                return Err(RenderError::UnsupportedSimdLevel(level.name()))
            }
            Some(level) => level,
            None => SimdLevel::native(),
        };
        let runtime = if config.isolated_runtime {
            Arc::new(PipelineRuntime::new())
        } else {
            PipelineRuntime::global()
        };
        Ok(KernelSource::Pipelines { runtime, simd })
    }

    /// Kernel for filling `style` at `quality` onto a `format` canvas.
    pub fn kernel(&self, style: &Style, quality: GradientQuality, format: PixelFormat) -> Arc<dyn SpanKernel> {
        match self {
            KernelSource::Reference => Arc::new(ReferenceKernel),
            KernelSource::Pipelines { runtime, simd } => runtime.get(PipelineSignature {
                fetch: FetchKind::of(style),
                quality,
                format,
                simd: *simd,
            }),
        }
    }
}

impl std::fmt::Display for KernelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelSource::Reference => f.write_str("reference"),
            KernelSource::Pipelines { simd, .. } => write!(f, "pipeline/{}", simd),
        }
    }
}
