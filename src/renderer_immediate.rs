//! Backends that composite each command as it is submitted.

use std::sync::Arc;

use crate::command::Command;
use crate::cpu::SimdLevel;
use crate::fill::{FillEngine, FillParams, ReferenceKernel, SpanKernel};
use crate::gradient::GradientQuality;
use crate::image::Image;
use crate::pipeline::{FetchKind, PipelineRuntime, PipelineSignature};
use crate::renderer::Renderer;
use crate::style::{Paint, Style};
use crate::RenderError;

/// Canvas plus scratch state for immediate filling.
struct Canvas {
    image: Image,
    engine: FillEngine,
    quality: GradientQuality,
}

impl Canvas {
    fn new(image: Image) -> Self {
        let engine = FillEngine::new(image.width());
        Self {
            image,
            engine,
            quality: GradientQuality::Nearest,
        }
    }

    fn draw(&mut self, command: &Command, style: &Style, kernel: &dyn SpanKernel) {
        let paint = Paint::new(style);
        let params = FillParams {
            paint: &paint,
            quality: self.quality,
            kernel,
        };
        self.engine
            .fill_outline(&mut self.image.full_band(), &command.outline(), &params);
    }
}

// ============================================================================
// ReferenceRenderer
// ============================================================================

/// Portable backend: every pixel goes through the scalar kernel.
pub struct ReferenceRenderer {
    canvas: Canvas,
}

impl ReferenceRenderer {
    pub fn new(image: Image) -> Self {
        Self {
            canvas: Canvas::new(image),
        }
    }
}

impl Renderer for ReferenceRenderer {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn clear(&mut self) {
        self.canvas.image.fill(0);
    }

    fn gradient_quality(&self) -> GradientQuality {
        self.canvas.quality
    }

    fn set_gradient_quality(&mut self, quality: GradientQuality) {
        self.canvas.quality = quality;
    }

    fn submit(&mut self, command: &Command, style: &Style) -> Result<(), RenderError> {
        self.canvas.draw(command, style, &ReferenceKernel);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn image(&self) -> &Image {
        &self.canvas.image
    }
}

// ============================================================================
// PipelineRenderer
// ============================================================================

/// Single-threaded backend using pipelines compiled for one SIMD level.
pub struct PipelineRenderer {
    canvas: Canvas,
    runtime: Arc<PipelineRuntime>,
    simd: SimdLevel,
}

impl PipelineRenderer {
    pub fn new(image: Image, runtime: Arc<PipelineRuntime>, simd: SimdLevel) -> Self {
        Self {
            canvas: Canvas::new(image),
            runtime,
            simd,
        }
    }

    pub fn simd_level(&self) -> SimdLevel {
        self.simd
    }

    pub fn runtime(&self) -> &Arc<PipelineRuntime> {
        &self.runtime
    }
}

impl Renderer for PipelineRenderer {
    fn name(&self) -> &'static str {
        "pipeline"
    }

    fn clear(&mut self) {
        self.canvas.image.fill(0);
    }

    fn gradient_quality(&self) -> GradientQuality {
        self.canvas.quality
    }

    fn set_gradient_quality(&mut self, quality: GradientQuality) {
        self.canvas.quality = quality;
    }

    fn submit(&mut self, command: &Command, style: &Style) -> Result<(), RenderError> {
        let pipeline = self.runtime.get(PipelineSignature {
            fetch: FetchKind::of(style),
            quality: self.canvas.quality,
            format: self.canvas.image.format(),
            simd: self.simd,
        });
        self.canvas.draw(command, style, pipeline.as_ref());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn image(&self) -> &Image {
        &self.canvas.image
    }
}
