//! Band-parallel backend.
//!
//! Submitted commands are rasterized on the calling thread and queued. At
//! flush the canvas is split into horizontal bands of [`BAND_HEIGHT`] rows and
//! every band replays the whole queue in order on a rayon pool. Each pixel is
//! written by exactly one band, so the result does not depend on scheduling.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::trace;

use crate::command::Command;
use crate::fill::{FillEngine, FillParams, Shape, SpanKernel};
use crate::gradient::GradientQuality;
use crate::image::{Image, ImageBand};
use crate::renderer::{KernelSource, Renderer};
use crate::style::{Paint, Style};
use crate::RenderError;

pub const BAND_HEIGHT: u32 = 32;
/// Queue length that triggers an implicit flush.
pub const MAX_BATCH: usize = 256;

struct BatchItem {
    shape: Shape,
    paint: Paint,
    quality: GradientQuality,
    kernel: Arc<dyn SpanKernel>,
}

pub struct ThreadedRenderer {
    image: Image,
    pool: rayon::ThreadPool,
    thread_count: u32,
    kernels: KernelSource,
    quality: GradientQuality,
    batch: Vec<BatchItem>,
}

impl ThreadedRenderer {
    pub fn new(image: Image, kernels: KernelSource, thread_count: u32) -> Result<Self, RenderError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count.max(1) as usize)
            .thread_name(|i| format!("raster-band-{}", i))
            .build()
            .map_err(|e| RenderError::ThreadPool(e.to_string()))?;
        Ok(Self {
            image,
            pool,
            thread_count,
            kernels,
            quality: GradientQuality::Nearest,
            batch: Vec::new(),
        })
    }

    pub fn thread_count(&self) -> u32 {
        self.thread_count
    }

    /// Commands queued since the last flush.
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    fn render_batch(&mut self) {
        let Self {
            image, pool, batch, ..
        } = self;
        if batch.is_empty() {
            return;
        }
        let width = image.width();
        let format = image.format();
        let band_len = BAND_HEIGHT as usize * width as usize;
        let items: &[BatchItem] = batch;

        trace!(commands = items.len(), "rendering batch");
        pool.install(|| {
            image
                .data_mut()
                .par_chunks_mut(band_len)
                .enumerate()
                .for_each(|(i, chunk)| {
                    let mut band = ImageBand::new(width, i as u32 * BAND_HEIGHT, format, chunk);
                    let mut engine = FillEngine::new(width);
                    for item in items {
                        let params = FillParams {
                            paint: &item.paint,
                            quality: item.quality,
                            kernel: item.kernel.as_ref(),
                        };
                        engine.fill_shape(&mut band, &item.shape, &params);
                    }
                });
        });
        batch.clear();
    }
}

impl Renderer for ThreadedRenderer {
    fn name(&self) -> &'static str {
        "threaded"
    }

    fn clear(&mut self) {
        self.batch.clear();
        self.image.fill(0);
    }

    fn gradient_quality(&self) -> GradientQuality {
        self.quality
    }

    fn set_gradient_quality(&mut self, quality: GradientQuality) {
        self.quality = quality;
    }

    fn submit(&mut self, command: &Command, style: &Style) -> Result<(), RenderError> {
        let kernel = self.kernels.kernel(style, self.quality, self.image.format());
        self.batch.push(BatchItem {
            shape: Shape::new(&command.outline()),
            paint: Paint::new(style),
            quality: self.quality,
            kernel,
        });
        if self.batch.len() >= MAX_BATCH {
            self.render_batch();
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.render_batch();
        Ok(())
    }

    fn image(&self) -> &Image {
        &self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::RectI;
    use crate::color::Rgba32;
    use crate::image::PixelFormat;
    use crate::renderer::RendererConfig;

    fn renderer(threads: u32) -> ThreadedRenderer {
        let image = Image::new(40, 100, PixelFormat::Prgb32).unwrap();
        let kernels = KernelSource::new(&RendererConfig::reference()).unwrap();
        ThreadedRenderer::new(image, kernels, threads).unwrap()
    }

    #[test]
    fn test_commands_are_deferred_until_flush() {
        let mut r = renderer(2);
        r.submit(&Command::FillRectI(RectI::new(0, 0, 40, 100)), &Style::Solid(Rgba32::WHITE))
            .unwrap();
        assert_eq!(r.pending(), 1);
        assert_eq!(r.image().pixel(0, 0), 0);
        r.flush().unwrap();
        assert_eq!(r.pending(), 0);
        assert!(r.image().data().iter().all(|&p| p == 0xFFFF_FFFF));
    }

    #[test]
    fn test_large_batches_flush_implicitly() {
        let mut r = renderer(3);
        for i in 0..MAX_BATCH {
            let rect = RectI::new((i % 40) as i32, (i % 100) as i32, 1, 1);
            r.submit(&Command::FillRectI(rect), &Style::Solid(Rgba32::BLACK)).unwrap();
        }
        assert_eq!(r.pending(), 0);
        assert_eq!(r.image().pixel(0, 0), 0xFF00_0000);
    }

    #[test]
    fn test_order_preserved_across_bands() {
        let mut r = renderer(4);
        r.submit(&Command::FillRectI(RectI::new(0, 0, 40, 100)), &Style::Solid(Rgba32::WHITE))
            .unwrap();
        r.submit(&Command::FillRectI(RectI::new(0, 30, 40, 5)), &Style::Solid(Rgba32::BLACK))
            .unwrap();
        r.flush().unwrap();
        assert_eq!(r.image().pixel(5, 31), 0xFF00_0000);
        assert_eq!(r.image().pixel(5, 33), 0xFF00_0000);
        assert_eq!(r.image().pixel(5, 29), 0xFFFF_FFFF);
        assert_eq!(r.image().pixel(5, 35), 0xFFFF_FFFF);
        assert_eq!(r.thread_count(), 4);
    }
}
