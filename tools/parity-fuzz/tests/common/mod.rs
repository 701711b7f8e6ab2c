//! Renderer wrappers shared by the integration tests.

#![allow(dead_code)]

use raster_pipe::{Command, GradientQuality, Image, RenderError, Renderer, Style};

/// Renders through `inner`, then corrupts one pixel once more than
/// `faulty_from` commands have been submitted since the last clear.
///
/// With [`failing_after`](Self::failing_after) set, every flush past the
/// given number of flushes fails instead.
pub struct FaultyRenderer {
    inner: Box<dyn Renderer>,
    image: Image,
    faulty_from: usize,
    submitted: usize,
    flushes: usize,
    fail_after: Option<usize>,
}

impl FaultyRenderer {
    pub fn new(inner: Box<dyn Renderer>, faulty_from: usize) -> Self {
        let image = inner.image().clone();
        Self {
            inner,
            image,
            faulty_from,
            submitted: 0,
            flushes: 0,
            fail_after: None,
        }
    }

    pub fn failing_after(mut self, flushes: usize) -> Self {
        self.fail_after = Some(flushes);
        self
    }

    fn sync_image(&mut self) {
        self.image = self.inner.image().clone();
        if self.submitted > self.faulty_from {
            let p = self.image.pixel(0, 0);
            self.image.set_pixel(0, 0, p ^ 0x0000_0001);
        }
    }
}

impl Renderer for FaultyRenderer {
    fn name(&self) -> &'static str {
        "faulty"
    }

    fn clear(&mut self) {
        self.inner.clear();
        self.submitted = 0;
        self.sync_image();
    }

    fn gradient_quality(&self) -> GradientQuality {
        self.inner.gradient_quality()
    }

    fn set_gradient_quality(&mut self, quality: GradientQuality) {
        self.inner.set_gradient_quality(quality);
    }

    fn submit(&mut self, command: &Command, style: &Style) -> Result<(), RenderError> {
        self.submitted += 1;
        self.inner.submit(command, style)
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.flushes += 1;
        if matches!(self.fail_after, Some(n) if self.flushes > n) {
            return Err(RenderError::ThreadPool("render worker lost".into()));
        }
        self.inner.flush()?;
        self.sync_image();
        Ok(())
    }

    fn image(&self) -> &Image {
        &self.image
    }
}
