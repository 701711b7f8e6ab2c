//! Canvas pixel storage.
//!
//! An [`Image`] is a row-major buffer of packed 32-bit pixels. Rendering
//! happens through [`ImageBand`], a mutable view of a horizontal strip, so the
//! same fill code serves both whole-canvas and band-parallel backends.

use crate::color::demultiply_to_rgba8;
use crate::RenderError;

/// Pixel layout of an [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Premultiplied ARGB32.
    Prgb32,
    /// ARGB32 with the alpha byte forced to 0xFF.
    Xrgb32,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        4
    }

    pub const fn name(self) -> &'static str {
        match self {
            PixelFormat::Prgb32 => "prgb32",
            PixelFormat::Xrgb32 => "xrgb32",
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Image
// ============================================================================

/// A packed 32-bit image, top-down, without row padding.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u32>,
}

impl Image {
    /// Largest accepted width or height.
    pub const MAX_SIZE: u32 = 65535;

    /// Allocate a zero-filled image.
    ///
    /// Fails with [`RenderError::InvalidSize`] for empty or oversized
    /// dimensions and [`RenderError::OutOfMemory`] when the allocation fails.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, RenderError> {
        if width == 0 || height == 0 || width > Self::MAX_SIZE || height > Self::MAX_SIZE {
            return Err(RenderError::InvalidSize { width, height });
        }
        let len = width as usize * height as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| RenderError::OutOfMemory { bytes: len * format.bytes_per_pixel() })?;
        data.resize(len, 0);
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Distance between rows in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Pixels of row `y`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u32] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.data[start..start + w]
    }

    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u32] {
        let w = self.width as usize;
        let start = y as usize * w;
        &mut self.data[start..start + w]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.data.chunks_exact(self.width as usize)
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.row(y)[x as usize]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, value: u32) {
        self.row_mut(y)[x as usize] = value;
    }

    pub fn fill(&mut self, value: u32) {
        self.data.fill(value);
    }

    /// A band view covering the whole image.
    pub fn full_band(&mut self) -> ImageBand<'_> {
        ImageBand::new(self.width, 0, self.format, &mut self.data)
    }

    /// Straight-alpha RGBA8 bytes, suitable for encoders.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() * 4);
        for &p in &self.data {
            let p = match self.format {
                PixelFormat::Prgb32 => p,
                PixelFormat::Xrgb32 => p | 0xFF00_0000,
            };
            out.extend_from_slice(&demultiply_to_rgba8(p));
        }
        out
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ImageBand: a horizontal strip of rows
// ============================================================================

/// Mutable view of rows `[y0, y0 + height)` of an image.
pub struct ImageBand<'a> {
    width: u32,
    y0: u32,
    height: u32,
    format: PixelFormat,
    data: &'a mut [u32],
}

impl<'a> ImageBand<'a> {
    /// `data` must hold a whole number of rows of `width` pixels.
    pub fn new(width: u32, y0: u32, format: PixelFormat, data: &'a mut [u32]) -> Self {
        debug_assert!(width > 0 && data.len() % width as usize == 0);
        let height = (data.len() / width as usize) as u32;
        Self {
            width,
            y0,
            height,
            format,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// First row covered by this band.
    pub fn y0(&self) -> i32 {
        self.y0 as i32
    }

    /// One past the last row covered by this band.
    pub fn y1(&self) -> i32 {
        (self.y0 + self.height) as i32
    }

    /// Mutable pixels of absolute row `y`, which must lie inside the band.
    #[inline]
    pub fn row_mut(&mut self, y: i32) -> &mut [u32] {
        let w = self.width as usize;
        let start = (y as u32 - self.y0) as usize * w;
        &mut self.data[start..start + w]
    }
}
