//! Shape filling shared by all renderers.
//!
//! A [`FillEngine`] turns an [`Outline`] into coverage spans restricted to the
//! rows of an [`ImageBand`] and hands each span to a [`SpanKernel`]. The
//! reference renderer uses [`ReferenceKernel`]; pipeline renderers use cached
//! [`Pipeline`](crate::pipeline::Pipeline)s.

use crate::basics::{BoxI, CoverType, PointD, COVER_FULL};
use crate::color::{apply_cover, src_over};
use crate::command::Outline;
use crate::gradient::GradientQuality;
use crate::image::{ImageBand, PixelFormat};
use crate::rasterizer_scanline_aa::Rasterizer;
use crate::scanline_u::ScanlineU8;
use crate::style::Paint;

/// One span to composite: position, coverage and source.
pub struct SpanRequest<'a> {
    pub x: i32,
    pub y: i32,
    pub covers: &'a [CoverType],
    pub paint: &'a Paint,
    pub quality: GradientQuality,
    pub format: PixelFormat,
}

/// Composites a coverage span onto destination pixels.
pub trait SpanKernel: Send + Sync {
    /// `dst` holds exactly the pixels of the span.
    fn fill_span(&self, dst: &mut [u32], req: &SpanRequest<'_>, scratch: &mut Vec<u32>);
}

/// Pixel-at-a-time kernel with no specialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceKernel;

impl SpanKernel for ReferenceKernel {
    fn fill_span(&self, dst: &mut [u32], req: &SpanRequest<'_>, _scratch: &mut Vec<u32>) {
        let force_alpha = if req.format == PixelFormat::Xrgb32 { 0xFF00_0000 } else { 0 };
        match req.paint {
            Paint::Solid(color) => {
                for (d, &c) in dst.iter_mut().zip(req.covers) {
                    *d = src_over(*d, apply_cover(*color, c)) | force_alpha;
                }
            }
            Paint::Gradient(g) => {
                let row = g.row(req.y);
                for (i, (d, &c)) in dst.iter_mut().zip(req.covers).enumerate() {
                    let src = g.pixel(req.x + i as i32, req.y, &row, req.quality);
                    *d = src_over(*d, apply_cover(src, c)) | force_alpha;
                }
            }
        }
    }
}

// ============================================================================
// Shapes
// ============================================================================

/// An outline converted to coverage, independent of any band.
pub enum Shape {
    Empty,
    Box(BoxI),
    Cells(Rasterizer),
}

impl Shape {
    pub fn new(outline: &Outline) -> Self {
        match outline {
            Outline::Empty => Shape::Empty,
            Outline::Box(b) => Shape::Box(*b),
            Outline::Polygons(polys) => {
                let mut ras = Rasterizer::new();
                if rasterize(&mut ras, polys) {
                    Shape::Cells(ras)
                } else {
                    Shape::Empty
                }
            }
        }
    }
}

fn rasterize(ras: &mut Rasterizer, polys: &[Vec<PointD>]) -> bool {
    ras.reset();
    for poly in polys {
        ras.add_polygon(poly);
    }
    ras.rewind_scanlines()
}

// ============================================================================
// FillEngine
// ============================================================================

/// Source and kernel used for one fill.
pub struct FillParams<'a> {
    pub paint: &'a Paint,
    pub quality: GradientQuality,
    pub kernel: &'a dyn SpanKernel,
}

/// Per-thread scratch state for filling.
pub struct FillEngine {
    rasterizer: Rasterizer,
    scanline: ScanlineU8,
    full_covers: Vec<CoverType>,
    scratch: Vec<u32>,
}

impl FillEngine {
    pub fn new(width: u32) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            scanline: ScanlineU8::new(width),
            full_covers: vec![COVER_FULL; width as usize],
            scratch: Vec::new(),
        }
    }

    /// Rasterize `outline` and fill the rows of `band` it covers.
    pub fn fill_outline(&mut self, band: &mut ImageBand<'_>, outline: &Outline, params: &FillParams<'_>) {
        match outline {
            Outline::Empty => {}
            Outline::Box(b) => fill_box(band, *b, &self.full_covers, &mut self.scratch, params),
            Outline::Polygons(polys) => {
                if rasterize(&mut self.rasterizer, polys) {
                    fill_cells(band, &self.rasterizer, &mut self.scanline, &mut self.scratch, params);
                }
            }
        }
    }

    /// Fill the rows of `band` covered by a prepared shape.
    pub fn fill_shape(&mut self, band: &mut ImageBand<'_>, shape: &Shape, params: &FillParams<'_>) {
        match shape {
            Shape::Empty => {}
            Shape::Box(b) => fill_box(band, *b, &self.full_covers, &mut self.scratch, params),
            Shape::Cells(ras) => fill_cells(band, ras, &mut self.scanline, &mut self.scratch, params),
        }
    }
}

fn fill_box(
    band: &mut ImageBand<'_>,
    b: BoxI,
    full_covers: &[CoverType],
    scratch: &mut Vec<u32>,
    params: &FillParams<'_>,
) {
    let x0 = b.x0.max(0);
    let x1 = b.x1.min(band.width() as i32);
    let y0 = b.y0.max(band.y0());
    let y1 = b.y1.min(band.y1());
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    let format = band.format();
    let len = (x1 - x0) as usize;
    for y in y0..y1 {
        let req = SpanRequest {
            x: x0,
            y,
            covers: &full_covers[..len],
            paint: params.paint,
            quality: params.quality,
            format,
        };
        let row = band.row_mut(y);
        params
            .kernel
            .fill_span(&mut row[x0 as usize..x1 as usize], &req, scratch);
    }
}

fn fill_cells(
    band: &mut ImageBand<'_>,
    ras: &Rasterizer,
    sl: &mut ScanlineU8,
    scratch: &mut Vec<u32>,
    params: &FillParams<'_>,
) {
    let y0 = ras.min_y().max(band.y0());
    let y1 = (ras.max_y() + 1).min(band.y1());
    let format = band.format();
    for y in y0..y1 {
        if !ras.sweep_row(y, sl) {
            continue;
        }
        let row = band.row_mut(y);
        for (x, covers) in sl.spans() {
            let req = SpanRequest {
                x,
                y,
                covers,
                paint: params.paint,
                quality: params.quality,
                format,
            };
            let start = x as usize;
            params
                .kernel
                .fill_span(&mut row[start..start + covers.len()], &req, scratch);
        }
    }
}
