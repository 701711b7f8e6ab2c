//! Unpacked scanline container.
//!
//! Holds one coverage byte per pixel of the canvas row plus the list of
//! covered runs. Spans are clipped to `[0, width)` as they are added, so
//! consumers never see out-of-canvas pixels.

use crate::basics::CoverType;

/// A run of covered pixels; the covers live in the scanline's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub x: i32,
    pub len: u32,
}

/// Per-pixel coverage for a single row.
pub struct ScanlineU8 {
    y: i32,
    width: i32,
    covers: Vec<CoverType>,
    spans: Vec<Span>,
}

impl ScanlineU8 {
    pub fn new(width: u32) -> Self {
        Self {
            y: 0,
            width: width as i32,
            covers: vec![0; width as usize],
            spans: Vec::new(),
        }
    }

    /// Start a new row, dropping all spans.
    pub fn reset(&mut self, y: i32) {
        self.y = y;
        self.spans.clear();
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn num_spans(&self) -> usize {
        self.spans.len()
    }

    #[inline]
    pub fn add_cell(&mut self, x: i32, cover: u32) {
        self.add_span(x, 1, cover);
    }

    /// Add `len` pixels starting at `x`, all with `cover`.
    pub fn add_span(&mut self, x: i32, len: u32, cover: u32) {
        let x0 = x.max(0);
        let x1 = (x as i64 + len as i64).min(self.width as i64) as i32;
        if x0 >= x1 {
            return;
        }
        self.covers[x0 as usize..x1 as usize].fill(cover as CoverType);
        match self.spans.last_mut() {
            Some(last) if last.x + last.len as i32 == x0 => last.len += (x1 - x0) as u32,
            _ => self.spans.push(Span {
                x: x0,
                len: (x1 - x0) as u32,
            }),
        }
    }

    /// Covered runs with their coverage bytes, left to right.
    pub fn spans(&self) -> impl Iterator<Item = (i32, &[CoverType])> + '_ {
        self.spans.iter().map(move |s| {
            let start = s.x as usize;
            (s.x, &self.covers[start..start + s.len as usize])
        })
    }
}
