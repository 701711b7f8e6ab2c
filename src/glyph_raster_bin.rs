//! Embedded raster font and glyph outlines.
//!
//! Glyphs are 5x7 dot bitmaps for printable ASCII, stored column-major with
//! bit 0 at the top. A glyph is drawn as one rectangle per vertical run of
//! set dots, scaled so that a font of size `s` has an 8-dot em of `s` pixels.
//! Text therefore goes through the same rasterizer as every other shape.

use crate::basics::{BoxD, PointD};

pub const GLYPH_COLUMNS: usize = 5;
pub const GLYPH_ROWS: usize = 7;
const EM_DOTS: f64 = 8.0;
const ADVANCE_DOTS: f64 = 6.0;
const FIRST_CHAR: u32 = 0x20;
const LAST_CHAR: u32 = 0x7E;

#[rustfmt::skip]
static FONT_5X7: [[u8; GLYPH_COLUMNS]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x08, 0x2A, 0x1C, 0x2A, 0x08], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x00, 0x08, 0x14, 0x22, 0x41], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x41, 0x22, 0x14, 0x08, 0x00], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x01, 0x01], // F
    [0x3E, 0x41, 0x41, 0x51, 0x32], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x04, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x7F, 0x20, 0x18, 0x20, 0x7F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x03, 0x04, 0x78, 0x04, 0x03], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x00, 0x7F, 0x41, 0x41], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
    [0x41, 0x41, 0x7F, 0x00, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x08, 0x14, 0x54, 0x54, 0x3C], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x00, 0x7F, 0x10, 0x28, 0x44], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x08, 0x04, 0x08, 0x10, 0x08], // ~
];

/// Column bitmaps of `ch`. Characters outside printable ASCII render as `?`.
pub fn glyph_bits(ch: char) -> &'static [u8; GLYPH_COLUMNS] {
    let code = ch as u32;
    let code = if (FIRST_CHAR..=LAST_CHAR).contains(&code) { code } else { '?' as u32 };
    &FONT_5X7[(code - FIRST_CHAR) as usize]
}

// ============================================================================
// RasterFont
// ============================================================================

/// The embedded font at a given pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterFont {
    size: f64,
}

impl RasterFont {
    pub fn new(size: f64) -> Self {
        Self { size }
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Edge length of one glyph dot.
    pub fn dot(&self) -> f64 {
        self.size / EM_DOTS
    }

    pub fn advance(&self) -> f64 {
        self.dot() * ADVANCE_DOTS
    }

    pub fn text_width(&self, text: &str) -> f64 {
        self.advance() * text.chars().count() as f64
    }

    /// Dot-run rectangles of `ch` with its baseline origin at `origin`.
    pub fn glyph_boxes(&self, ch: char, origin: PointD, out: &mut Vec<BoxD>) {
        let dot = self.dot();
        let top = origin.y - dot * GLYPH_ROWS as f64;
        for (col, &bits) in glyph_bits(ch).iter().enumerate() {
            let x0 = origin.x + dot * col as f64;
            let mut row = 0;
            while row < GLYPH_ROWS {
                if bits & (1 << row) == 0 {
                    row += 1;
                    continue;
                }
                let start = row;
                while row < GLYPH_ROWS && bits & (1 << row) != 0 {
                    row += 1;
                }
                out.push(BoxD::new(
                    x0,
                    top + dot * start as f64,
                    x0 + dot,
                    top + dot * row as f64,
                ));
            }
        }
    }

    /// Outline polygons of `text` laid out left to right from `origin`.
    pub fn text_polygons(&self, text: &str, origin: PointD) -> Vec<Vec<PointD>> {
        let mut boxes = Vec::new();
        let mut pen = origin;
        for ch in text.chars() {
            self.glyph_boxes(ch, pen, &mut boxes);
            pen.x += self.advance();
        }
        boxes
            .into_iter()
            .map(|b| {
                vec![
                    PointD::new(b.x0, b.y0),
                    PointD::new(b.x1, b.y0),
                    PointD::new(b.x1, b.y1),
                    PointD::new(b.x0, b.y1),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_is_empty() {
        let font = RasterFont::new(16.0);
        let mut boxes = Vec::new();
        font.glyph_boxes(' ', PointD::new(0.0, 0.0), &mut boxes);
        assert!(boxes.is_empty());
    }

    #[test]
    fn test_unknown_char_falls_back() {
        assert_eq!(glyph_bits('\u{263A}'), glyph_bits('?'));
        assert_eq!(glyph_bits('\n'), glyph_bits('?'));
    }

    #[test]
    fn test_vertical_runs_merge() {
        // 'I' has a full-height middle column.
        let font = RasterFont::new(8.0);
        let mut boxes = Vec::new();
        font.glyph_boxes('I', PointD::new(0.0, 7.0), &mut boxes);
        assert!(boxes.contains(&BoxD::new(2.0, 0.0, 3.0, 7.0)));
    }

    #[test]
    fn test_metrics() {
        let font = RasterFont::new(20.0);
        assert_eq!(font.dot(), 2.5);
        assert_eq!(font.advance(), 15.0);
        assert_eq!(font.text_width("ABCD"), 60.0);
    }

    #[test]
    fn test_text_stays_above_baseline() {
        let font = RasterFont::new(20.0);
        let polys = font.text_polygons("Ag|~", PointD::new(100.0, 50.0));
        assert!(!polys.is_empty());
        for poly in &polys {
            assert_eq!(poly.len(), 4);
            assert!(poly.iter().all(|p| p.y <= 50.0 && p.y >= 50.0 - 17.5));
            assert!(poly.iter().all(|p| p.x >= 100.0 && p.x <= 100.0 + 60.0));
        }
    }
}
