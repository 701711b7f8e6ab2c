//! Polygon scanline rasterizer with anti-aliasing.
//!
//! Accepts closed contours in floating-point coordinates, converts them to
//! cells and sweeps single rows into a [`ScanlineU8`]. The fill rule is
//! non-zero winding. Rows are addressed directly so a band renderer only pays
//! for the rows it owns.

use crate::basics::{poly_coord, PointD, POLY_SUBPIXEL_SHIFT};
use crate::rasterizer_cells_aa::CellRasterizer;
use crate::scanline_u::ScanlineU8;

const AA_SHIFT: u32 = 8;
const AA_MASK: i32 = (1 << AA_SHIFT) - 1;

/// Contour builder plus row sweeper.
pub struct Rasterizer {
    outline: CellRasterizer,
    start_x: i32,
    start_y: i32,
    last_x: i32,
    last_y: i32,
    open: bool,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            outline: CellRasterizer::new(),
            start_x: 0,
            start_y: 0,
            last_x: 0,
            last_y: 0,
            open: false,
        }
    }

    /// Discard all contours.
    pub fn reset(&mut self) {
        self.outline.reset();
        self.open = false;
    }

    // ========================================================================
    // Contour building
    // ========================================================================

    pub fn close_polygon(&mut self) {
        if self.open {
            self.outline
                .line(self.last_x, self.last_y, self.start_x, self.start_y);
            self.open = false;
        }
    }

    pub fn move_to_d(&mut self, x: f64, y: f64) {
        if self.outline.is_sorted() {
            self.reset();
        }
        self.close_polygon();
        self.start_x = poly_coord(x);
        self.start_y = poly_coord(y);
        self.last_x = self.start_x;
        self.last_y = self.start_y;
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        let x = poly_coord(x);
        let y = poly_coord(y);
        self.outline.line(self.last_x, self.last_y, x, y);
        self.last_x = x;
        self.last_y = y;
        self.open = true;
    }

    /// Add a closed contour. Fewer than three points add nothing.
    pub fn add_polygon(&mut self, points: &[PointD]) {
        if points.len() < 3 {
            return;
        }
        self.move_to_d(points[0].x, points[0].y);
        for p in &points[1..] {
            self.line_to_d(p.x, p.y);
        }
        self.close_polygon();
    }

    // ========================================================================
    // Sweeping
    // ========================================================================

    /// Sort cells. Returns `false` when there is nothing to render.
    pub fn rewind_scanlines(&mut self) -> bool {
        self.close_polygon();
        self.outline.sort();
        self.outline.total_cells() != 0
    }

    pub fn min_y(&self) -> i32 {
        self.outline.min_y()
    }

    pub fn max_y(&self) -> i32 {
        self.outline.max_y()
    }

    /// Non-zero coverage from accumulated area.
    #[inline]
    pub fn calculate_alpha(area: i32) -> u32 {
        let cover = (area >> (POLY_SUBPIXEL_SHIFT * 2 + 1 - AA_SHIFT)).abs();
        cover.min(AA_MASK) as u32
    }

    /// Sweep row `y` into `sl`. Returns `true` when the row has spans.
    ///
    /// Must be called after [`rewind_scanlines`](Self::rewind_scanlines).
    pub fn sweep_row(&self, y: i32, sl: &mut ScanlineU8) -> bool {
        sl.reset(y);
        let cells = self.outline.row(y);
        let mut i = 0;
        let mut cover = 0i32;

        while i < cells.len() {
            let x = cells[i].x;
            let mut area = cells[i].area;
            cover += cells[i].cover;
            i += 1;

            // Merge cells sharing the same x.
            while i < cells.len() && cells[i].x == x {
                area += cells[i].area;
                cover += cells[i].cover;
                i += 1;
            }

            let mut next_x = x;
            if area != 0 {
                let alpha = Self::calculate_alpha((cover << (POLY_SUBPIXEL_SHIFT + 1)) - area);
                if alpha != 0 {
                    sl.add_cell(x, alpha);
                }
                next_x = x + 1;
            }

            if i < cells.len() && cells[i].x > next_x {
                let alpha = Self::calculate_alpha(cover << (POLY_SUBPIXEL_SHIFT + 1));
                if alpha != 0 {
                    sl.add_span(next_x, (cells[i].x - next_x) as u32, alpha);
                }
            }
        }

        sl.num_spans() > 0
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<PointD> {
        vec![
            PointD::new(x0, y0),
            PointD::new(x1, y0),
            PointD::new(x1, y1),
            PointD::new(x0, y1),
        ]
    }

    fn row_covers(ras: &Rasterizer, y: i32, width: u32) -> Vec<u8> {
        let mut sl = ScanlineU8::new(width);
        let mut out = vec![0u8; width as usize];
        if ras.sweep_row(y, &mut sl) {
            for (x, covers) in sl.spans() {
                out[x as usize..x as usize + covers.len()].copy_from_slice(covers);
            }
        }
        out
    }

    #[test]
    fn test_calculate_alpha() {
        assert_eq!(Rasterizer::calculate_alpha(0), 0);
        assert_eq!(Rasterizer::calculate_alpha(256 * 256 * 2), 255);
        assert_eq!(Rasterizer::calculate_alpha(-256 * 256 * 2), 255);
        assert_eq!(Rasterizer::calculate_alpha(256 * 256), 128);
    }

    #[test]
    fn test_empty_rasterizer() {
        let mut ras = Rasterizer::new();
        assert!(!ras.rewind_scanlines());
    }

    #[test]
    fn test_degenerate_polygon_ignored() {
        let mut ras = Rasterizer::new();
        ras.add_polygon(&[PointD::new(0.0, 0.0), PointD::new(5.0, 5.0)]);
        assert!(!ras.rewind_scanlines());
    }

    #[test]
    fn test_integer_square_full_coverage() {
        let mut ras = Rasterizer::new();
        ras.add_polygon(&square(2.0, 1.0, 6.0, 3.0));
        assert!(ras.rewind_scanlines());
        assert_eq!(ras.min_y(), 1);
        let covers = row_covers(&ras, 1, 8);
        assert_eq!(covers, vec![0, 0, 255, 255, 255, 255, 0, 0]);
        assert!(row_covers(&ras, 0, 8).iter().all(|&c| c == 0));
        assert!(row_covers(&ras, 3, 8).iter().all(|&c| c == 0));
    }

    #[test]
    fn test_half_pixel_edges() {
        let mut ras = Rasterizer::new();
        ras.add_polygon(&square(1.5, 0.0, 3.5, 1.0));
        ras.rewind_scanlines();
        let covers = row_covers(&ras, 0, 5);
        assert_eq!(covers[0], 0);
        assert_eq!(covers[1], 128);
        assert_eq!(covers[2], 255);
        assert_eq!(covers[3], 128);
        assert_eq!(covers[4], 0);
    }

    #[test]
    fn test_winding_direction_irrelevant() {
        let mut cw = Rasterizer::new();
        cw.add_polygon(&square(0.0, 0.0, 4.0, 4.0));
        cw.rewind_scanlines();
        let mut pts = square(0.0, 0.0, 4.0, 4.0);
        pts.reverse();
        let mut ccw = Rasterizer::new();
        ccw.add_polygon(&pts);
        ccw.rewind_scanlines();
        assert_eq!(row_covers(&cw, 2, 6), row_covers(&ccw, 2, 6));
    }

    #[test]
    fn test_nonzero_overlap_saturates() {
        let mut ras = Rasterizer::new();
        ras.add_polygon(&square(0.0, 0.0, 4.0, 1.0));
        ras.add_polygon(&square(2.0, 0.0, 6.0, 1.0));
        ras.rewind_scanlines();
        assert_eq!(row_covers(&ras, 0, 6), vec![255; 6]);
    }

    #[test]
    fn test_offscreen_geometry_is_clipped() {
        let mut ras = Rasterizer::new();
        ras.add_polygon(&square(-30.0, -30.0, 3.0, 2.0));
        ras.rewind_scanlines();
        assert_eq!(row_covers(&ras, 0, 5), vec![255, 255, 255, 0, 0]);
        let mut sl = ScanlineU8::new(5);
        assert!(!ras.sweep_row(-100, &mut sl));
    }
}
