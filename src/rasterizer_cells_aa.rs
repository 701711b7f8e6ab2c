//! Anti-aliased cell rasterizer engine.
//!
//! Converts edges given in 24.8 fixed-point coordinates into pixel cells that
//! carry a `cover` (net winding contribution) and an `area` (twice the signed
//! area of the edge fragments inside the cell). `Rasterizer` sweeps the sorted
//! cells into coverage spans.

use crate::basics::{POLY_SUBPIXEL_MASK, POLY_SUBPIXEL_SCALE, POLY_SUBPIXEL_SHIFT};

const SHIFT: i32 = POLY_SUBPIXEL_SHIFT as i32;
const SCALE: i32 = POLY_SUBPIXEL_SCALE as i32;
const MASK: i32 = POLY_SUBPIXEL_MASK as i32;

/// Limit for dx magnitude before a line is split in half.
const DX_LIMIT: i64 = 16384 << POLY_SUBPIXEL_SHIFT;

// ============================================================================
// Cell
// ============================================================================

/// A pixel cell storing accumulated coverage and area from edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub cover: i32,
    pub area: i32,
}

impl Cell {
    const EMPTY: Cell = Cell {
        x: i32::MAX,
        y: i32::MAX,
        cover: 0,
        area: 0,
    };
}

/// Floor division returning `(quotient, remainder)` with a non-negative remainder.
#[inline]
fn floor_divmod(p: i64, d: i64) -> (i32, i64) {
    let mut q = p / d;
    let mut r = p % d;
    if r < 0 {
        q -= 1;
        r += d;
    }
    (q as i32, r)
}

// ============================================================================
// CellRasterizer
// ============================================================================

/// Edge-to-cell conversion engine.
///
/// Cells live in a flat `Vec`; after [`sort`](Self::sort) they are ordered by
/// `(y, x)` and `row_starts` indexes the first cell of each scanline.
pub struct CellRasterizer {
    cells: Vec<Cell>,
    row_starts: Vec<u32>,
    curr: Cell,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    sorted: bool,
}

impl CellRasterizer {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            row_starts: Vec::new(),
            curr: Cell::EMPTY,
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            sorted: false,
        }
    }

    /// Discard all cells, keeping allocations.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.row_starts.clear();
        self.curr = Cell::EMPTY;
        self.min_x = i32::MAX;
        self.min_y = i32::MAX;
        self.max_x = i32::MIN;
        self.max_y = i32::MIN;
        self.sorted = false;
    }

    pub fn min_x(&self) -> i32 {
        self.min_x
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    pub fn max_x(&self) -> i32 {
        self.max_x
    }

    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    #[inline]
    fn flush_cell(&mut self) {
        if self.curr.area | self.curr.cover != 0 {
            self.cells.push(self.curr);
        }
    }

    #[inline]
    fn move_cell(&mut self, x: i32, y: i32) {
        if self.curr.x != x || self.curr.y != y {
            self.flush_cell();
            self.curr = Cell {
                x,
                y,
                cover: 0,
                area: 0,
            };
        }
    }

    /// Walk an edge fragment inside scanline `ey`. `x1`/`x2` are 24.8
    /// coordinates, `y1`/`y2` the fractional y within the scanline.
    fn hline(&mut self, ey: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        let ex1 = x1 >> SHIFT;
        let ex2 = x2 >> SHIFT;
        let fx1 = x1 & MASK;
        let fx2 = x2 & MASK;

        if y1 == y2 {
            self.move_cell(ex2, ey);
            return;
        }

        if ex1 == ex2 {
            let delta = y2 - y1;
            self.curr.cover += delta;
            self.curr.area += (fx1 + fx2) * delta;
            return;
        }

        let mut dx = x2 as i64 - x1 as i64;
        let (p, first, incr) = if dx < 0 {
            dx = -dx;
            (fx1 as i64 * (y2 - y1) as i64, 0, -1)
        } else {
            ((SCALE - fx1) as i64 * (y2 - y1) as i64, SCALE, 1)
        };

        let (delta, mut rem) = floor_divmod(p, dx);
        self.curr.cover += delta;
        self.curr.area += (fx1 + first) * delta;

        let mut ex = ex1 + incr;
        self.move_cell(ex, ey);
        let mut y = y1 + delta;

        if ex != ex2 {
            let (lift, step) = floor_divmod(SCALE as i64 * (y2 - y1) as i64, dx);
            rem -= dx;
            while ex != ex2 {
                let mut d = lift;
                rem += step;
                if rem >= 0 {
                    rem -= dx;
                    d += 1;
                }
                self.curr.cover += d;
                self.curr.area += SCALE * d;
                y += d;
                ex += incr;
                self.move_cell(ex, ey);
            }
        }

        let d = y2 - y;
        self.curr.cover += d;
        self.curr.area += (fx2 + SCALE - first) * d;
    }

    /// Add an edge in 24.8 fixed-point coordinates.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = x2 as i64 - x1 as i64;
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = ((x1 as i64 + x2 as i64) >> 1) as i32;
            let cy = ((y1 as i64 + y2 as i64) >> 1) as i32;
            self.line(x1, y1, cx, cy);
            self.line(cx, cy, x2, y2);
            return;
        }

        let dy = y2 as i64 - y1 as i64;
        let ex1 = x1 >> SHIFT;
        let ex2 = x2 >> SHIFT;
        let mut ey1 = y1 >> SHIFT;
        let ey2 = y2 >> SHIFT;
        let fy1 = y1 & MASK;
        let fy2 = y2 & MASK;

        self.min_x = self.min_x.min(ex1).min(ex2);
        self.max_x = self.max_x.max(ex1).max(ex2);
        self.min_y = self.min_y.min(ey1).min(ey2);
        self.max_y = self.max_y.max(ey1).max(ey2);

        self.move_cell(ex1, ey1);

        if ey1 == ey2 {
            self.hline(ey1, x1, fy1, x2, fy2);
            return;
        }

        if dx == 0 {
            // Vertical edge: one cell per scanline, no hline walk.
            let two_fx = (x1 - (ex1 << SHIFT)) << 1;
            let (first, incr) = if dy < 0 { (0, -1) } else { (SCALE, 1) };

            let mut delta = first - fy1;
            self.curr.cover += delta;
            self.curr.area += two_fx * delta;

            ey1 += incr;
            self.move_cell(ex1, ey1);

            delta = first + first - SCALE;
            let area = two_fx * delta;
            while ey1 != ey2 {
                self.curr.cover = delta;
                self.curr.area = area;
                ey1 += incr;
                self.move_cell(ex1, ey1);
            }
            delta = fy2 - SCALE + first;
            self.curr.cover += delta;
            self.curr.area += two_fx * delta;
            return;
        }

        let (p, first, incr, dy_abs) = if dy < 0 {
            (fy1 as i64 * dx, 0, -1, -dy)
        } else {
            ((SCALE - fy1) as i64 * dx, SCALE, 1, dy)
        };

        let (delta, mut rem) = floor_divmod(p, dy_abs);
        let mut x_from = x1 + delta;
        self.hline(ey1, x1, fy1, x_from, first);

        ey1 += incr;
        self.move_cell(x_from >> SHIFT, ey1);

        if ey1 != ey2 {
            let (lift, step) = floor_divmod(SCALE as i64 * dx, dy_abs);
            rem -= dy_abs;
            while ey1 != ey2 {
                let mut d = lift;
                rem += step;
                if rem >= 0 {
                    rem -= dy_abs;
                    d += 1;
                }
                let x_to = x_from + d;
                self.hline(ey1, x_from, SCALE - first, x_to, first);
                x_from = x_to;
                ey1 += incr;
                self.move_cell(x_from >> SHIFT, ey1);
            }
        }
        self.hline(ey1, x_from, SCALE - first, x2, fy2);
    }

    /// Sort cells by `(y, x)` and build the per-scanline index.
    pub fn sort(&mut self) {
        if self.sorted {
            return;
        }
        self.flush_cell();
        self.curr = Cell::EMPTY;
        self.sorted = true;

        if self.cells.is_empty() {
            return;
        }

        self.cells.sort_unstable_by_key(|c| (c.y, c.x));

        let rows = (self.max_y - self.min_y + 1) as usize;
        self.row_starts.clear();
        self.row_starts.resize(rows + 1, 0);
        for cell in &self.cells {
            self.row_starts[(cell.y - self.min_y) as usize + 1] += 1;
        }
        for i in 1..=rows {
            self.row_starts[i] += self.row_starts[i - 1];
        }
    }

    /// Sorted cells of scanline `y`; empty outside the cell bounds.
    #[inline]
    pub fn row(&self, y: i32) -> &[Cell] {
        if !self.sorted || self.cells.is_empty() || y < self.min_y || y > self.max_y {
            return &[];
        }
        let i = (y - self.min_y) as usize;
        &self.cells[self.row_starts[i] as usize..self.row_starts[i + 1] as usize]
    }
}

impl Default for CellRasterizer {
    fn default() -> Self {
        Self::new()
    }
}
