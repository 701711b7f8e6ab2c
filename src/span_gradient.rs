//! Gradient span generation.
//!
//! Gradient functions map a pixel center to a position in lookup-table units
//! (one unit per LUT entry, so `[0, 256)` is the `[0, 1)` range of the
//! gradient). [`SpanGradient`] applies the extend mode and samples the LUT.
//!
//! Every fetch is computed from the pixel coordinates alone. Backends that
//! split a row into lanes, or a canvas into bands, get identical pixels.

use crate::gradient::{ExtendMode, Gradient, GradientKind, GradientQuality};
use crate::gradient_lut::{GradientLut, LUT_MASK, LUT_SIZE};

const LUT_SCALE: f64 = LUT_SIZE as f64;
/// Focal nudge applied when the focus lies exactly on the circle.
const FOCUS_NUDGE: f64 = 1.0 / 16.0;

/// Gradient shape function.
pub trait GradientFunction {
    /// Row-invariant part of the computation for scanline `y`.
    fn row(&self, py: f64) -> RowTerms;

    /// Position of pixel center `px` on a row, in LUT units.
    fn calculate(&self, px: f64, row: &RowTerms) -> f64;
}

/// Terms shared by every pixel of a row.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowTerms {
    pub a: f64,
    pub b: f64,
}

// ============================================================================
// Linear
// ============================================================================

/// Projection onto the `(x0, y0) -> (x1, y1)` axis.
#[derive(Debug, Clone, Copy)]
pub struct GradientLinear {
    x0: f64,
    y0: f64,
    dx: f64,
    dy: f64,
}

impl GradientLinear {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let len2 = dx * dx + dy * dy;
        let scale = if len2 > 0.0 && len2.is_finite() { LUT_SCALE / len2 } else { 0.0 };
        Self {
            x0,
            y0,
            dx: dx * scale,
            dy: dy * scale,
        }
    }
}

impl GradientFunction for GradientLinear {
    #[inline]
    fn row(&self, py: f64) -> RowTerms {
        RowTerms {
            a: (py - self.y0) * self.dy,
            b: 0.0,
        }
    }

    #[inline]
    fn calculate(&self, px: f64, row: &RowTerms) -> f64 {
        (px - self.x0) * self.dx + row.a
    }
}

// ============================================================================
// Radial with focal point
// ============================================================================

/// Two-point radial gradient: circle at the center, focus relative to it.
#[derive(Debug, Clone, Copy)]
pub struct GradientRadialFocus {
    cx: f64,
    cy: f64,
    fx: f64,
    fy: f64,
    r2: f64,
    mul: f64,
}

impl GradientRadialFocus {
    pub fn new(cx: f64, cy: f64, fx: f64, fy: f64, r: f64) -> Self {
        let mut fx = fx - cx;
        let mut fy = fy - cy;
        let r2 = r * r;
        let mut d = r2 - (fx * fx + fy * fy);
        if d == 0.0 {
            if fx != 0.0 {
                fx -= FOCUS_NUDGE.copysign(fx);
            }
            if fy != 0.0 {
                fy -= FOCUS_NUDGE.copysign(fy);
            }
            d = r2 - (fx * fx + fy * fy);
        }
        let mul = if d != 0.0 && d.is_finite() { LUT_SCALE / d } else { 0.0 };
        Self {
            cx,
            cy,
            fx,
            fy,
            r2,
            mul,
        }
    }
}

impl GradientFunction for GradientRadialFocus {
    #[inline]
    fn row(&self, py: f64) -> RowTerms {
        let dy = py - self.cy - self.fy;
        RowTerms {
            a: dy,
            b: dy * dy,
        }
    }

    #[inline]
    fn calculate(&self, px: f64, row: &RowTerms) -> f64 {
        let dx = px - self.cx - self.fx;
        let dy = row.a;
        let d2 = dx * self.fy - dy * self.fx;
        let d3 = self.r2 * (dx * dx + row.b) - d2 * d2;
        (dx * self.fx + dy * self.fy + d3.abs().sqrt()) * self.mul
    }
}

// ============================================================================
// Conic
// ============================================================================

/// Angular sweep around the center, starting at `angle`.
#[derive(Debug, Clone, Copy)]
pub struct GradientConic {
    cx: f64,
    cy: f64,
    angle: f64,
}

impl GradientConic {
    pub fn new(cx: f64, cy: f64, angle: f64) -> Self {
        Self { cx, cy, angle }
    }
}

impl GradientFunction for GradientConic {
    #[inline]
    fn row(&self, py: f64) -> RowTerms {
        RowTerms {
            a: py - self.cy,
            b: 0.0,
        }
    }

    #[inline]
    fn calculate(&self, px: f64, row: &RowTerms) -> f64 {
        (row.a.atan2(px - self.cx) - self.angle) * (LUT_SCALE / std::f64::consts::TAU)
    }
}

// ============================================================================
// Extend modes
// ============================================================================

/// Map a LUT-unit position to a table index.
#[inline]
pub fn apply_extend(v: f64, extend: ExtendMode) -> usize {
    // Float-to-int casts saturate, and NaN maps to 0.
    let i = v.floor() as i64;
    let i = match extend {
        ExtendMode::Pad => i.clamp(0, LUT_MASK),
        ExtendMode::Repeat => i & LUT_MASK,
        ExtendMode::Reflect => {
            let m = i & (LUT_MASK * 2 + 1);
            if m > LUT_MASK {
                LUT_MASK * 2 + 1 - m
            } else {
                m
            }
        }
    };
    i as usize
}

// ============================================================================
// SpanGradient
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Shape {
    Linear(GradientLinear),
    Radial(GradientRadialFocus),
    Conic(GradientConic),
}

/// A gradient prepared for fetching: shape function, LUT and extend mode.
#[derive(Debug, Clone)]
pub struct SpanGradient {
    shape: Shape,
    lut: GradientLut,
    extend: ExtendMode,
}

impl SpanGradient {
    pub fn new(gradient: &Gradient) -> Self {
        let (shape, extend) = match *gradient.kind() {
            GradientKind::Linear { x0, y0, x1, y1 } => (
                Shape::Linear(GradientLinear::new(x0, y0, x1, y1)),
                gradient.extend_mode(),
            ),
            GradientKind::Radial { cx, cy, fx, fy, r } => (
                Shape::Radial(GradientRadialFocus::new(cx, cy, fx, fy, r)),
                gradient.extend_mode(),
            ),
            // Conic gradients wrap around the full turn.
            GradientKind::Conic { cx, cy, angle } => {
                (Shape::Conic(GradientConic::new(cx, cy, angle)), ExtendMode::Repeat)
            }
        };
        Self {
            shape,
            lut: GradientLut::new(gradient.stops()),
            extend,
        }
    }

    #[inline]
    pub fn row(&self, y: i32) -> RowTerms {
        let py = y as f64 + 0.5;
        match &self.shape {
            Shape::Linear(g) => g.row(py),
            Shape::Radial(g) => g.row(py),
            Shape::Conic(g) => g.row(py),
        }
    }

    /// LUT index for pixel `x` of the row described by `row`.
    #[inline]
    pub fn index(&self, x: i32, row: &RowTerms) -> usize {
        let px = x as f64 + 0.5;
        let v = match &self.shape {
            Shape::Linear(g) => g.calculate(px, row),
            Shape::Radial(g) => g.calculate(px, row),
            Shape::Conic(g) => g.calculate(px, row),
        };
        apply_extend(v, self.extend)
    }

    /// Premultiplied color of pixel `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32, row: &RowTerms, quality: GradientQuality) -> u32 {
        let i = self.index(x, row);
        match quality {
            GradientQuality::Nearest => self.lut.nearest(i),
            GradientQuality::Dither => self.lut.dithered(i, x, y),
        }
    }

    /// Fill `out` with the colors of pixels `x..x + out.len()` on row `y`.
    pub fn generate(&self, out: &mut [u32], x: i32, y: i32, quality: GradientQuality) {
        let row = self.row(y);
        for (i, p) in out.iter_mut().enumerate() {
            *p = self.pixel(x + i as i32, y, &row, quality);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba32;

    fn black_to_white(mut g: Gradient) -> Gradient {
        g.add_stop(0.0, Rgba32::BLACK).add_stop(1.0, Rgba32::WHITE);
        g
    }

    #[test]
    fn test_apply_extend() {
        assert_eq!(apply_extend(-10.0, ExtendMode::Pad), 0);
        assert_eq!(apply_extend(300.0, ExtendMode::Pad), 255);
        assert_eq!(apply_extend(300.0, ExtendMode::Repeat), 44);
        assert_eq!(apply_extend(-1.0, ExtendMode::Repeat), 255);
        assert_eq!(apply_extend(256.0, ExtendMode::Reflect), 255);
        assert_eq!(apply_extend(300.0, ExtendMode::Reflect), 211);
        assert_eq!(apply_extend(-1.0, ExtendMode::Reflect), 0);
        assert_eq!(apply_extend(f64::NAN, ExtendMode::Pad), 0);
        assert_eq!(apply_extend(f64::INFINITY, ExtendMode::Pad), 255);
    }

    #[test]
    fn test_linear_positions() {
        let g = GradientLinear::new(0.0, 0.0, 256.0, 0.0);
        let row = g.row(0.5);
        assert_eq!(g.calculate(0.5, &row), 0.5);
        assert_eq!(g.calculate(128.0, &row), 128.0);
    }

    #[test]
    fn test_degenerate_linear_is_constant() {
        let g = GradientLinear::new(10.0, 10.0, 10.0, 10.0);
        let row = g.row(3.5);
        assert_eq!(g.calculate(100.5, &row), 0.0);
    }

    #[test]
    fn test_radial_center_and_edge() {
        let g = GradientRadialFocus::new(100.0, 100.0, 100.0, 100.0, 50.0);
        let row = g.row(100.0);
        assert!(g.calculate(100.0, &row).abs() < 1e-9);
        assert!((g.calculate(150.0, &row) - LUT_SCALE).abs() < 1e-9);
    }

    #[test]
    fn test_radial_focus_on_circle_is_finite() {
        let g = GradientRadialFocus::new(0.0, 0.0, 50.0, 0.0, 50.0);
        let row = g.row(10.5);
        assert!(g.calculate(20.5, &row).is_finite());
    }

    #[test]
    fn test_conic_quarter_turn() {
        let g = GradientConic::new(0.0, 0.0, 0.0);
        let row = g.row(10.0);
        assert!((g.calculate(0.0, &row) - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_span_gradient_pad_ends() {
        let sg = SpanGradient::new(&black_to_white(Gradient::linear(10.0, 0.0, 20.0, 0.0)));
        let mut out = [0u32; 30];
        sg.generate(&mut out, 0, 0, GradientQuality::Nearest);
        assert_eq!(out[0], 0xFF00_0000);
        assert_eq!(out[29], 0xFFFF_FFFF);
    }

    #[test]
    fn test_conic_always_repeats() {
        let mut g = black_to_white(Gradient::conic(50.0, 50.0, 1.0));
        g.set_extend_mode(ExtendMode::Pad);
        let sg = SpanGradient::new(&g);
        assert_eq!(sg.extend, ExtendMode::Repeat);
    }

    #[test]
    fn test_generate_matches_per_pixel() {
        let mut g = black_to_white(Gradient::radial(40.0, 30.0, 45.0, 20.0, 70.0));
        g.set_extend_mode(ExtendMode::Reflect);
        let sg = SpanGradient::new(&g);
        let mut out = [0u32; 64];
        sg.generate(&mut out, -5, 17, GradientQuality::Dither);
        let row = sg.row(17);
        for (i, &p) in out.iter().enumerate() {
            assert_eq!(p, sg.pixel(-5 + i as i32, 17, &row, GradientQuality::Dither));
        }
    }
}
