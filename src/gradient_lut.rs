//! Gradient color lookup table.
//!
//! Builds a 256-entry table from color stops. Colors are interpolated in
//! straight alpha and stored premultiplied with 8 fractional bits per channel,
//! which lets the dithered fetch add a position-dependent threshold before
//! truncating to 8 bits.

use crate::color::pack;
use crate::gradient::GradientStop;

pub const LUT_SIZE: usize = 256;
pub const LUT_MASK: i64 = LUT_SIZE as i64 - 1;

const fn bayer16(x: usize, y: usize) -> u8 {
    let mut v = 0usize;
    let mut i = 0;
    while i < 4 {
        let xb = (x >> i) & 1;
        let yb = (y >> i) & 1;
        v = (v << 2) | (((xb ^ yb) << 1) | yb);
        i += 1;
    }
    v as u8
}

const fn build_dither_matrix() -> [[u8; 16]; 16] {
    let mut m = [[0u8; 16]; 16];
    let mut y = 0;
    while y < 16 {
        let mut x = 0;
        while x < 16 {
            m[y][x] = bayer16(x, y);
            x += 1;
        }
        y += 1;
    }
    m
}

/// 16x16 ordered-dither thresholds, a permutation of `0..=255`.
pub static DITHER_MATRIX: [[u8; 16]; 16] = build_dither_matrix();

// ============================================================================
// GradientLut
// ============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct GradientLut {
    /// Premultiplied `[a, r, g, b]` in 8.8 fixed point.
    fixed: Vec<[u16; 4]>,
    /// Rounded premultiplied ARGB32.
    nearest: Vec<u32>,
}

impl GradientLut {
    pub fn new(stops: &[GradientStop]) -> Self {
        let mut fixed = Vec::with_capacity(LUT_SIZE);
        let mut nearest = Vec::with_capacity(LUT_SIZE);
        for i in 0..LUT_SIZE {
            let t = i as f64 / (LUT_SIZE - 1) as f64;
            let [a, r, g, b] = color_at(stops, t);
            let entry = [
                to_fixed(a),
                to_fixed(r * a / 255.0),
                to_fixed(g * a / 255.0),
                to_fixed(b * a / 255.0),
            ];
            nearest.push(pack(entry.map(|c| ((c as u32 + 128) >> 8).min(255))));
            fixed.push(entry);
        }
        Self { fixed, nearest }
    }

    #[inline]
    pub fn nearest(&self, index: usize) -> u32 {
        self.nearest[index]
    }

    /// Entry `index` dithered for the pixel at `(x, y)`.
    #[inline]
    pub fn dithered(&self, index: usize, x: i32, y: i32) -> u32 {
        let d = DITHER_MATRIX[(y & 15) as usize][(x & 15) as usize] as u32;
        pack(self.fixed[index].map(|c| ((c as u32 + d) >> 8).min(255)))
    }
}

impl std::fmt::Debug for GradientLut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradientLut")
            .field("first", &format_args!("0x{:08X}", self.nearest[0]))
            .field("last", &format_args!("0x{:08X}", self.nearest[LUT_SIZE - 1]))
            .finish()
    }
}

#[inline]
fn to_fixed(v: f64) -> u16 {
    (v * 256.0).round().clamp(0.0, 255.0 * 256.0) as u16
}

/// Straight-alpha `[a, r, g, b]` at position `t`, as floats in `[0, 255]`.
fn color_at(stops: &[GradientStop], t: f64) -> [f64; 4] {
    let channels = |s: &GradientStop| {
        [
            s.color.a() as f64,
            s.color.r() as f64,
            s.color.g() as f64,
            s.color.b() as f64,
        ]
    };
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return [0.0; 4],
    };
    if t <= first.offset {
        return channels(first);
    }
    if t >= last.offset {
        return channels(last);
    }
    for pair in stops.windows(2) {
        let (s0, s1) = (&pair[0], &pair[1]);
        if t >= s0.offset && t < s1.offset {
            let f = (t - s0.offset) / (s1.offset - s0.offset);
            let c0 = channels(s0);
            let c1 = channels(s1);
            return [0, 1, 2, 3].map(|i| c0[i] + (c1[i] - c0[i]) * f);
        }
    }
    channels(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{unpack, Rgba32};

    fn stops(list: &[(f64, u32)]) -> Vec<GradientStop> {
        list.iter()
            .map(|&(offset, c)| GradientStop {
                offset,
                color: Rgba32::new(c),
            })
            .collect()
    }

    #[test]
    fn test_dither_matrix_is_permutation() {
        let mut seen = [false; 256];
        for row in DITHER_MATRIX.iter() {
            for &v in row {
                assert!(!seen[v as usize]);
                seen[v as usize] = true;
            }
        }
        assert_eq!(DITHER_MATRIX[0][0], 0);
    }

    #[test]
    fn test_empty_stops_transparent() {
        let lut = GradientLut::new(&[]);
        assert_eq!(lut.nearest(0), 0);
        assert_eq!(lut.nearest(255), 0);
    }

    #[test]
    fn test_endpoints_exact() {
        let lut = GradientLut::new(&stops(&[(0.0, 0xFF00_0000), (1.0, 0xFFFF_FFFF)]));
        assert_eq!(lut.nearest(0), 0xFF00_0000);
        assert_eq!(lut.nearest(255), 0xFFFF_FFFF);
        assert_eq!(lut.dithered(0, 5, 9), 0xFF00_0000);
        assert_eq!(lut.dithered(255, 5, 9), 0xFFFF_FFFF);
    }

    #[test]
    fn test_ramp_is_monotonic() {
        let lut = GradientLut::new(&stops(&[(0.0, 0xFF00_0000), (1.0, 0xFFFF_FFFF)]));
        for i in 1..LUT_SIZE {
            assert!(unpack(lut.nearest(i))[1] >= unpack(lut.nearest(i - 1))[1]);
        }
    }

    #[test]
    fn test_premultiplied_invariant_holds_when_dithered() {
        let lut = GradientLut::new(&stops(&[(0.0, 0x10FF_FFFF), (0.5, 0x80FF_00FF), (1.0, 0x00FF_FFFF)]));
        for i in 0..LUT_SIZE {
            for y in 0..16 {
                for x in 0..16 {
                    let [a, r, g, b] = unpack(lut.dithered(i, x, y));
                    assert!(r <= a && g <= a && b <= a);
                }
            }
        }
    }

    #[test]
    fn test_dither_stays_within_one_step() {
        let lut = GradientLut::new(&stops(&[(0.0, 0xFF00_0000), (1.0, 0xFF00_00FF)]));
        for i in 0..LUT_SIZE {
            let n = unpack(lut.nearest(i))[3] as i32;
            let d = unpack(lut.dithered(i, 3, 7))[3] as i32;
            assert!((n - d).abs() <= 1);
        }
    }
}
