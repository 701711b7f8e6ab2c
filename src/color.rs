//! Packed 32-bit colors and premultiplied arithmetic.
//!
//! Colors travel through drawing commands as straight-alpha ARGB32
//! ([`Rgba32`]). Canvases store premultiplied ARGB32 (PRGB32) so all
//! compositing below works on premultiplied values.

use crate::basics::CoverType;

pub const BASE_SHIFT: u32 = 8;
pub const BASE_MASK: u32 = (1 << BASE_SHIFT) - 1;
pub const BASE_MSB: u32 = 1 << (BASE_SHIFT - 1);

/// Fixed-point multiply of two 8-bit quantities, `a * b / 255` rounded.
///
/// Exact over `u8`: `mul_div255(x, 255) == x` for every `x`.
#[inline]
pub fn mul_div255(a: u32, b: u32) -> u32 {
    let t = a * b + BASE_MSB;
    ((t >> BASE_SHIFT) + t) >> BASE_SHIFT
}

// ============================================================================
// Rgba32: straight alpha, packed as 0xAARRGGBB
// ============================================================================

/// A straight-alpha color packed as `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgba32(pub u32);

impl Rgba32 {
    pub const TRANSPARENT: Rgba32 = Rgba32(0);
    pub const WHITE: Rgba32 = Rgba32(0xFFFF_FFFF);
    pub const BLACK: Rgba32 = Rgba32(0xFF00_0000);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    pub const fn is_opaque(self) -> bool {
        self.a() == 0xFF
    }

    /// Convert to premultiplied ARGB32.
    #[inline]
    pub fn premultiply(self) -> u32 {
        let a = self.a() as u32;
        if a == BASE_MASK {
            return self.0;
        }
        let r = mul_div255(self.r() as u32, a);
        let g = mul_div255(self.g() as u32, a);
        let b = mul_div255(self.b() as u32, a);
        (a << 24) | (r << 16) | (g << 8) | b
    }
}

impl std::fmt::Display for Rgba32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

// ============================================================================
// Premultiplied pixel helpers
// ============================================================================

/// Split a packed pixel into `[a, r, g, b]`.
#[inline]
pub fn unpack(p: u32) -> [u32; 4] {
    [p >> 24, (p >> 16) & 0xFF, (p >> 8) & 0xFF, p & 0xFF]
}

#[inline]
pub fn pack(c: [u32; 4]) -> u32 {
    (c[0] << 24) | (c[1] << 16) | (c[2] << 8) | c[3]
}

/// Scale every channel of a premultiplied pixel by `cover`.
#[inline]
pub fn apply_cover(src: u32, cover: CoverType) -> u32 {
    if cover == 0xFF {
        return src;
    }
    let c = unpack(src);
    let m = cover as u32;
    pack([
        mul_div255(c[0], m),
        mul_div255(c[1], m),
        mul_div255(c[2], m),
        mul_div255(c[3], m),
    ])
}

/// Porter-Duff source-over of premultiplied `src` onto premultiplied `dst`.
#[inline]
pub fn src_over(dst: u32, src: u32) -> u32 {
    let sa = src >> 24;
    if sa == BASE_MASK {
        return src;
    }
    if src == 0 {
        return dst;
    }
    let ia = BASE_MASK - sa;
    let d = unpack(dst);
    let s = unpack(src);
    pack([
        s[0] + mul_div255(d[0], ia),
        s[1] + mul_div255(d[1], ia),
        s[2] + mul_div255(d[2], ia),
        s[3] + mul_div255(d[3], ia),
    ])
}

/// Convert a premultiplied pixel back to straight-alpha `[r, g, b, a]` bytes.
pub fn demultiply_to_rgba8(p: u32) -> [u8; 4] {
    let [a, r, g, b] = unpack(p);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    if a == BASE_MASK {
        return [r as u8, g as u8, b as u8, 0xFF];
    }
    let d = |c: u32| ((c * BASE_MASK + (a >> 1)) / a).min(BASE_MASK) as u8;
    [d(r), d(g), d(b), a as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div255_exact_at_full() {
        for x in 0..=255u32 {
            assert_eq!(mul_div255(x, 255), x);
            assert_eq!(mul_div255(x, 0), 0);
        }
    }

    #[test]
    fn test_rgba32_channels() {
        let c = Rgba32::from_argb(0x80, 0x10, 0x20, 0x30);
        assert_eq!(c.value(), 0x8010_2030);
        assert_eq!(c.a(), 0x80);
        assert_eq!(c.r(), 0x10);
        assert_eq!(c.g(), 0x20);
        assert_eq!(c.b(), 0x30);
        assert!(!c.is_opaque());
        assert!(Rgba32::WHITE.is_opaque());
    }

    #[test]
    fn test_premultiply() {
        assert_eq!(Rgba32::new(0xFF12_3456).premultiply(), 0xFF12_3456);
        assert_eq!(Rgba32::new(0x00FF_FFFF).premultiply(), 0);
        let p = Rgba32::from_argb(128, 255, 0, 255).premultiply();
        assert_eq!(unpack(p), [128, 128, 0, 128]);
    }

    #[test]
    fn test_src_over_opaque_replaces() {
        assert_eq!(src_over(0xFF00_FF00, 0xFF11_2233), 0xFF11_2233);
    }

    #[test]
    fn test_src_over_transparent_keeps_dst() {
        assert_eq!(src_over(0xFF00_FF00, 0), 0xFF00_FF00);
    }

    #[test]
    fn test_src_over_half() {
        let src = Rgba32::from_argb(128, 255, 255, 255).premultiply();
        let out = src_over(0xFF00_0000, src);
        assert_eq!(out >> 24, 255);
        assert_eq!((out >> 16) & 0xFF, 128);
    }

    #[test]
    fn test_apply_cover() {
        assert_eq!(apply_cover(0xFFFF_FFFF, 255), 0xFFFF_FFFF);
        assert_eq!(apply_cover(0xFFFF_FFFF, 0), 0);
        assert_eq!(unpack(apply_cover(0xFFFF_FFFF, 128)), [128, 128, 128, 128]);
    }

    #[test]
    fn test_demultiply() {
        assert_eq!(demultiply_to_rgba8(0), [0, 0, 0, 0]);
        assert_eq!(demultiply_to_rgba8(0xFF10_2030), [0x10, 0x20, 0x30, 0xFF]);
        let p = Rgba32::from_argb(128, 255, 0, 0).premultiply();
        assert_eq!(demultiply_to_rgba8(p), [255, 0, 0, 128]);
    }
}
