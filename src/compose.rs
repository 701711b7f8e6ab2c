//! Source-over span kernels.
//!
//! Every kernel composites premultiplied source pixels onto a premultiplied
//! destination span under per-pixel coverage. The scalar kernels define the
//! result; the lane kernels process `N` pixels per step with shortcuts for
//! fully covered opaque and fully uncovered lanes, and produce exactly the same
//! pixels.

use crate::basics::CoverType;
use crate::color::{apply_cover, src_over};

const OPAQUE: u32 = 0xFF00_0000;

// ============================================================================
// Scalar kernels
// ============================================================================

#[inline]
pub fn blend_span_scalar(dst: &mut [u32], src: &[u32], covers: &[CoverType]) {
    for ((d, &s), &c) in dst.iter_mut().zip(src).zip(covers) {
        *d = src_over(*d, apply_cover(s, c));
    }
}

#[inline]
pub fn fill_solid_scalar(dst: &mut [u32], color: u32, covers: &[CoverType]) {
    for (d, &c) in dst.iter_mut().zip(covers) {
        *d = src_over(*d, apply_cover(color, c));
    }
}

// ============================================================================
// Lane kernels
// ============================================================================

#[inline]
fn lane_is_full(covers: &[CoverType]) -> bool {
    covers.iter().all(|&c| c == 0xFF)
}

#[inline]
fn lane_is_empty(covers: &[CoverType]) -> bool {
    covers.iter().all(|&c| c == 0)
}

pub fn blend_span_lanes<const N: usize>(dst: &mut [u32], src: &[u32], covers: &[CoverType]) {
    let len = dst.len().min(src.len()).min(covers.len());
    let (dst, src, covers) = (&mut dst[..len], &src[..len], &covers[..len]);
    let body = len - len % N;

    for ((d, s), c) in dst[..body]
        .chunks_exact_mut(N)
        .zip(src[..body].chunks_exact(N))
        .zip(covers[..body].chunks_exact(N))
    {
        if lane_is_empty(c) {
            continue;
        }
        if lane_is_full(c) && s.iter().all(|&p| p & OPAQUE == OPAQUE) {
            d.copy_from_slice(s);
            continue;
        }
        let mut out = [0u32; N];
        for i in 0..N {
            out[i] = src_over(d[i], apply_cover(s[i], c[i]));
        }
        d.copy_from_slice(&out);
    }

    blend_span_scalar(&mut dst[body..], &src[body..], &covers[body..]);
}

pub fn fill_solid_lanes<const N: usize>(dst: &mut [u32], color: u32, covers: &[CoverType]) {
    let len = dst.len().min(covers.len());
    let (dst, covers) = (&mut dst[..len], &covers[..len]);
    let body = len - len % N;
    let opaque = color & OPAQUE == OPAQUE;

    for (d, c) in dst[..body]
        .chunks_exact_mut(N)
        .zip(covers[..body].chunks_exact(N))
    {
        if lane_is_empty(c) {
            continue;
        }
        if opaque && lane_is_full(c) {
            d.fill(color);
            continue;
        }
        let mut out = [0u32; N];
        for i in 0..N {
            out[i] = src_over(d[i], apply_cover(color, c[i]));
        }
        d.copy_from_slice(&out);
    }

    fill_solid_scalar(&mut dst[body..], color, &covers[body..]);
}

/// Force the alpha byte of every pixel to 0xFF.
#[inline]
pub fn force_opaque(dst: &mut [u32]) {
    for p in dst {
        *p |= OPAQUE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random pixels covering every interesting case.
    fn pattern(len: usize, salt: u32) -> (Vec<u32>, Vec<u32>, Vec<u8>) {
        let mut state = 0x9E37_79B9u32 ^ salt;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };
        let premul = |v: u32| {
            let a = v >> 24;
            let c = |s: u32| ((v >> s) & 0xFF).min(a);
            (a << 24) | (c(16) << 16) | (c(8) << 8) | c(0)
        };
        let dst = (0..len).map(|_| premul(next())).collect();
        let src = (0..len)
            .map(|i| if i % 3 == 0 { next() | OPAQUE } else { premul(next()) })
            .collect();
        let covers = (0..len)
            .map(|i| match i % 7 {
                0 | 1 | 2 => 255,
                3 => 0,
                _ => next() as u8,
            })
            .collect();
        (dst, src, covers)
    }

    #[test]
    fn test_blend_lanes_match_scalar() {
        for len in [0usize, 1, 3, 4, 5, 16, 17, 63, 100] {
            let (dst, src, covers) = pattern(len, len as u32);
            let mut expected = dst.clone();
            blend_span_scalar(&mut expected, &src, &covers);
            for lanes in [4usize, 8, 16] {
                let mut got = dst.clone();
                match lanes {
                    4 => blend_span_lanes::<4>(&mut got, &src, &covers),
                    8 => blend_span_lanes::<8>(&mut got, &src, &covers),
                    _ => blend_span_lanes::<16>(&mut got, &src, &covers),
                }
                assert_eq!(got, expected, "len={} lanes={}", len, lanes);
            }
        }
    }

    #[test]
    fn test_solid_lanes_match_scalar() {
        for color in [0xFF12_3456u32, 0x8040_2010, 0] {
            let (dst, _, covers) = pattern(37, color);
            let mut expected = dst.clone();
            fill_solid_scalar(&mut expected, color, &covers);
            let mut got4 = dst.clone();
            fill_solid_lanes::<4>(&mut got4, color, &covers);
            let mut got16 = dst.clone();
            fill_solid_lanes::<16>(&mut got16, color, &covers);
            assert_eq!(got4, expected);
            assert_eq!(got16, expected);
        }
    }

    #[test]
    fn test_opaque_full_cover_replaces() {
        let mut dst = vec![0x4020_1008u32; 8];
        fill_solid_lanes::<8>(&mut dst, 0xFFAA_BBCC, &[255; 8]);
        assert!(dst.iter().all(|&p| p == 0xFFAA_BBCC));
    }

    #[test]
    fn test_force_opaque() {
        let mut dst = vec![0x0012_3456u32, 0x8000_0000];
        force_opaque(&mut dst);
        assert_eq!(dst, vec![0xFF12_3456, 0xFF00_0000]);
    }
}
