//! Pixel-exact image comparison.
//!
//! Pixels are compared as raw 32-bit values. The delta of a pixel is the
//! largest absolute difference among its four 8-bit channels.

use raster_pipe::{Image, PixelFormat};

// ============================================================================
// DiffResult
// ============================================================================

/// Summary of the differences between two images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Largest pixel delta.
    pub max_channel_delta: u32,
    /// Sum of all pixel deltas.
    pub cumulative_channel_delta: u64,
}

impl DiffResult {
    #[inline]
    pub fn is_identical(&self) -> bool {
        self.max_channel_delta == 0
    }
}

impl std::fmt::Display for DiffResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "maxDiff={} cumulative={}",
            self.max_channel_delta, self.cumulative_channel_delta
        )
    }
}

/// Largest per-channel difference of two ARGB32 pixels.
#[inline]
pub fn pixel_delta(a: u32, b: u32) -> u32 {
    (0..4)
        .map(|i| {
            let shift = i * 8;
            let ca = (a >> shift) & 0xFF;
            let cb = (b >> shift) & 0xFF;
            ca.abs_diff(cb)
        })
        .max()
        .unwrap_or(0)
}

/// Compare `a` and `b`; images of different sizes give an all-zero result.
pub fn diff_info(a: &Image, b: &Image) -> DiffResult {
    let mut info = DiffResult::default();
    if a.size() != b.size() {
        return info;
    }

    for (row_a, row_b) in a.rows().zip(b.rows()) {
        for (&pa, &pb) in row_a.iter().zip(row_b) {
            if pa != pb {
                let d = pixel_delta(pa, pb);
                info.max_channel_delta = info.max_channel_delta.max(d);
                info.cumulative_channel_delta += d as u64;
            }
        }
    }
    info
}

// ============================================================================
// Comparison
// ============================================================================

/// Outcome of comparing two images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Identical,
    Mismatch(DiffResult),
    /// The images cannot be compared because their sizes differ.
    Inconclusive {
        size_a: (u32, u32),
        size_b: (u32, u32),
    },
}

impl Comparison {
    pub fn is_identical(&self) -> bool {
        matches!(self, Comparison::Identical)
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Comparison::Mismatch(_))
    }

    /// The difference summary; zero unless this is a mismatch.
    pub fn diff(&self) -> DiffResult {
        match self {
            Comparison::Mismatch(d) => *d,
            _ => DiffResult::default(),
        }
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparison::Identical => f.write_str("identical"),
            Comparison::Mismatch(d) => write!(f, "mismatch ({})", d),
            Comparison::Inconclusive { size_a, size_b } => write!(
                f,
                "inconclusive (size {}x{} vs {}x{})",
                size_a.0, size_a.1, size_b.0, size_b.1
            ),
        }
    }
}

/// Compare `a` and `b`, reporting a size mismatch as inconclusive.
pub fn compare(a: &Image, b: &Image) -> Comparison {
    if a.size() != b.size() {
        return Comparison::Inconclusive {
            size_a: a.size(),
            size_b: b.size(),
        };
    }
    let info = diff_info(a, b);
    if info.is_identical() {
        Comparison::Identical
    } else {
        Comparison::Mismatch(info)
    }
}

// ============================================================================
// Visual diff
// ============================================================================

/// Opaque XRGB32 color for a pixel delta.
///
/// - 0: black
/// - 1..=4: red, `d * 64 - 1`
/// - 5..=16: green, `d * 16 - 1`
/// - above 16: blue, `127 + d / 2`
pub fn diff_color(delta: u32) -> u32 {
    match delta {
        0 => 0xFF00_0000,
        1..=4 => 0xFF00_0000 | ((delta * 64 - 1) << 16),
        5..=16 => 0xFF00_0000 | ((delta * 16 - 1) << 8),
        _ => 0xFF00_0000 | (127 + delta / 2).min(255),
    }
}

/// Image visualizing where and how much `a` and `b` differ, or `None` when
/// their sizes differ.
pub fn diff_image(a: &Image, b: &Image) -> Option<Image> {
    if a.size() != b.size() {
        return None;
    }
    let mut out = Image::new(a.width(), a.height(), PixelFormat::Xrgb32).ok()?;
    for (y, (row_a, row_b)) in a.rows().zip(b.rows()).enumerate() {
        let dst = out.row_mut(y as u32);
        for ((d, &pa), &pb) in dst.iter_mut().zip(row_a).zip(row_b) {
            *d = diff_color(pixel_delta(pa, pb));
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(w: u32, h: u32, fill: u32) -> Image {
        let mut img = Image::new(w, h, PixelFormat::Prgb32).unwrap();
        img.fill(fill);
        img
    }

    #[test]
    fn test_pixel_delta_takes_max_channel() {
        assert_eq!(pixel_delta(0xFF10_2030, 0xFF10_2030), 0);
        assert_eq!(pixel_delta(0xFF10_2030, 0xFE10_2035), 5);
        assert_eq!(pixel_delta(0x0000_0000, 0x0000_FF00), 255);
    }

    #[test]
    fn test_diff_info_sums_pixel_deltas() {
        let a = image(4, 4, 0xFF00_0000);
        let mut b = a.clone();
        b.set_pixel(1, 1, 0xFF00_0003);
        b.set_pixel(2, 3, 0xF000_0000);
        let d = diff_info(&a, &b);
        assert_eq!(d.max_channel_delta, 15);
        assert_eq!(d.cumulative_channel_delta, 18);
        assert_eq!(diff_info(&b, &a), d);
        assert_eq!(compare(&a, &b), Comparison::Mismatch(d));
    }

    #[test]
    fn test_identical_images() {
        let a = image(3, 2, 0x8040_2010);
        assert_eq!(diff_info(&a, &a.clone()), DiffResult::default());
        assert!(compare(&a, &a.clone()).is_identical());
    }

    #[test]
    fn test_size_mismatch_is_inconclusive() {
        let a = image(3, 2, 0);
        let b = image(2, 3, 0);
        assert_eq!(diff_info(&a, &b), DiffResult::default());
        assert_eq!(
            compare(&a, &b),
            Comparison::Inconclusive {
                size_a: (3, 2),
                size_b: (2, 3)
            }
        );
        assert!(diff_image(&a, &b).is_none());
    }

    #[test]
    fn test_diff_color_buckets() {
        assert_eq!(diff_color(0), 0xFF00_0000);
        assert_eq!(diff_color(1), 0xFF3F_0000);
        assert_eq!(diff_color(4), 0xFFFF_0000);
        assert_eq!(diff_color(5), 0xFF00_4F00);
        assert_eq!(diff_color(16), 0xFF00_FF00);
        assert_eq!(diff_color(17), 0xFF00_0087);
        assert_eq!(diff_color(255), 0xFF00_00FE);
    }

    #[test]
    fn test_diff_color_monotonic_within_bucket() {
        for (lo, hi, shift) in [(1u32, 4u32, 16u32), (5, 16, 8), (17, 255, 0)] {
            let mut prev = 0;
            for d in lo..=hi {
                let channel = (diff_color(d) >> shift) & 0xFF;
                assert!(channel >= prev, "delta {} dims the bucket color", d);
                prev = channel;
            }
        }
    }

    #[test]
    fn test_diff_image_is_opaque() {
        let a = image(2, 1, 0xFF00_0000);
        let mut b = a.clone();
        b.set_pixel(1, 0, 0xFF00_0002);
        let d = diff_image(&a, &b).unwrap();
        assert_eq!(d.format(), PixelFormat::Xrgb32);
        assert_eq!(d.pixel(0, 0), 0xFF00_0000);
        assert_eq!(d.pixel(1, 0), 0xFF7F_0000);
    }
}
