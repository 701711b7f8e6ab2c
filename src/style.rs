//! Fill styles.
//!
//! [`Style`] is what a drawing command is filled with. [`Paint`] is the same
//! style prepared for span generation: colors premultiplied and gradient
//! tables built once per command.

use crate::color::Rgba32;
use crate::gradient::{Gradient, GradientQuality};
use crate::span_gradient::SpanGradient;

#[derive(Debug, Clone, PartialEq)]
pub enum Style {
    Solid(Rgba32),
    Gradient(Gradient),
}

impl Style {
    pub fn solid(color: Rgba32) -> Self {
        Style::Solid(color)
    }

    /// Short category name: `solid`, `linear`, `radial` or `conic`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Style::Solid(_) => "solid",
            Style::Gradient(g) => g.kind().name(),
        }
    }
}

impl From<Rgba32> for Style {
    fn from(c: Rgba32) -> Self {
        Style::Solid(c)
    }
}

impl From<Gradient> for Style {
    fn from(g: Gradient) -> Self {
        Style::Gradient(g)
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Style::Solid(c) => write!(f, "Solid({})", c),
            Style::Gradient(g) => write!(f, "{}", g),
        }
    }
}

// ============================================================================
// Paint
// ============================================================================

/// A style ready for span generation.
#[derive(Debug, Clone)]
pub enum Paint {
    /// Premultiplied ARGB32.
    Solid(u32),
    Gradient(Box<SpanGradient>),
}

impl Paint {
    pub fn new(style: &Style) -> Self {
        match style {
            Style::Solid(c) => Paint::Solid(c.premultiply()),
            Style::Gradient(g) => Paint::Gradient(Box::new(SpanGradient::new(g))),
        }
    }

    /// Fill `out` with source colors for pixels `x..x + out.len()` on row `y`.
    #[inline]
    pub fn generate(&self, out: &mut [u32], x: i32, y: i32, quality: GradientQuality) {
        match self {
            Paint::Solid(c) => out.fill(*c),
            Paint::Gradient(g) => g.generate(out, x, y, quality),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_paint_is_premultiplied() {
        let paint = Paint::new(&Style::solid(Rgba32::from_argb(0, 255, 255, 255)));
        let mut out = [7u32; 3];
        paint.generate(&mut out, 0, 0, GradientQuality::Nearest);
        assert_eq!(out, [0, 0, 0]);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Style::from(Rgba32::WHITE).kind_name(), "solid");
        assert_eq!(Style::from(Gradient::radial(0.0, 0.0, 0.0, 0.0, 1.0)).kind_name(), "radial");
    }

    #[test]
    fn test_display() {
        assert_eq!(Style::solid(Rgba32::new(0x1234_5678)).to_string(), "Solid(0x12345678)");
    }
}
