//! Gradient style description.
//!
//! A [`Gradient`] is plain data: geometry, color stops and extend mode. It is
//! turned into a pixel fetcher by [`SpanGradient`](crate::span_gradient::SpanGradient).

use crate::color::Rgba32;

/// How gradient positions outside `[0, 1]` are mapped back into range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExtendMode {
    #[default]
    Pad,
    Repeat,
    Reflect,
}

impl ExtendMode {
    pub const ALL: [ExtendMode; 3] = [ExtendMode::Pad, ExtendMode::Repeat, ExtendMode::Reflect];

    /// Mode for an arbitrary index, wrapping modulo the number of modes.
    pub fn from_index(i: u32) -> Self {
        Self::ALL[(i % 3) as usize]
    }

    pub const fn name(self) -> &'static str {
        match self {
            ExtendMode::Pad => "pad",
            ExtendMode::Repeat => "repeat",
            ExtendMode::Reflect => "reflect",
        }
    }
}

/// Per-pixel sampling of the gradient lookup table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GradientQuality {
    /// Round to the nearest 8-bit value.
    #[default]
    Nearest,
    /// Ordered dithering driven by the pixel position.
    Dither,
}

impl GradientQuality {
    pub const fn name(self) -> &'static str {
        match self {
            GradientQuality::Nearest => "nearest",
            GradientQuality::Dither => "dither",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba32,
}

/// Gradient geometry in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    Linear { x0: f64, y0: f64, x1: f64, y1: f64 },
    /// Center `(cx, cy)`, focal point `(fx, fy)` and radius `r`.
    Radial { cx: f64, cy: f64, fx: f64, fy: f64, r: f64 },
    /// Center `(cx, cy)` and start angle in radians.
    Conic { cx: f64, cy: f64, angle: f64 },
}

impl GradientKind {
    pub const fn name(&self) -> &'static str {
        match self {
            GradientKind::Linear { .. } => "linear",
            GradientKind::Radial { .. } => "radial",
            GradientKind::Conic { .. } => "conic",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    kind: GradientKind,
    stops: Vec<GradientStop>,
    extend: ExtendMode,
}

impl Gradient {
    pub fn new(kind: GradientKind) -> Self {
        Self {
            kind,
            stops: Vec::new(),
            extend: ExtendMode::Pad,
        }
    }

    pub fn linear(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(GradientKind::Linear { x0, y0, x1, y1 })
    }

    pub fn radial(cx: f64, cy: f64, fx: f64, fy: f64, r: f64) -> Self {
        Self::new(GradientKind::Radial { cx, cy, fx, fy, r })
    }

    pub fn conic(cx: f64, cy: f64, angle: f64) -> Self {
        Self::new(GradientKind::Conic { cx, cy, angle })
    }

    /// Insert a stop, keeping stops ordered by offset. Stops with equal
    /// offsets keep their insertion order. The offset is clamped to `[0, 1]`.
    pub fn add_stop(&mut self, offset: f64, color: Rgba32) -> &mut Self {
        let offset = if offset.is_nan() { 0.0 } else { offset.clamp(0.0, 1.0) };
        let at = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(at, GradientStop { offset, color });
        self
    }

    pub fn set_extend_mode(&mut self, extend: ExtendMode) -> &mut Self {
        self.extend = extend;
        self
    }

    pub fn kind(&self) -> &GradientKind {
        &self.kind
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn extend_mode(&self) -> ExtendMode {
        self.extend
    }
}

impl std::fmt::Display for Gradient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            GradientKind::Linear { x0, y0, x1, y1 } => {
                write!(f, "Linear({} {} {} {})", x0, y0, x1, y1)?
            }
            GradientKind::Radial { cx, cy, fx, fy, r } => {
                write!(f, "Radial({} {} {} {} {})", cx, cy, fx, fy, r)?
            }
            GradientKind::Conic { cx, cy, angle } => write!(f, "Conic({} {} {})", cx, cy, angle)?,
        }
        f.write_str(" stops=[")?;
        for (i, s) in self.stops.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}", s.offset, s.color)?;
        }
        write!(f, "] extend={}", self.extend.name())
    }
}
