//! Seeded random streams.
//!
//! [`RandomStream`] is the only source of randomness in the fuzzer; reseeding
//! it reproduces the exact same sequence. [`RandomDataGenerator`] layers
//! coordinate and color helpers on top, drawing every coordinate from a fixed
//! bounding box.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use raster_pipe::{BoxD, BoxI, ExtendMode, PointD, RectD, RectI, Rgba32};

/// A reseedable pseudo-random sequence.
#[derive(Debug, Clone)]
pub struct RandomStream {
    rng: StdRng,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Restart the sequence from `seed`.
    pub fn reset(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.rng.gen()
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn next_double(&mut self) -> f64 {
        self.rng.gen()
    }
}

// ============================================================================
// RandomDataGenerator
// ============================================================================

/// Random geometry and colors inside a bounding box.
#[derive(Debug, Clone)]
pub struct RandomDataGenerator {
    rnd: RandomStream,
    bounds: BoxD,
    width: f64,
    height: f64,
}

impl RandomDataGenerator {
    pub const DEFAULT_SEED: u64 = 0x1234_5678;

    pub fn new(bounds: BoxD) -> Self {
        let mut gen = Self {
            rnd: RandomStream::new(Self::DEFAULT_SEED),
            bounds: BoxD::default(),
            width: 0.0,
            height: 0.0,
        };
        gen.set_bounds(bounds);
        gen
    }

    pub fn bounds(&self) -> BoxD {
        self.bounds
    }

    /// Panics if `bounds` is not a finite, non-negative box.
    pub fn set_bounds(&mut self, bounds: BoxD) {
        assert!(bounds.is_valid(), "malformed generator bounds: {:?}", bounds);
        self.bounds = bounds;
        self.width = bounds.width();
        self.height = bounds.height();
    }

    pub fn seed(&mut self, seed: u64) {
        self.rnd.reset(seed);
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.rnd.next_u32()
    }

    #[inline]
    pub fn next_double(&mut self) -> f64 {
        self.rnd.next_double()
    }

    pub fn next_rgba32(&mut self) -> Rgba32 {
        Rgba32::new(self.rnd.next_u32())
    }

    pub fn next_rgb32(&mut self) -> Rgba32 {
        Rgba32::new(self.rnd.next_u32() | 0xFF00_0000)
    }

    pub fn next_extend_mode(&mut self) -> ExtendMode {
        ExtendMode::from_index(self.rnd.next_u32())
    }

    // ------------------------------------------------------------------------
    // Coordinates
    // ------------------------------------------------------------------------

    /// Truncated toward zero, as a C cast would.
    pub fn next_x_coord_i(&mut self) -> i32 {
        (self.rnd.next_double() * self.width + self.bounds.x0) as i32
    }

    pub fn next_y_coord_i(&mut self) -> i32 {
        (self.rnd.next_double() * self.height + self.bounds.y0) as i32
    }

    pub fn next_x_coord_d(&mut self) -> f64 {
        self.rnd.next_double() * self.width + self.bounds.x0
    }

    pub fn next_y_coord_d(&mut self) -> f64 {
        self.rnd.next_double() * self.height + self.bounds.y0
    }

    pub fn next_point_d(&mut self) -> PointD {
        let x = self.next_x_coord_d();
        let y = self.next_y_coord_d();
        PointD::new(x, y)
    }

    /// A point snapped to integer coordinates.
    pub fn next_point_i(&mut self) -> PointD {
        let x = self.next_x_coord_i();
        let y = self.next_y_coord_i();
        PointD::new(x as f64, y as f64)
    }

    /// Never empty: degenerate spans grow by one pixel.
    pub fn next_box_i(&mut self) -> BoxI {
        let mut x0 = self.next_x_coord_i();
        let mut y0 = self.next_y_coord_i();
        let mut x1 = self.next_x_coord_i();
        let mut y1 = self.next_y_coord_i();

        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
        }
        if y0 > y1 {
            std::mem::swap(&mut y0, &mut y1);
        }
        if x0 == x1 {
            x1 += 1;
        }
        if y0 == y1 {
            y1 += 1;
        }
        BoxI::new(x0, y0, x1, y1)
    }

    pub fn next_box_d(&mut self) -> BoxD {
        let x0 = self.next_x_coord_d();
        let y0 = self.next_y_coord_d();
        let x1 = self.next_x_coord_d();
        let y1 = self.next_y_coord_d();
        BoxD::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }

    pub fn next_rect_i(&mut self) -> RectI {
        self.next_box_i().into()
    }

    pub fn next_rect_d(&mut self) -> RectD {
        self.next_box_d().into()
    }

    pub fn next_triangle(&mut self) -> [PointD; 3] {
        [self.next_point_d(), self.next_point_d(), self.next_point_d()]
    }
}
