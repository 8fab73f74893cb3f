// viewport.rs - Screen-space geometry
//
// Flower targets are stored normalized to [0, 1]; everything that moves
// is simulated in pixels. Conversions always use the current size so a
// resize takes effect on the next tick.

use rand::Rng;

/// Size used when the host reports a zero or garbage viewport.
pub const FALLBACK_EXTENT: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub w: f32,
    pub h: f32,
}

impl Viewport {
    pub fn new(w: f32, h: f32) -> Self {
        Self { w: sane_extent(w), h: sane_extent(h) }
    }

    /// Normalized -> pixel coordinates
    #[inline]
    pub fn to_pixels(&self, nx: f32, ny: f32) -> (f32, f32) {
        (nx * self.w, ny * self.h)
    }

    /// Uniform point inside the viewport
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> (f32, f32) {
        (rng.gen_range(0.0..self.w), rng.gen_range(0.0..self.h))
    }

    /// Resting line for ground particles
    #[inline]
    pub fn ground_line(&self, inset: f32) -> f32 {
        self.h - inset
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32, margin: f32) -> bool {
        x >= -margin && x <= self.w + margin && y >= -margin && y <= self.h + margin
    }
}

#[inline]
fn sane_extent(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 { v } else { FALLBACK_EXTENT }
}

/// Toroidal wrap: leaving one edge by more than `margin` re-enters on the
/// opposite edge, `margin` outside it.
#[inline]
pub fn wrap(v: f32, extent: f32, margin: f32) -> f32 {
    if v < -margin {
        extent + margin
    } else if v > extent + margin {
        -margin
    } else {
        v
    }
}
