// target.rs - Where critters want to go
//
// Flowers come from the host as normalized points. The list is re-read
// on every selection, may change between calls and may contain garbage.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::CritterMode;

// Density-biased selection
const CANDIDATES: usize = 5;
const DENSITY_SAMPLES: usize = 20;
const DENSITY_RADIUS: f32 = 0.15;
const MIN_FLOWERS_FOR_DENSITY: usize = 5;

// Fallback region when there are no flowers at all
const FALLBACK_MIN: f32 = 0.3;
const FALLBACK_MAX: f32 = 0.7;

/// A point in normalized [0, 1] x [0, 1] screen space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowerPoint {
    pub x: f32,
    pub y: f32,
}

impl FlowerPoint {
    pub const CENTER: FlowerPoint = FlowerPoint { x: 0.5, y: 0.5 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    fn dist_sq(&self, other: &FlowerPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Read-only view of the flower bed.
pub trait TargetSource {
    /// Current flower positions. Called fresh on every target selection.
    fn flowers(&self) -> Vec<FlowerPoint>;
}

impl TargetSource for Vec<FlowerPoint> {
    fn flowers(&self) -> Vec<FlowerPoint> {
        self.clone()
    }
}

/// Flower list shared with a host that keeps editing it.
#[derive(Clone, Debug, Default)]
pub struct SharedFlowers(pub Rc<RefCell<Vec<FlowerPoint>>>);

impl SharedFlowers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, flowers: Vec<FlowerPoint>) {
        *self.0.borrow_mut() = flowers;
    }
}

impl TargetSource for SharedFlowers {
    fn flowers(&self) -> Vec<FlowerPoint> {
        self.0.borrow().clone()
    }
}

/// Pick the next flower for a critter.
///
/// - no flowers: random point in the central fallback square
/// - night, or fewer than 5 flowers: uniform pick
/// - otherwise: best of 5 random candidates by sampled neighbour count
///
/// Never returns a non-finite point.
pub fn select_target<R: Rng + ?Sized>(
    flowers: &[FlowerPoint],
    mode: CritterMode,
    rng: &mut R,
) -> FlowerPoint {
    if flowers.is_empty() {
        return FlowerPoint::new(
            rng.gen_range(FALLBACK_MIN..FALLBACK_MAX),
            rng.gen_range(FALLBACK_MIN..FALLBACK_MAX),
        );
    }

    if mode == CritterMode::Fireflies || flowers.len() < MIN_FLOWERS_FOR_DENSITY {
        return uniform_pick(flowers, rng);
    }

    let radius_sq = DENSITY_RADIUS * DENSITY_RADIUS;
    let samples = flowers.len().min(DENSITY_SAMPLES);
    let mut best: Option<FlowerPoint> = None;
    let mut max_density: i32 = -1;

    for _ in 0..CANDIDATES {
        let candidate = flowers[rng.gen_range(0..flowers.len())];
        if !candidate.is_valid() {
            continue;
        }

        let mut density = 0;
        for _ in 0..samples {
            let other = &flowers[rng.gen_range(0..flowers.len())];
            if other.is_valid() && candidate.dist_sq(other) < radius_sq {
                density += 1;
            }
        }

        if density > max_density {
            max_density = density;
            best = Some(candidate);
        }
    }

    best.unwrap_or_else(|| uniform_pick(flowers, rng))
}

fn uniform_pick<R: Rng + ?Sized>(flowers: &[FlowerPoint], rng: &mut R) -> FlowerPoint {
    let flower = flowers[rng.gen_range(0..flowers.len())];
    if flower.is_valid() { flower } else { FlowerPoint::CENTER }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn empty_bed_uses_central_region() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..200 {
            let t = select_target(&[], CritterMode::Pollinators, &mut rng);
            assert!((FALLBACK_MIN..FALLBACK_MAX).contains(&t.x));
            assert!((FALLBACK_MIN..FALLBACK_MAX).contains(&t.y));
        }
    }

    #[test]
    fn malformed_entries_never_leak() {
        let mut rng = SmallRng::seed_from_u64(2);
        let flowers = vec![
            FlowerPoint::new(f32::NAN, 0.2),
            FlowerPoint::new(0.1, f32::INFINITY),
            FlowerPoint::new(f32::NAN, f32::NAN),
            FlowerPoint::new(0.4, 0.4),
            FlowerPoint::new(f32::NEG_INFINITY, 0.9),
            FlowerPoint::new(0.6, 0.7),
        ];
        for mode in [CritterMode::Pollinators, CritterMode::Fireflies] {
            for _ in 0..500 {
                assert!(select_target(&flowers, mode, &mut rng).is_valid());
            }
            for _ in 0..100 {
                assert!(select_target(&flowers[..3], mode, &mut rng).is_valid());
            }
        }
    }

    #[test]
    fn all_invalid_falls_back_to_center() {
        let mut rng = SmallRng::seed_from_u64(3);
        let flowers = vec![FlowerPoint::new(f32::NAN, f32::NAN); 8];
        let t = select_target(&flowers, CritterMode::Pollinators, &mut rng);
        assert_eq!(t, FlowerPoint::CENTER);
    }

    #[test]
    fn shared_flowers_are_read_fresh() {
        let shared = SharedFlowers::new();
        let source: Box<dyn TargetSource> = Box::new(shared.clone());
        assert!(source.flowers().is_empty());
        shared.replace(vec![FlowerPoint::new(0.2, 0.3)]);
        assert_eq!(source.flowers(), vec![FlowerPoint::new(0.2, 0.3)]);
    }
}
