// config.rs - Tunable constants for critters, rain and ground
//
// Defaults are tuned for a 60 Hz display; all per-frame quantities are
// in pixels (or degrees) per frame. Partial JSON overrides only the keys
// it names.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GardenError, Result};

/// Half-open interval sampled uniformly.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample in [min, max). Degenerate spans return `min`.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }

    fn check(&self, field: &'static str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.max < self.min {
            return Err(GardenError::InvalidValue {
                field,
                reason: format!("expected min <= max, got {}..{}", self.min, self.max),
            });
        }
        Ok(())
    }
}

// ============================================================================
// CRITTERS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CritterConfig {
    /// Pool size created on every rebuild
    pub count: usize,
    /// Cruise speed limit (px/frame) while seeking or perching
    pub max_speed: f32,
    /// Fraction of the velocity error corrected per frame while seeking
    pub steering_force: f32,
    /// Flee speed limit as a multiple of `max_speed`
    pub flee_speed_factor: f32,
    pub scare_radius: f32,
    /// Distance at which a seeking critter lands on its flower
    pub capture_radius: f32,
    /// How far past the viewport edge a critter may go before wrapping
    pub wrap_margin: f32,
    pub wander_force: f32,
    /// Max random-walk step of the wander heading (radians/frame)
    pub wander_turn: f32,
    pub flee_push: f32,
    pub flee_impulse: Span,
    pub flee_frames: Span,
    pub perch_frames: Span,
    pub perch_spring: f32,
    pub perch_jitter: f32,
    pub perch_friction: f32,
    pub pollinator_scale: Span,
    pub flicker_frames: Span,
    pub mode_check_interval_ms: f64,
}

impl Default for CritterConfig {
    fn default() -> Self {
        Self {
            count: 10,
            max_speed: 1.5,
            steering_force: 0.03,
            flee_speed_factor: 4.0,
            scare_radius: 90.0,
            capture_radius: 10.0,
            wrap_margin: 20.0,
            wander_force: 0.1,
            wander_turn: 0.5,
            flee_push: 0.3,
            flee_impulse: Span::new(5.0, 8.0),
            flee_frames: Span::new(40.0, 60.0),
            perch_frames: Span::new(100.0, 300.0),
            perch_spring: 0.1,
            perch_jitter: 0.5,
            perch_friction: 0.8,
            pollinator_scale: Span::new(0.6, 1.2),
            flicker_frames: Span::new(6.0, 18.0),
            mode_check_interval_ms: 300_000.0,
        }
    }
}

impl CritterConfig {
    /// Speed cap for the current behavior.
    #[inline]
    pub fn speed_limit(&self, fleeing: bool) -> f32 {
        if fleeing {
            self.max_speed * self.flee_speed_factor
        } else {
            self.max_speed
        }
    }
}

// ============================================================================
// RAIN
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainConfig {
    /// Particles scheduled by `start()`
    pub batch_size: usize,
    /// Delay between staggered spawns of the start batch
    pub stagger_ms: f64,
    /// Delay between `stop()` and clearing the in-flight particles
    pub fade_ms: f64,
    pub spawn_y: f32,
    pub fall_speed: Span,
    pub size: Span,
    /// Sway amplitude is sampled in [-sway, sway)
    pub sway: f32,
    pub sway_rate: f32,
    /// Rotation speed is sampled in [-spin, spin) degrees/frame
    pub spin: f32,
    /// Landing line sits this far above the bottom edge...
    pub floor_offset: f32,
    /// ...lowered by a per-particle jitter in [0, floor_jitter)
    pub floor_jitter: f32,
    pub opacity: f32,
    pub max_categories: usize,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            batch_size: 30,
            stagger_ms: 100.0,
            fade_ms: 1000.0,
            spawn_y: -60.0,
            fall_speed: Span::new(1.0, 5.0),
            size: Span::new(30.0, 60.0),
            sway: 20.0,
            sway_rate: 0.02,
            spin: 2.0,
            floor_offset: 40.0,
            floor_jitter: 20.0,
            opacity: 0.8,
            max_categories: 2,
        }
    }
}

// ============================================================================
// GROUND
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Hard cap on settled particles; oldest are evicted first
    pub capacity: usize,
    pub friction: f32,
    pub gravity: f32,
    /// Fraction of vertical speed kept (and inverted) on hitting the ground
    pub bounce: f32,
    /// Ground line distance from the bottom edge
    pub ground_inset: f32,
    pub land_inset: f32,
    pub land_jitter: f32,
    pub decay: Span,
    pub mass: Span,
    pub interaction_radius: f32,
    pub push_strength: f32,
    /// Pointer speed (px between samples) above which a push also lifts
    pub gust_speed: f32,
    pub gust_strength: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            capacity: 150,
            friction: 0.92,
            gravity: 0.2,
            bounce: 0.5,
            ground_inset: 10.0,
            land_inset: 20.0,
            land_jitter: 30.0,
            decay: Span::new(0.001, 0.003),
            mass: Span::new(1.0, 2.0),
            interaction_radius: 100.0,
            push_strength: 2.0,
            gust_speed: 10.0,
            gust_strength: 2.0,
        }
    }
}

// ============================================================================
// ALL TOGETHER
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    pub critters: CritterConfig,
    pub rain: RainConfig,
    pub ground: GroundConfig,
}

impl GardenConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.critters;
        positive("critters.max_speed", c.max_speed)?;
        positive("critters.flee_speed_factor", c.flee_speed_factor)?;
        positive("critters.mode_check_interval_ms", c.mode_check_interval_ms as f32)?;
        c.flee_impulse.check("critters.flee_impulse")?;
        c.flee_frames.check("critters.flee_frames")?;
        c.perch_frames.check("critters.perch_frames")?;
        c.pollinator_scale.check("critters.pollinator_scale")?;
        c.flicker_frames.check("critters.flicker_frames")?;

        let r = &self.rain;
        r.fall_speed.check("rain.fall_speed")?;
        r.size.check("rain.size")?;
        positive("rain.fall_speed.min", r.fall_speed.min)?;
        if r.max_categories == 0 {
            return Err(GardenError::InvalidValue {
                field: "rain.max_categories",
                reason: "must allow at least one category".into(),
            });
        }

        let g = &self.ground;
        if g.capacity == 0 {
            return Err(GardenError::InvalidValue {
                field: "ground.capacity",
                reason: "must hold at least one particle".into(),
            });
        }
        g.decay.check("ground.decay")?;
        g.mass.check("ground.mass")?;
        positive("ground.decay.min", g.decay.min)?;
        Ok(())
    }
}

fn positive(field: &'static str, v: f32) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(GardenError::InvalidValue { field, reason: format!("expected > 0, got {v}") })
    }
}
