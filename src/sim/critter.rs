// critter.rs - One ambient flier
//
// Each critter is a three-state machine (seeking, perching, fleeing)
// driven by steering forces. One call to `step` is one display frame.

use std::f32::consts::TAU;

use rand::Rng;

use super::target::{FlowerPoint, TargetSource, select_target};
use super::CritterMode;
use crate::config::CritterConfig;
use crate::render::{Sprite, SpriteKind};
use crate::world::{Viewport, wrap};

// Velocity kept when landing on a flower
const LANDING_DAMPING: f32 = 0.1;
const POLLINATOR_OPACITY: f32 = 0.9;
const GLOW_MIN_OPACITY: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CritterState {
    Seeking,
    /// Dwelling on the current target for `timer` more frames
    Perching { timer: f32 },
    /// Escaping from `source` (px) for `timer` more frames
    Fleeing { timer: f32, source: (f32, f32) },
}

/// Everything a critter reads from the outside during a step.
pub struct Surroundings<'a> {
    pub viewport: Viewport,
    pub mode: CritterMode,
    pub config: &'a CritterConfig,
    pub targets: Option<&'a dyn TargetSource>,
}

impl Surroundings<'_> {
    pub fn pick_target<R: Rng + ?Sized>(&self, rng: &mut R) -> FlowerPoint {
        let flowers = self.targets.map(|t| t.flowers()).unwrap_or_default();
        select_target(&flowers, self.mode, rng)
    }
}

#[derive(Clone, Debug)]
pub struct Critter {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub wander_angle: f32,
    pub state: CritterState,
    pub target: Option<FlowerPoint>,
    /// Visual size multiplier, fixed at creation
    pub scale: f32,
    pub opacity: f32,
    warm: bool,
    flicker: f32,
}

impl Critter {
    pub fn spawn<R: Rng + ?Sized>(
        viewport: Viewport,
        mode: CritterMode,
        config: &CritterConfig,
        rng: &mut R,
    ) -> Self {
        let (x, y) = viewport.random_point(rng);
        let (scale, opacity) = match mode {
            CritterMode::Pollinators => (config.pollinator_scale.sample(rng), POLLINATOR_OPACITY),
            CritterMode::Fireflies => (1.0, rng.gen_range(GLOW_MIN_OPACITY..1.0)),
        };
        Self {
            x,
            y,
            vx: rng.gen_range(-1.0..1.0),
            vy: rng.gen_range(-1.0..1.0),
            wander_angle: rng.gen_range(0.0..TAU),
            state: CritterState::Seeking,
            target: None,
            scale,
            opacity,
            warm: rng.gen_bool(0.5),
            flicker: config.flicker_frames.sample(rng),
        }
    }

    pub fn flee_timer(&self) -> Option<f32> {
        match self.state {
            CritterState::Fleeing { timer, .. } => Some(timer),
            _ => None,
        }
    }

    pub fn perch_timer(&self) -> Option<f32> {
        match self.state {
            CritterState::Perching { timer } => Some(timer),
            _ => None,
        }
    }

    #[inline]
    pub fn is_fleeing(&self) -> bool {
        matches!(self.state, CritterState::Fleeing { .. })
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    /// -1 when heading right (the glyph faces left by default), else 1
    #[inline]
    pub fn facing(&self) -> f32 {
        if self.vx > 0.0 { -1.0 } else { 1.0 }
    }

    /// Startle the critter if (x, y) is within the scare radius.
    pub fn scare<R: Rng + ?Sized>(
        &mut self,
        x: f32,
        y: f32,
        config: &CritterConfig,
        rng: &mut R,
    ) -> bool {
        let dx = self.x - x;
        let dy = self.y - y;
        if dx * dx + dy * dy >= config.scare_radius * config.scare_radius {
            return false;
        }

        let angle = dy.atan2(dx);
        let force = config.flee_impulse.sample(rng);
        self.vx = angle.cos() * force;
        self.vy = angle.sin() * force;
        self.state = CritterState::Fleeing {
            timer: config.flee_frames.sample(rng),
            source: (x, y),
        };
        self.target = None;
        true
    }

    pub fn step<R: Rng + ?Sized>(&mut self, env: &Surroundings<'_>, rng: &mut R) {
        let cfg = env.config;

        self.transition(env, rng);

        match self.state {
            CritterState::Fleeing { source, .. } => {
                let dx = self.x - source.0;
                let dy = self.y - source.1;
                let dist = (dx * dx + dy * dy).sqrt();
                let dist = if dist > 0.0 { dist } else { 1.0 };
                self.vx += dx / dist * cfg.flee_push;
                self.vy += dy / dist * cfg.flee_push;
            }
            CritterState::Seeking => {
                let (sx, sy) = self.seek(env);
                let (wx, wy) = self.wander(cfg, rng);
                self.vx += sx + wx;
                self.vy += sy + wy;
            }
            CritterState::Perching { .. } => {
                if let Some((tx, ty)) = self.target_px(env.viewport) {
                    self.vx += (tx - self.x) * cfg.perch_spring;
                    self.vy += (ty - self.y) * cfg.perch_spring;
                }
                self.vx += rng.gen_range(-0.5..0.5) * cfg.perch_jitter;
                self.vy += rng.gen_range(-0.5..0.5) * cfg.perch_jitter;
                self.vx *= cfg.perch_friction;
                self.vy *= cfg.perch_friction;
            }
        }

        let limit = cfg.speed_limit(self.is_fleeing());
        let speed = self.speed();
        if speed > limit && speed > 0.0 {
            self.vx = self.vx / speed * limit;
            self.vy = self.vy / speed * limit;
        }

        self.x += self.vx;
        self.y += self.vy;

        if !self.x.is_finite() || !self.y.is_finite() || !self.vx.is_finite() || !self.vy.is_finite() {
            log::debug!("critter left the number line, respawning");
            self.respawn(env.viewport, rng);
        }

        let vp = env.viewport;
        self.x = wrap(self.x, vp.w, cfg.wrap_margin);
        self.y = wrap(self.y, vp.h, cfg.wrap_margin);

        if env.mode == CritterMode::Fireflies {
            self.flicker -= 1.0;
            if self.flicker <= 0.0 {
                self.opacity = rng.gen_range(GLOW_MIN_OPACITY..1.0);
                self.flicker = cfg.flicker_frames.sample(rng);
            }
        }
    }

    fn transition<R: Rng + ?Sized>(&mut self, env: &Surroundings<'_>, rng: &mut R) {
        match self.state {
            CritterState::Fleeing { timer, source } => {
                let timer = timer - 1.0;
                self.state = if timer <= 0.0 {
                    CritterState::Seeking
                } else {
                    CritterState::Fleeing { timer, source }
                };
            }
            CritterState::Seeking => {
                self.target.get_or_insert_with(|| env.pick_target(rng));
                let Some((tx, ty)) = self.target_px(env.viewport) else { return };
                let dx = tx - self.x;
                let dy = ty - self.y;
                let r = env.config.capture_radius;
                if dx * dx + dy * dy < r * r {
                    self.x = tx;
                    self.y = ty;
                    self.vx *= LANDING_DAMPING;
                    self.vy *= LANDING_DAMPING;
                    self.state = CritterState::Perching { timer: env.config.perch_frames.sample(rng) };
                }
            }
            CritterState::Perching { timer } => {
                let timer = timer - 1.0;
                if timer <= 0.0 {
                    self.state = CritterState::Seeking;
                    self.target = Some(env.pick_target(rng));
                } else {
                    self.state = CritterState::Perching { timer };
                }
            }
        }
    }

    // Target in pixels; malformed targets read as screen center
    fn target_px(&self, viewport: Viewport) -> Option<(f32, f32)> {
        let t = self.target?;
        let t = if t.is_valid() { t } else { FlowerPoint::CENTER };
        Some(viewport.to_pixels(t.x, t.y))
    }

    fn seek(&self, env: &Surroundings<'_>) -> (f32, f32) {
        let Some((tx, ty)) = self.target_px(env.viewport) else { return (0.0, 0.0) };
        let dx = tx - self.x;
        let dy = ty - self.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist == 0.0 {
            return (0.0, 0.0);
        }
        let cfg = env.config;
        (
            (dx / dist * cfg.max_speed - self.vx) * cfg.steering_force,
            (dy / dist * cfg.max_speed - self.vy) * cfg.steering_force,
        )
    }

    // Random walk on the heading, not on the force
    fn wander<R: Rng + ?Sized>(&mut self, cfg: &CritterConfig, rng: &mut R) -> (f32, f32) {
        self.wander_angle += rng.gen_range(-0.5..0.5) * cfg.wander_turn;
        (
            self.wander_angle.cos() * cfg.wander_force,
            self.wander_angle.sin() * cfg.wander_force,
        )
    }

    fn respawn<R: Rng + ?Sized>(&mut self, viewport: Viewport, rng: &mut R) {
        let (x, y) = viewport.random_point(rng);
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
    }

    pub fn sprite(&self, mode: CritterMode) -> Sprite {
        let kind = match mode {
            CritterMode::Pollinators => SpriteKind::Pollinator,
            CritterMode::Fireflies => SpriteKind::Firefly { warm: self.warm },
        };
        Sprite {
            kind,
            x: self.x,
            y: self.y,
            rotation: 0.0,
            scale_x: self.scale * self.facing(),
            scale_y: self.scale,
            opacity: self.opacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn env<'a>(config: &'a CritterConfig, targets: Option<&'a dyn TargetSource>) -> Surroundings<'a> {
        Surroundings {
            viewport: Viewport::new(800.0, 600.0),
            mode: CritterMode::Pollinators,
            config,
            targets,
        }
    }

    fn critter_at(x: f32, y: f32) -> Critter {
        let config = CritterConfig::default();
        let mut rng = SmallRng::seed_from_u64(0);
        let mut c = Critter::spawn(Viewport::new(800.0, 600.0), CritterMode::Pollinators, &config, &mut rng);
        c.x = x;
        c.y = y;
        c.vx = 0.0;
        c.vy = 0.0;
        c
    }

    #[test]
    fn scare_pushes_away_from_pointer() {
        let config = CritterConfig::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut c = critter_at(100.0, 100.0);

        assert!(c.scare(100.0, 160.0, &config, &mut rng));
        let timer = c.flee_timer().unwrap();
        assert!((40.0..=60.0).contains(&timer));
        assert!(c.vy < 0.0);
        assert!(c.target.is_none());

        c.step(&env(&config, None), &mut rng);
        assert!(c.is_fleeing());
        assert!(c.vy < 0.0);
        assert_eq!(c.flee_timer().unwrap(), timer - 1.0);
    }

    #[test]
    fn scare_ignores_far_critters() {
        let config = CritterConfig::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut c = critter_at(100.0, 100.0);
        assert!(!c.scare(100.0, 190.0, &config, &mut rng));
        assert_eq!(c.state, CritterState::Seeking);
    }

    #[test]
    fn flee_timer_runs_down_to_seeking() {
        let config = CritterConfig::default();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut c = critter_at(400.0, 300.0);
        c.state = CritterState::Fleeing { timer: 3.0, source: (400.0, 320.0) };

        let mut last = 3.0;
        for _ in 0..2 {
            c.step(&env(&config, None), &mut rng);
            let t = c.flee_timer().unwrap();
            assert!(t < last);
            last = t;
        }
        c.step(&env(&config, None), &mut rng);
        assert_eq!(c.state, CritterState::Seeking);
    }

    #[test]
    fn lands_when_close_to_target() {
        let config = CritterConfig::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let flowers = vec![FlowerPoint::new(0.5, 0.5)];
        let source: &dyn TargetSource = &flowers;
        let mut c = critter_at(405.0, 300.0);

        c.step(&env(&config, Some(source)), &mut rng);
        let dwell = c.perch_timer().expect("should be perching");
        assert!((100.0..=300.0).contains(&dwell));
        assert_eq!(c.target, Some(FlowerPoint::new(0.5, 0.5)));
    }

    #[test]
    fn perch_expiry_picks_new_target() {
        let config = CritterConfig::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let mut c = critter_at(400.0, 300.0);
        c.target = Some(FlowerPoint::new(0.5, 0.5));
        c.state = CritterState::Perching { timer: 1.0 };

        c.step(&env(&config, None), &mut rng);
        assert_eq!(c.state, CritterState::Seeking);
        let t = c.target.unwrap();
        assert!((0.3..0.7).contains(&t.x) && (0.3..0.7).contains(&t.y));
    }

    #[test]
    fn malformed_target_reads_as_center() {
        let config = CritterConfig::default();
        let mut rng = SmallRng::seed_from_u64(4);
        let mut c = critter_at(402.0, 301.0);
        c.target = Some(FlowerPoint::new(f32::NAN, 0.1));

        c.step(&env(&config, None), &mut rng);
        assert!(c.perch_timer().is_some());
        assert!(c.x.is_finite() && c.y.is_finite());
    }

    #[test]
    fn nan_position_respawns_inside_viewport() {
        let config = CritterConfig::default();
        let mut rng = SmallRng::seed_from_u64(6);
        let mut c = critter_at(f32::NAN, 10.0);

        c.step(&env(&config, None), &mut rng);
        assert!((0.0..800.0).contains(&c.x));
        assert!((0.0..600.0).contains(&c.y));
        assert_eq!((c.vx, c.vy), (0.0, 0.0));
    }

    #[test]
    fn sprite_mirrors_when_heading_right() {
        let mut c = critter_at(10.0, 10.0);
        c.scale = 0.8;
        c.vx = 1.0;
        let s = c.sprite(CritterMode::Pollinators);
        assert_eq!((s.scale_x, s.scale_y), (-0.8, 0.8));
        c.vx = -1.0;
        assert_eq!(c.sprite(CritterMode::Pollinators).scale_x, 0.8);
    }
}
