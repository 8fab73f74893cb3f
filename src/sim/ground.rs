// ground.rs - Landed particles piling up at the bottom of the screen
//
// A FIFO-bounded pool with a little rigid-body-ish physics: gravity
// while airborne, friction, a soft bounce on the ground line, hard walls
// and a push away from the pointer. Particles fade out as `life` decays
// and the surface is redrawn from scratch every tick.

use std::collections::VecDeque;

use rand::Rng;

use super::fall::FallingParticle;
use crate::assets::AssetId;
use crate::config::GroundConfig;
use crate::input::PointerState;
use crate::render::{InstanceEncoder, Sprite, SpriteKind, Surface};
use crate::world::Viewport;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundParticle {
    /// Center (px)
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Degrees
    pub rotation: f32,
    pub size: f32,
    pub friction: f32,
    pub mass: f32,
    /// Opacity; the particle is gone once this reaches 0
    pub life: f32,
    pub decay: f32,
    pub asset: AssetId,
}

impl GroundParticle {
    pub fn sprite(&self) -> Sprite {
        Sprite {
            kind: SpriteKind::Asset { id: self.asset, size: self.size },
            x: self.x,
            y: self.y,
            rotation: self.rotation,
            scale_x: 1.0,
            scale_y: 1.0,
            opacity: self.life,
        }
    }
}

pub struct GroundField {
    particles: VecDeque<GroundParticle>,
    surface: InstanceEncoder,
    config: GroundConfig,
}

impl GroundField {
    pub fn new(config: GroundConfig) -> Self {
        Self {
            particles: VecDeque::with_capacity(config.capacity + 1),
            surface: InstanceEncoder::new(),
            config,
        }
    }

    /// Settle a falling particle near the bottom edge. Evicts and returns
    /// the oldest particle when the pool overflows.
    pub fn land<R: Rng + ?Sized>(
        &mut self,
        from: &FallingParticle,
        viewport: Viewport,
        rng: &mut R,
    ) -> Option<GroundParticle> {
        let cfg = &self.config;
        let jitter = if cfg.land_jitter > 0.0 { rng.gen_range(0.0..cfg.land_jitter) } else { 0.0 };
        let particle = GroundParticle {
            x: from.visible_x() + from.size * 0.5,
            y: viewport.h - cfg.land_inset - jitter,
            vx: 0.0,
            vy: 0.0,
            rotation: from.rotation,
            size: from.size,
            friction: cfg.friction,
            mass: cfg.mass.sample(rng),
            life: 1.0,
            decay: cfg.decay.sample(rng),
            asset: from.asset,
        };
        self.insert(particle)
    }

    /// Add a ground particle, enforcing the capacity on the spot.
    pub fn insert(&mut self, particle: GroundParticle) -> Option<GroundParticle> {
        self.particles.push_back(particle);
        if self.particles.len() > self.config.capacity {
            self.particles.pop_front()
        } else {
            None
        }
    }

    /// One frame of physics, decay and redraw.
    pub fn tick(&mut self, pointer: &PointerState, viewport: Viewport) {
        let Self { particles, surface, config: cfg } = self;

        surface.clear();
        let ground = viewport.ground_line(cfg.ground_inset);
        let radius = cfg.interaction_radius;

        particles.retain_mut(|p| {
            let dx = p.x - pointer.x;
            let dy = p.y - pointer.y;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < radius {
                let force = (radius - dist) / radius;
                let angle = dy.atan2(dx);
                p.vx += angle.cos() * force * cfg.push_strength;
                p.vy += angle.sin() * force * cfg.push_strength;
                p.life = 1.0;
                if pointer.speed > cfg.gust_speed {
                    p.vy -= force * cfg.gust_strength;
                }
            }

            p.life -= p.decay;
            if p.life <= 0.0 {
                return false;
            }

            p.x += p.vx;
            p.y += p.vy;

            let rest = ground - p.size / 2.0;
            if p.y < rest {
                p.vy += cfg.gravity;
            }

            p.vx *= p.friction;
            p.vy *= p.friction;

            if p.y > rest {
                p.y = rest;
                p.vy *= -cfg.bounce;
            }
            if p.x < 0.0 {
                p.x = 0.0;
                p.vx = -p.vx;
            }
            if p.x > viewport.w {
                p.x = viewport.w;
                p.vx = -p.vx;
            }

            if surface.asset_ready(p.asset) {
                surface.draw(&p.sprite());
            }
            p.rotation += p.vx;
            true
        });
    }

    /// Empty the pool and blank the surface.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.surface.clear();
    }

    /// Redraw the current pile into an external surface.
    pub fn draw_into(&self, surface: &mut dyn Surface) {
        for p in &self.particles {
            if surface.asset_ready(p.asset) {
                surface.draw(&p.sprite());
            }
        }
    }

    pub fn surface(&self) -> &InstanceEncoder {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut InstanceEncoder {
        &mut self.surface
    }

    pub fn particles(&self) -> impl ExactSizeIterator<Item = &GroundParticle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }
}
