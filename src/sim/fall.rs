// fall.rs - Rain particles in flight
//
// Each particle drops at its own speed, sways on a sine and spins.
// Crossing its landing line removes it from the set; the caller turns it
// into a ground particle.

use std::f32::consts::TAU;

use rand::Rng;

use crate::assets::AssetId;
use crate::config::RainConfig;
use crate::render::{Sprite, SpriteKind, Surface};
use crate::world::Viewport;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallingParticle {
    /// Left edge of the unswayed path (px)
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    /// Degrees
    pub rotation: f32,
    /// Degrees per frame
    pub rotation_speed: f32,
    pub sway: f32,
    pub sway_phase: f32,
    pub size: f32,
    /// Lands once y passes `h - floor_offset + floor_jitter`
    pub floor_jitter: f32,
    pub asset: AssetId,
}

impl FallingParticle {
    pub fn spawn<R: Rng + ?Sized>(
        asset: AssetId,
        viewport: Viewport,
        config: &RainConfig,
        rng: &mut R,
    ) -> Self {
        Self {
            x: rng.gen_range(0.0..viewport.w),
            y: config.spawn_y,
            speed: config.fall_speed.sample(rng),
            rotation: rng.gen_range(0.0..360.0),
            rotation_speed: signed(config.spin, rng),
            sway: signed(config.sway, rng),
            sway_phase: rng.gen_range(0.0..TAU),
            size: config.size.sample(rng),
            floor_jitter: if config.floor_jitter > 0.0 {
                rng.gen_range(0.0..config.floor_jitter)
            } else {
                0.0
            },
            asset,
        }
    }

    #[inline]
    pub fn sway_offset(&self) -> f32 {
        self.sway_phase.sin() * self.sway
    }

    /// Where the particle is actually seen, horizontally
    #[inline]
    pub fn visible_x(&self) -> f32 {
        self.x + self.sway_offset()
    }

    #[inline]
    pub fn floor_level(&self, viewport: Viewport, config: &RainConfig) -> f32 {
        viewport.h - config.floor_offset + self.floor_jitter
    }

    pub fn sprite(&self, opacity: f32) -> Sprite {
        let half = self.size * 0.5;
        Sprite {
            kind: SpriteKind::Asset { id: self.asset, size: self.size },
            x: self.visible_x() + half,
            y: self.y + half,
            rotation: self.rotation,
            scale_x: 1.0,
            scale_y: 1.0,
            opacity,
        }
    }
}

#[inline]
fn signed<R: Rng + ?Sized>(amplitude: f32, rng: &mut R) -> f32 {
    if amplitude > 0.0 { rng.gen_range(-amplitude..amplitude) } else { 0.0 }
}

#[derive(Debug, Default)]
pub struct FallingParticles {
    items: Vec<FallingParticle>,
}

impl FallingParticles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, particle: FallingParticle) {
        self.items.push(particle);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[FallingParticle] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [FallingParticle] {
        &mut self.items
    }

    /// Advance every particle one frame. Particles past their landing
    /// line are moved into `landed`, in order.
    pub fn update(&mut self, viewport: Viewport, config: &RainConfig, landed: &mut Vec<FallingParticle>) {
        let mut write = 0;

        for read in 0..self.items.len() {
            let mut p = self.items[read];
            p.y += p.speed;
            p.sway_phase += config.sway_rate;
            p.rotation += p.rotation_speed;

            if p.y > p.floor_level(viewport, config) {
                landed.push(p);
                continue;
            }

            self.items[write] = p;
            write += 1;
        }

        self.items.truncate(write);
    }

    pub fn draw_into(&self, surface: &mut dyn Surface, opacity: f32) {
        for p in &self.items {
            if surface.asset_ready(p.asset) {
                surface.draw(&p.sprite(opacity));
            }
        }
    }
}
