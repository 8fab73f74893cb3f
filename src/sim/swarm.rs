// swarm.rs - The critter pool
//
// Owns every critter, the day/night mode and the read-only link to the
// flower bed. The host calls `tick` once per frame while `is_running`.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::critter::{Critter, Surroundings};
use super::target::TargetSource;
use crate::config::CritterConfig;
use crate::render::Surface;
use crate::world::{Viewport, is_night_hour};

/// Which critters fly: pollinators by day, glowing fireflies by night.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CritterMode {
    Pollinators,
    Fireflies,
}

impl CritterMode {
    pub fn from_night(is_night: bool) -> Self {
        if is_night { CritterMode::Fireflies } else { CritterMode::Pollinators }
    }

    pub fn name(self) -> &'static str {
        match self {
            CritterMode::Pollinators => "pollinators",
            CritterMode::Fireflies => "fireflies",
        }
    }
}

pub struct CritterSwarm {
    critters: Vec<Critter>,
    mode: Option<CritterMode>,
    viewport: Viewport,
    config: CritterConfig,
    targets: Option<Box<dyn TargetSource>>,
    rng: SmallRng,
    running: bool,
    // Bumped on every rebuild so callers can tell pools apart
    generation: u64,
    since_clock_check: f64,
}

impl CritterSwarm {
    /// Empty swarm; nothing flies until the first `set_mode`.
    pub fn new(viewport: Viewport, config: CritterConfig, seed: u64) -> Self {
        Self {
            critters: Vec::with_capacity(config.count),
            mode: None,
            viewport,
            config,
            targets: None,
            rng: SmallRng::seed_from_u64(seed),
            running: false,
            generation: 0,
            since_clock_check: 0.0,
        }
    }

    /// Create, pick the mode from `hour` and start flying.
    pub fn with_clock(viewport: Viewport, config: CritterConfig, seed: u64, hour: u32) -> Self {
        let mut swarm = Self::new(viewport, config, seed);
        swarm.set_mode(is_night_hour(hour));
        swarm.start();
        swarm
    }

    pub fn set_target_provider(&mut self, source: Option<Box<dyn TargetSource>>) {
        self.targets = source;
    }

    /// Switch day/night. Rebuilds the pool when the mode changes, or when
    /// it is unchanged but the pool is empty. Returns whether it rebuilt.
    pub fn set_mode(&mut self, is_night: bool) -> bool {
        let mode = CritterMode::from_night(is_night);
        if self.mode != Some(mode) {
            log::info!("critters switching to {}", mode.name());
            self.rebuild_pool(mode);
            true
        } else if self.critters.is_empty() {
            log::info!("no critters around, creating {}", mode.name());
            self.rebuild_pool(mode);
            true
        } else {
            false
        }
    }

    /// Drop every critter and spawn a fresh pool for `mode`.
    pub fn rebuild_pool(&mut self, mode: CritterMode) {
        self.mode = Some(mode);
        self.critters.clear();
        for _ in 0..self.config.count {
            let critter = Critter::spawn(self.viewport, mode, &self.config, &mut self.rng);
            self.critters.push(critter);
        }
        self.generation += 1;
        log::info!("{} {} created", self.critters.len(), mode.name());
    }

    /// Feed elapsed wall time; re-checks the clock every configured interval.
    pub fn poll_clock(&mut self, dt_ms: f64, hour: u32) -> bool {
        self.since_clock_check += dt_ms;
        if self.since_clock_check < self.config.mode_check_interval_ms {
            return false;
        }
        self.since_clock_check = 0.0;
        self.set_mode(is_night_hour(hour))
    }

    pub fn tick(&mut self) {
        let Some(mode) = self.mode else { return };
        let env = Surroundings {
            viewport: self.viewport,
            mode,
            config: &self.config,
            targets: self.targets.as_deref(),
        };
        for critter in &mut self.critters {
            critter.step(&env, &mut self.rng);
        }
    }

    /// Pointer-down / touch-start at (x, y). Returns how many critters fled.
    pub fn react_to_pointer(&mut self, x: f32, y: f32) -> usize {
        if !x.is_finite() || !y.is_finite() {
            return 0;
        }
        let mut scared = 0;
        for critter in &mut self.critters {
            if critter.scare(x, y, &self.config, &mut self.rng) {
                scared += 1;
            }
        }
        scared
    }

    pub fn resize(&mut self, w: f32, h: f32) {
        self.viewport = Viewport::new(w, h);
    }

    /// Draw every critter into `surface`. Does not touch simulation state.
    pub fn draw_into(&self, surface: &mut dyn Surface) {
        let Some(mode) = self.mode else { return };
        for critter in &self.critters {
            surface.draw(&critter.sprite(mode));
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn dispose(&mut self) {
        self.stop();
        self.critters.clear();
    }

    pub fn critters(&self) -> &[Critter] {
        &self.critters
    }

    pub fn critters_mut(&mut self) -> &mut [Critter] {
        &mut self.critters
    }

    pub fn mode(&self) -> Option<CritterMode> {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::InstanceEncoder;

    fn swarm() -> CritterSwarm {
        CritterSwarm::new(Viewport::new(800.0, 600.0), CritterConfig::default(), 42)
    }

    #[test]
    fn first_mode_builds_pool() {
        let mut s = swarm();
        assert!(s.critters().is_empty());
        assert!(s.set_mode(false));
        assert_eq!(s.critters().len(), 10);
        assert_eq!(s.mode(), Some(CritterMode::Pollinators));
    }

    #[test]
    fn empty_pool_heals_on_same_mode() {
        let mut s = swarm();
        s.set_mode(true);
        s.dispose();
        assert!(s.set_mode(true));
        assert_eq!(s.critters().len(), 10);
    }

    #[test]
    fn clock_checked_on_interval() {
        let mut s = swarm();
        s.set_mode(false);
        assert!(!s.poll_clock(1000.0, 22));
        assert_eq!(s.mode(), Some(CritterMode::Pollinators));
        assert!(s.poll_clock(300_000.0, 22));
        assert_eq!(s.mode(), Some(CritterMode::Fireflies));
    }

    #[test]
    fn nan_pointer_scares_nobody() {
        let mut s = swarm();
        s.set_mode(false);
        assert_eq!(s.react_to_pointer(f32::NAN, 10.0), 0);
    }

    #[test]
    fn draw_leaves_state_alone() {
        let mut s = swarm();
        s.set_mode(true);
        let before: Vec<(f32, f32)> = s.critters().iter().map(|c| (c.x, c.y)).collect();
        let mut enc = InstanceEncoder::new();
        s.draw_into(&mut enc);
        assert_eq!(enc.count(), 10);
        let after: Vec<(f32, f32)> = s.critters().iter().map(|c| (c.x, c.y)).collect();
        assert_eq!(before, after);
    }
}
