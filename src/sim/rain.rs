// rain.rs - Rain emission, fall loop and ground loop lifetime
//
// Time only enters through `tick(dt_ms, ..)`: the staggered start batch
// and the stop fade are scheduled on an internal millisecond clock, so
// tests drive everything without real timers.
//
// Loops:
//   fall    runs while rain is active; cancelled (and cleared) when the
//           stop fade runs out
//   ground  runs while rain is active OR particles remain; once both are
//           false it stays down until the next `start()`

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::fall::{FallingParticle, FallingParticles};
use super::ground::GroundField;
use crate::assets::{AssetCatalog, Category};
use crate::config::{GroundConfig, RainConfig};
use crate::input::PointerState;
use crate::render::Surface;
use crate::world::Viewport;

/// The persisted on/off switch and category selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RainState {
    pub is_active: bool,
    pub modes: Vec<Category>,
}

impl Default for RainState {
    fn default() -> Self {
        Self { is_active: false, modes: vec![Category::Cute] }
    }
}

pub struct RainSystem {
    catalog: AssetCatalog,
    categories: Vec<Category>,
    falling: FallingParticles,
    ground: GroundField,
    landed: Vec<FallingParticle>,

    active: bool,
    fall_running: bool,
    ground_running: bool,

    clock_ms: f64,
    pending_spawns: VecDeque<f64>,
    fade_until: Option<f64>,

    viewport: Viewport,
    config: RainConfig,
    rng: SmallRng,
}

impl RainSystem {
    pub fn new(
        viewport: Viewport,
        config: RainConfig,
        ground: GroundConfig,
        catalog: AssetCatalog,
        seed: u64,
    ) -> Self {
        Self {
            catalog,
            categories: RainState::default().modes,
            falling: FallingParticles::new(),
            ground: GroundField::new(ground),
            landed: Vec::new(),
            active: false,
            fall_running: false,
            ground_running: false,
            clock_ms: 0.0,
            pending_spawns: VecDeque::new(),
            fade_until: None,
            viewport,
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    /// Pick the active categories. Duplicates are dropped and anything
    /// past the per-selection limit is cut off.
    pub fn set_active_modes(&mut self, modes: &[Category]) {
        let mut picked: Vec<Category> = Vec::with_capacity(modes.len());
        for &m in modes {
            if !picked.contains(&m) {
                picked.push(m);
            }
        }
        picked.truncate(self.config.max_categories);
        if picked.is_empty() {
            log::warn!("no rain category selected, nothing will fall");
        }
        log::info!(
            "rain modes: {}",
            picked.iter().map(|c| c.name()).collect::<Vec<_>>().join(" + ")
        );
        self.categories = picked;
    }

    /// Same as `set_active_modes`, from names. Unknown names are skipped.
    pub fn set_active_mode_names<S: AsRef<str>>(&mut self, names: &[S]) {
        let modes: Vec<Category> = names
            .iter()
            .filter_map(|n| match n.as_ref().parse() {
                Ok(c) => Some(c),
                Err(e) => {
                    log::warn!("{e}");
                    None
                }
            })
            .collect();
        self.set_active_modes(&modes);
    }

    /// The combo: every category at once.
    pub fn set_all_modes(&mut self) {
        self.categories = Category::ALL.to_vec();
        log::info!("rain modes: all");
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    // ------------------------------------------------------------------
    // On / off
    // ------------------------------------------------------------------

    /// Begin emitting. Refused (returns false) while assets are still
    /// loading or when there are none.
    pub fn start(&mut self) -> bool {
        if !self.catalog.is_loaded() {
            log::warn!("rain assets still loading, not starting");
            return false;
        }
        if self.catalog.is_empty() {
            log::warn!("rain asset catalog is empty, not starting");
            return false;
        }
        if self.active {
            return true;
        }

        // Restarted mid-fade: the old flight is dropped, the new batch
        // replaces it
        if self.fade_until.take().is_some() {
            self.falling.clear();
        }
        self.active = true;
        self.fall_running = true;
        self.ground_running = true;
        self.pending_spawns = (0..self.config.batch_size)
            .map(|i| self.clock_ms + i as f64 * self.config.stagger_ms)
            .collect();
        true
    }

    /// Stop emitting. In-flight particles are cleared after the fade
    /// delay; the ground keeps settling on its own.
    pub fn stop(&mut self) {
        self.active = false;
        self.pending_spawns.clear();
        if self.fall_running {
            self.fade_until = Some(self.clock_ms + self.config.fade_ms);
        }
    }

    pub fn toggle(&mut self) -> bool {
        if self.active {
            self.stop();
        } else {
            self.start();
        }
        self.active
    }

    pub fn state(&self) -> RainState {
        RainState { is_active: self.active, modes: self.categories.clone() }
    }

    /// Apply saved categories without emitting anything. Returns whether
    /// the saved state had rain on; starting is left to the caller.
    pub fn restore(&mut self, state: &RainState) -> bool {
        if Category::ALL.iter().all(|c| state.modes.contains(c)) {
            self.set_all_modes();
        } else {
            self.set_active_modes(&state.modes);
        }
        state.is_active
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    /// Advance timers and run whichever loops are alive.
    pub fn tick(&mut self, dt_ms: f64, pointer: &PointerState) {
        self.clock_ms += dt_ms.max(0.0);

        while self.pending_spawns.front().is_some_and(|&due| due <= self.clock_ms) {
            self.pending_spawns.pop_front();
            self.spawn_particle();
        }

        if self.fade_until.is_some_and(|until| until <= self.clock_ms) {
            self.fade_until = None;
            self.fall_running = false;
            self.falling.clear();
        }

        if self.fall_running && self.active {
            self.tick_fall();
        }
        if self.ground_running {
            self.tick_ground(pointer);
        }
    }

    /// One frame of the fall loop: move, land, replace.
    pub fn tick_fall(&mut self) {
        let mut landed = std::mem::take(&mut self.landed);
        self.falling.update(self.viewport, &self.config, &mut landed);

        for p in landed.drain(..) {
            self.ground.land(&p, self.viewport, &mut self.rng);
            if self.active {
                self.spawn_particle();
            }
        }
        self.landed = landed;
    }

    /// One frame of the ground loop. Parks itself once rain is off and
    /// the pile is gone.
    pub fn tick_ground(&mut self, pointer: &PointerState) {
        self.ground.tick(pointer, self.viewport);
        if !self.active && self.ground.is_empty() {
            self.ground_running = false;
        }
    }

    /// Emit one particle from a random active category. No-op while
    /// inactive or when the category has nothing loaded.
    pub fn spawn_particle(&mut self) -> bool {
        if !self.active {
            return false;
        }
        let Some(asset) = self.catalog.pick(&self.categories, &mut self.rng) else {
            return false;
        };
        let p = FallingParticle::spawn(asset, self.viewport, &self.config, &mut self.rng);
        self.falling.push(p);
        true
    }

    // ------------------------------------------------------------------
    // Surfaces
    // ------------------------------------------------------------------

    /// Ground pile plus the particles in flight. During the stop fade the
    /// flight stays frozen in place until it is cleared.
    pub fn draw_into(&self, surface: &mut dyn Surface) {
        self.ground.draw_into(surface);
        if self.fall_running {
            self.falling.draw_into(surface, self.config.opacity);
        }
    }

    /// The "clean garden" action.
    pub fn clear_ground(&mut self) {
        self.ground.clear();
    }

    pub fn resize(&mut self, w: f32, h: f32) {
        self.viewport = Viewport::new(w, h);
    }

    pub fn dispose(&mut self) {
        self.stop();
        self.fade_until = None;
        self.fall_running = false;
        self.ground_running = false;
        self.falling.clear();
        self.ground.clear();
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_falling(&self) -> bool {
        self.fall_running
    }

    pub fn is_ground_running(&self) -> bool {
        self.ground_running
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut AssetCatalog {
        &mut self.catalog
    }

    pub fn falling(&self) -> &FallingParticles {
        &self.falling
    }

    pub fn falling_mut(&mut self) -> &mut FallingParticles {
        &mut self.falling
    }

    pub fn ground(&self) -> &GroundField {
        &self.ground
    }

    pub fn ground_mut(&mut self) -> &mut GroundField {
        &mut self.ground
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &RainConfig {
        &self.config
    }
}
