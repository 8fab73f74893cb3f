// sim/ - Ambient simulations
//
// Critters (seek, perch, flee) and rain (fall, land, settle, fade).
// Plain structs advanced one display frame per tick; nothing in here
// knows how it gets drawn.

mod critter;
mod fall;
mod ground;
mod rain;
mod swarm;
mod target;

pub use critter::{Critter, CritterState, Surroundings};
pub use fall::{FallingParticle, FallingParticles};
pub use ground::{GroundField, GroundParticle};
pub use rain::{RainState, RainSystem};
pub use swarm::{CritterMode, CritterSwarm};
pub use target::{FlowerPoint, SharedFlowers, TargetSource, select_target};
