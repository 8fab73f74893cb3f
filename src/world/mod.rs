// world/ - Viewport and clock queries
//
// Pure functions over screen geometry and wall-clock time.
// No simulation state lives here.

mod clock;
mod viewport;

pub use clock::*;
pub use viewport::*;
