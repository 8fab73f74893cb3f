// input.rs - Pointer snapshot handed to each ground tick

/// Last known pointer position (px) and how far it moved since the
/// previous sample (Manhattan distance).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    tracked: bool,
}

impl Default for PointerState {
    /// Parked far off-screen so nothing is in reach until the first move.
    fn default() -> Self {
        Self { x: -1000.0, y: -1000.0, speed: 0.0, tracked: false }
    }
}

impl PointerState {
    pub fn at(x: f32, y: f32, speed: f32) -> Self {
        Self { x, y, speed, tracked: true }
    }

    /// Record a pointer-move sample. Non-finite samples are dropped.
    pub fn moved_to(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.speed = if self.tracked {
            (x - self.x).abs() + (y - self.y).abs()
        } else {
            0.0
        };
        self.x = x;
        self.y = y;
        self.tracked = true;
    }
}
