// clock.rs - Day/night from the wall clock

/// Night runs from 19:00 to 06:59 local time.
#[inline]
pub fn is_night_hour(hour: u32) -> bool {
    hour < 7 || hour >= 19
}

/// Local hour of day from the browser clock.
#[cfg(target_arch = "wasm32")]
pub fn local_hour() -> u32 {
    js_sys::Date::new_0().get_hours()
}

/// Native builds have no timezone source of their own; they report
/// noon and rely on the host passing real hours to `set_mode`.
#[cfg(not(target_arch = "wasm32"))]
pub fn local_hour() -> u32 {
    12
}
