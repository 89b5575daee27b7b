//! Summer glow.

use valalah_core::{TrailConfig, NARROW_BREAKPOINT_PX};

/// The summer preset.
#[must_use]
pub fn config() -> TrailConfig {
    TrailConfig {
        label: "Summer Glow".into(),
        glow_class: "glow-center".into(),
        trail_class: "glow-trail".into(),
        sparkle_class: "glow-sparkle".into(),
        max_trail_length: 15,
        trail_offset_px: 10.0,
        glow_offset_px: 20.0,
        glow_parking_px: -100.0,
        fade_ms: 300,
        sparkle_interval_ms: 500,
        sparkle_chance: 0.3,
        sparkle_jitter_px: 30.0,
        sparkle_lifetime_ms: 1000,
        narrow_breakpoint_px: NARROW_BREAKPOINT_PX,
    }
}
