//! Winter snowflakes.

use valalah_core::{ControllerConfig, Variant, NARROW_BREAKPOINT_PX};

/// Snowflake glyphs.
pub const FLAKES: [&str; 3] = ["❄", "❅", "❆"];

/// The winter preset.
#[must_use]
pub fn config() -> ControllerConfig {
    ControllerConfig {
        label: "Winter Snowflakes".into(),
        class: "snowflake".into(),
        capacity: 30,
        narrow_capacity: 15,
        narrow_breakpoint_px: NARROW_BREAKPOINT_PX,
        spawn_interval_ms: 300,
        lifetime_s: [8.0, 12.0],
        sway_s: Some([3.0, 3.0]),
        burst_size: 10,
        burst_stagger_ms: 100,
        variants: FLAKES.iter().map(|flake| Variant::glyph(flake)).collect(),
        interaction: None,
    }
}
