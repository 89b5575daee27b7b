//! Autumn leaves: two leaf glyphs, each in one of four colors.

use valalah_core::{ControllerConfig, Variant, NARROW_BREAKPOINT_PX};

/// Leaf glyphs.
pub const LEAVES: [&str; 2] = ["🍁", "🍂"];

/// Color modifier classes.
pub const COLORS: [&str; 4] = ["orange", "red", "yellow", "brown"];

/// The autumn preset.
#[must_use]
pub fn config() -> ControllerConfig {
    // Every glyph/color pair, so one uniform pick equals two independent ones
    let variants = LEAVES
        .iter()
        .flat_map(|leaf| COLORS.iter().map(move |color| Variant::tinted(leaf, color)))
        .collect();

    ControllerConfig {
        label: "Autumn Leaves".into(),
        class: "autumn-leaf".into(),
        capacity: 25,
        narrow_capacity: 12,
        narrow_breakpoint_px: NARROW_BREAKPOINT_PX,
        spawn_interval_ms: 400,
        lifetime_s: [10.0, 14.0],
        sway_s: Some([3.0, 5.0]),
        burst_size: 8,
        burst_stagger_ms: 150,
        variants,
        interaction: None,
    }
}
