//! Easter eggs. Clicking an egg cracks it open with a crunch and a spray of
//! chocolate.

use valalah_core::{ControllerConfig, InteractionConfig, SoundConfig, Variant, NARROW_BREAKPOINT_PX};

/// Egg glyphs.
pub const EGGS: [&str; 2] = ["🥚", "🐣"];

/// Shard glyphs thrown by a cracked egg.
pub const CHOCOLATE: [&str; 3] = ["🍫", "🍬", "🍭"];

/// Crunch sound asset.
pub const CRUNCH_SRC: &str = "/themes/easter-eggs/audio.wav";

/// The easter preset.
#[must_use]
pub fn config() -> ControllerConfig {
    ControllerConfig {
        label: "Easter Eggs".into(),
        class: "easter-egg".into(),
        capacity: 20,
        narrow_capacity: 10,
        narrow_breakpoint_px: NARROW_BREAKPOINT_PX,
        spawn_interval_ms: 500,
        lifetime_s: [9.0, 12.0],
        sway_s: Some([0.8, 1.2]),
        burst_size: 6,
        burst_stagger_ms: 200,
        variants: EGGS.iter().map(|egg| Variant::glyph(egg)).collect(),
        interaction: Some(InteractionConfig {
            dismiss_delay_ms: 300,
            shard_class: "chocolate-piece".into(),
            shard_glyphs: CHOCOLATE.iter().map(|&piece| piece.to_owned()).collect(),
            shard_count: [5, 7],
            shard_spread_px: 100.0,
            shard_lifetime_ms: 1000,
            sound: Some(SoundConfig {
                src: CRUNCH_SRC.into(),
                volume: 0.3,
            }),
        }),
    }
}
