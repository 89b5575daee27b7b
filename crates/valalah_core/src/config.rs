//! # Controller Configuration
//!
//! Per-theme parameters, immutable once a controller is built. Presets live
//! in the themes crate; anything here can also be read from TOML.
//!
//! ```toml
//! label = "Winter Snowflakes"
//! class = "snowflake"
//! capacity = 30
//! narrow_capacity = 15
//! spawn_interval_ms = 300
//! lifetime_s = [8.0, 12.0]
//! burst_size = 10
//! burst_stagger_ms = 100
//!
//! [[variants]]
//! glyph = "❄"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EffectError, EffectResult};

/// Viewports narrower than this get the reduced capacity.
pub const NARROW_BREAKPOINT_PX: f32 = 768.0;

/// Largest accepted capacity. Slots are allocated up front.
pub const MAX_CAPACITY: usize = 10_000;

/// Longest accepted lifetime or animation interval, in seconds.
pub const MAX_INTERVAL_S: f32 = 3600.0;

/// What the page looks like at activation. Queried once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// `innerWidth` in px.
    pub width_px: f32,
    /// `innerHeight` in px.
    pub height_px: f32,
    /// Touch-capable device.
    pub touch: bool,
}

impl Viewport {
    /// A desktop-sized viewport without touch.
    #[must_use]
    pub const fn desktop() -> Self {
        Self {
            width_px: 1280.0,
            height_px: 800.0,
            touch: false,
        }
    }

    /// A phone-sized touch viewport.
    #[must_use]
    pub const fn phone() -> Self {
        Self {
            width_px: 390.0,
            height_px: 844.0,
            touch: true,
        }
    }

    /// Narrower than `breakpoint_px`?
    #[inline]
    #[must_use]
    pub fn is_narrow(&self, breakpoint_px: f32) -> bool {
        self.width_px < breakpoint_px
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::desktop()
    }
}

/// One visual template: a glyph and an optional modifier class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Text content.
    pub glyph: String,
    /// Modifier class.
    #[serde(default)]
    pub tint: Option<String>,
}

impl Variant {
    /// A glyph with no modifier.
    #[must_use]
    pub fn glyph(glyph: &str) -> Self {
        Self {
            glyph: glyph.to_owned(),
            tint: None,
        }
    }

    /// A glyph with a modifier class.
    #[must_use]
    pub fn tinted(glyph: &str, tint: &str) -> Self {
        Self {
            glyph: glyph.to_owned(),
            tint: Some(tint.to_owned()),
        }
    }
}

/// A sound to preload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Asset URL.
    pub src: String,
    /// Playback volume (0-1).
    pub volume: f32,
}

/// Click-to-dismiss parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Delay between activation and removal, for the crack animation.
    pub dismiss_delay_ms: u64,
    /// Class of the shards thrown on activation.
    pub shard_class: String,
    /// Shard glyphs, one picked per shard.
    pub shard_glyphs: Vec<String>,
    /// Shards per activation, inclusive range.
    pub shard_count: [u32; 2],
    /// Shards travel up to half this far on each axis.
    pub shard_spread_px: f32,
    /// Shard lifetime.
    pub shard_lifetime_ms: u64,
    /// Optional activation sound.
    #[serde(default)]
    pub sound: Option<SoundConfig>,
}

impl InteractionConfig {
    /// Checks every value.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> EffectResult<()> {
        if self.shard_glyphs.is_empty() {
            return Err(invalid("shard_glyphs must not be empty"));
        }
        if self.shard_count[0] > self.shard_count[1] {
            return Err(invalid("shard_count must be [min, max] with min <= max"));
        }
        if !self.shard_spread_px.is_finite() || self.shard_spread_px < 0.0 {
            return Err(invalid("shard_spread_px must be a non-negative number"));
        }
        if let Some(sound) = &self.sound {
            if !(0.0..=1.0).contains(&sound.volume) {
                return Err(invalid("sound.volume must be within 0..=1"));
            }
        }
        Ok(())
    }
}

/// Parameters of a discrete spawn/expire controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Human-readable theme name, used in logs.
    pub label: String,
    /// CSS class of every entity.
    pub class: String,
    /// Concurrent entity cap on wide viewports.
    pub capacity: usize,
    /// Concurrent entity cap on narrow viewports.
    pub narrow_capacity: usize,
    /// Width below which `narrow_capacity` applies.
    #[serde(default = "default_breakpoint")]
    pub narrow_breakpoint_px: f32,
    /// Steady-state time between spawn attempts.
    pub spawn_interval_ms: u64,
    /// Closed lifetime interval `[min, max]` in seconds.
    pub lifetime_s: [f32; 2],
    /// Secondary animation interval `[min, max]` in seconds.
    #[serde(default)]
    pub sway_s: Option<[f32; 2]>,
    /// Spawns in the start-up ramp (capped at capacity).
    pub burst_size: usize,
    /// Gap between start-up spawns.
    pub burst_stagger_ms: u64,
    /// Visual templates, one chosen uniformly per spawn.
    pub variants: Vec<Variant>,
    /// Click-to-dismiss behavior.
    #[serde(default)]
    pub interaction: Option<InteractionConfig>,
}

fn default_breakpoint() -> f32 {
    NARROW_BREAKPOINT_PX
}

fn invalid(reason: &str) -> EffectError {
    EffectError::InvalidConfig(reason.to_owned())
}

fn check_interval(name: &str, range: [f32; 2]) -> EffectResult<()> {
    let [min, max] = range;
    let in_range = min.is_finite() && max.is_finite() && min > 0.0 && min <= max;
    if !in_range || max > MAX_INTERVAL_S {
        return Err(EffectError::InvalidConfig(format!(
            "{name} must be [min, max] with 0 < min <= max <= {MAX_INTERVAL_S}, got [{min}, {max}]"
        )));
    }
    Ok(())
}

impl ControllerConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::ConfigParse`] for malformed TOML and
    /// [`EffectError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> EffectResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> EffectResult<()> {
        if self.capacity == 0 || self.narrow_capacity == 0 {
            return Err(invalid("capacity and narrow_capacity must be positive"));
        }
        if self.capacity > MAX_CAPACITY || self.narrow_capacity > MAX_CAPACITY {
            return Err(EffectError::InvalidConfig(format!(
                "capacity and narrow_capacity must not exceed {MAX_CAPACITY}"
            )));
        }
        if self.spawn_interval_ms == 0 {
            return Err(invalid("spawn_interval_ms must be positive"));
        }
        check_interval("lifetime_s", self.lifetime_s)?;
        if let Some(sway) = self.sway_s {
            check_interval("sway_s", sway)?;
        }
        if self.variants.is_empty() {
            return Err(invalid("variants must not be empty"));
        }
        if let Some(interaction) = &self.interaction {
            interaction.validate()?;
        }
        Ok(())
    }

    /// Capacity for the given viewport.
    #[must_use]
    pub fn capacity_for(&self, viewport: &Viewport) -> usize {
        if viewport.is_narrow(self.narrow_breakpoint_px) {
            self.narrow_capacity
        } else {
            self.capacity
        }
    }
}

/// Parameters of the pointer-trail controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrailConfig {
    /// Human-readable theme name, used in logs.
    pub label: String,
    /// Class of the glow that follows the pointer.
    pub glow_class: String,
    /// Class of trail segments.
    pub trail_class: String,
    /// Class of sparkles.
    pub sparkle_class: String,
    /// Trail segments kept on screen.
    pub max_trail_length: usize,
    /// Trail segments are centered by shifting this far up and left.
    pub trail_offset_px: f32,
    /// The glow is centered by shifting this far up and left.
    pub glow_offset_px: f32,
    /// Where the glow waits before the first pointer move.
    pub glow_parking_px: f32,
    /// Time an evicted segment takes to fade out.
    pub fade_ms: u64,
    /// Sparkle emitter period.
    pub sparkle_interval_ms: u64,
    /// Chance per tick of emitting a sparkle.
    pub sparkle_chance: f32,
    /// Sparkles land within half this distance of the pointer, per axis.
    pub sparkle_jitter_px: f32,
    /// Sparkle lifetime.
    pub sparkle_lifetime_ms: u64,
    /// Width below which trail and sparkles are disabled.
    #[serde(default = "default_breakpoint")]
    pub narrow_breakpoint_px: f32,
}

impl TrailConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::ConfigParse`] for malformed TOML and
    /// [`EffectError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> EffectResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> EffectResult<()> {
        if self.max_trail_length == 0 {
            return Err(invalid("max_trail_length must be positive"));
        }
        if self.max_trail_length > MAX_CAPACITY {
            return Err(EffectError::InvalidConfig(format!(
                "max_trail_length must not exceed {MAX_CAPACITY}"
            )));
        }
        if self.sparkle_interval_ms == 0 {
            return Err(invalid("sparkle_interval_ms must be positive"));
        }
        if !(0.0..=1.0).contains(&self.sparkle_chance) {
            return Err(invalid("sparkle_chance must be within 0..=1"));
        }
        if !self.sparkle_jitter_px.is_finite() || self.sparkle_jitter_px < 0.0 {
            return Err(invalid("sparkle_jitter_px must be a non-negative number"));
        }
        Ok(())
    }

    /// Trail and sparkles run only on wide, non-touch viewports.
    #[must_use]
    pub fn motion_enabled(&self, viewport: &Viewport) -> bool {
        !viewport.touch && !viewport.is_narrow(self.narrow_breakpoint_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNOW: &str = r#"
        label = "Winter Snowflakes"
        class = "snowflake"
        capacity = 30
        narrow_capacity = 15
        spawn_interval_ms = 300
        lifetime_s = [8.0, 12.0]
        sway_s = [3.0, 3.0]
        burst_size = 10
        burst_stagger_ms = 100

        [[variants]]
        glyph = "❄"

        [[variants]]
        glyph = "❅"
    "#;

    #[test]
    fn test_parse_controller_config() {
        let config = ControllerConfig::from_toml_str(SNOW).unwrap();
        assert_eq!(config.capacity, 30);
        assert_eq!(config.variants.len(), 2);
        assert!((config.narrow_breakpoint_px - NARROW_BREAKPOINT_PX).abs() < f32::EPSILON);
        assert!(config.interaction.is_none());
    }

    #[test]
    fn test_narrow_viewport_capacity() {
        let config = ControllerConfig::from_toml_str(SNOW).unwrap();
        assert_eq!(config.capacity_for(&Viewport::desktop()), 30);
        assert_eq!(config.capacity_for(&Viewport::phone()), 15);
    }

    #[test]
    fn test_rejects_inverted_lifetime() {
        let source = SNOW.replace("[8.0, 12.0]", "[12.0, 8.0]");
        let err = ControllerConfig::from_toml_str(&source).unwrap_err();
        assert!(matches!(err, EffectError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_huge_lifetime() {
        let source = SNOW.replace("[8.0, 12.0]", "[1e30, 1e30]");
        let err = ControllerConfig::from_toml_str(&source).unwrap_err();
        assert!(matches!(err, EffectError::InvalidConfig(_)));

        let hour = SNOW.replace("[8.0, 12.0]", "[3600.0, 3600.0]");
        assert!(ControllerConfig::from_toml_str(&hour).is_ok());
    }

    #[test]
    fn test_rejects_huge_capacity() {
        let source = SNOW.replace("capacity = 30", "capacity = 5000000000");
        let err = ControllerConfig::from_toml_str(&source).unwrap_err();
        assert!(matches!(err, EffectError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_empty_variants() {
        let mut config = ControllerConfig::from_toml_str(SNOW).unwrap();
        config.variants.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = ControllerConfig::from_toml_str("capacity = ").unwrap_err();
        assert!(matches!(err, EffectError::ConfigParse(_)));
    }

    #[test]
    fn test_motion_disabled_on_touch() {
        let config = TrailConfig {
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
        };
        assert!(config.motion_enabled(&Viewport::desktop()));
        assert!(!config.motion_enabled(&Viewport::phone()));

        let touch_laptop = Viewport {
            touch: true,
            ..Viewport::desktop()
        };
        assert!(!config.motion_enabled(&touch_laptop));
    }
}
