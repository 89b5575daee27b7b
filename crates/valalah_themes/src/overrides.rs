//! # Theme Overrides
//!
//! Site operators can tune the built-in presets from a TOML file without
//! touching code. Every key is optional; anything left out keeps its preset
//! value.
//!
//! ```toml
//! [winter]
//! capacity = 50
//! lifetime_s = [6.0, 9.0]
//!
//! [easter]
//! sound_volume = 0.0
//!
//! [summer]
//! max_trail_length = 25
//! ```

use serde::{Deserialize, Serialize};
use valalah_core::{ControllerConfig, TrailConfig, Variant};

use crate::error::{ThemeError, ThemeResult};
use crate::kind::ThemeKind;
use crate::presets;

/// Optional changes to a falling theme.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerPatch {
    /// Wide-viewport capacity.
    pub capacity: Option<usize>,
    /// Narrow-viewport capacity.
    pub narrow_capacity: Option<usize>,
    /// Steady spawn interval.
    pub spawn_interval_ms: Option<u64>,
    /// Lifetime interval in seconds.
    pub lifetime_s: Option<[f32; 2]>,
    /// Secondary animation interval in seconds.
    pub sway_s: Option<[f32; 2]>,
    /// Start-up burst size.
    pub burst_size: Option<usize>,
    /// Gap between burst spawns.
    pub burst_stagger_ms: Option<u64>,
    /// Replacement variants.
    pub variants: Option<Vec<Variant>>,
    /// Activation sound volume. Zero turns the sound off.
    pub sound_volume: Option<f32>,
}

impl ControllerPatch {
    /// Applies every present key to `config`.
    pub fn apply(&self, config: &mut ControllerConfig) {
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(narrow) = self.narrow_capacity {
            config.narrow_capacity = narrow;
        }
        if let Some(interval) = self.spawn_interval_ms {
            config.spawn_interval_ms = interval;
        }
        if let Some(lifetime) = self.lifetime_s {
            config.lifetime_s = lifetime;
        }
        if let Some(sway) = self.sway_s {
            config.sway_s = Some(sway);
        }
        if let Some(burst) = self.burst_size {
            config.burst_size = burst;
        }
        if let Some(stagger) = self.burst_stagger_ms {
            config.burst_stagger_ms = stagger;
        }
        if let Some(variants) = &self.variants {
            config.variants.clone_from(variants);
        }
        if let Some(volume) = self.sound_volume {
            if let Some(interaction) = config.interaction.as_mut() {
                if volume <= 0.0 {
                    interaction.sound = None;
                } else if let Some(sound) = interaction.sound.as_mut() {
                    sound.volume = volume;
                }
            }
        }
    }
}

/// Optional changes to the summer glow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrailPatch {
    /// Trail length.
    pub max_trail_length: Option<usize>,
    /// Fade time of evicted segments.
    pub fade_ms: Option<u64>,
    /// Sparkle emitter period.
    pub sparkle_interval_ms: Option<u64>,
    /// Sparkle odds per tick.
    pub sparkle_chance: Option<f32>,
    /// Sparkle lifetime.
    pub sparkle_lifetime_ms: Option<u64>,
}

impl TrailPatch {
    /// Applies every present key to `config`.
    pub fn apply(&self, config: &mut TrailConfig) {
        if let Some(length) = self.max_trail_length {
            config.max_trail_length = length;
        }
        if let Some(fade) = self.fade_ms {
            config.fade_ms = fade;
        }
        if let Some(interval) = self.sparkle_interval_ms {
            config.sparkle_interval_ms = interval;
        }
        if let Some(chance) = self.sparkle_chance {
            config.sparkle_chance = chance;
        }
        if let Some(lifetime) = self.sparkle_lifetime_ms {
            config.sparkle_lifetime_ms = lifetime;
        }
    }
}

/// A themes file: one optional table per theme.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeOverrides {
    /// `[autumn]`
    #[serde(default)]
    pub autumn: Option<ControllerPatch>,
    /// `[winter]`
    #[serde(default)]
    pub winter: Option<ControllerPatch>,
    /// `[easter]`
    #[serde(default)]
    pub easter: Option<ControllerPatch>,
    /// `[summer]`
    #[serde(default)]
    pub summer: Option<TrailPatch>,
}

impl ThemeOverrides {
    /// No overrides: every theme runs its preset.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Parses a themes file and checks every resulting config.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Config`] for malformed TOML, unknown keys, or
    /// values the controllers would reject.
    pub fn from_toml_str(source: &str) -> ThemeResult<Self> {
        let overrides: Self = toml::from_str(source)?;
        for kind in ThemeKind::ALL {
            if kind.is_continuous() {
                overrides.trail_config()?;
            } else {
                overrides.controller_config(kind)?;
            }
        }
        Ok(overrides)
    }

    /// The preset for `kind` with its patch applied, validated.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::UnknownTheme`] for summer (not a falling theme)
    /// and [`ThemeError::Config`] for invalid values.
    pub fn controller_config(&self, kind: ThemeKind) -> ThemeResult<ControllerConfig> {
        let mut config =
            presets::falling(kind).ok_or_else(|| ThemeError::UnknownTheme(kind.to_string()))?;
        let patch = match kind {
            ThemeKind::Autumn => self.autumn.as_ref(),
            ThemeKind::Winter => self.winter.as_ref(),
            ThemeKind::Easter => self.easter.as_ref(),
            ThemeKind::Summer => None,
        };
        if let Some(patch) = patch {
            patch.apply(&mut config);
        }
        config.validate()?;
        Ok(config)
    }

    /// The summer preset with its patch applied, validated.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Config`] for invalid values.
    pub fn trail_config(&self) -> ThemeResult<TrailConfig> {
        let mut config = presets::summer::config();
        if let Some(patch) = &self.summer {
            patch.apply(&mut config);
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valalah_core::EffectError;

    #[test]
    fn test_empty_file_keeps_presets() {
        let overrides = ThemeOverrides::from_toml_str("").unwrap();
        assert_eq!(overrides, ThemeOverrides::none());
        assert_eq!(
            overrides.controller_config(ThemeKind::Winter).unwrap(),
            presets::winter::config()
        );
    }

    #[test]
    fn test_patch_applies() {
        let overrides = ThemeOverrides::from_toml_str(
            r#"
            [winter]
            capacity = 50
            lifetime_s = [6.0, 9.0]

            [summer]
            max_trail_length = 25
            sparkle_chance = 0.5
            "#,
        )
        .unwrap();

        let winter = overrides.controller_config(ThemeKind::Winter).unwrap();
        assert_eq!(winter.capacity, 50);
        assert_eq!(winter.narrow_capacity, 15);
        assert_eq!(winter.lifetime_s, [6.0, 9.0]);

        let summer = overrides.trail_config().unwrap();
        assert_eq!(summer.max_trail_length, 25);
        assert!((summer.sparkle_chance - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_volume_mutes_easter() {
        let overrides = ThemeOverrides::from_toml_str("[easter]\nsound_volume = 0.0\n").unwrap();
        let easter = overrides.controller_config(ThemeKind::Easter).unwrap();
        assert!(easter.interaction.unwrap().sound.is_none());
    }

    #[test]
    fn test_invalid_patch_rejected() {
        let err = ThemeOverrides::from_toml_str("[autumn]\ncapacity = 0\n").unwrap_err();
        assert!(matches!(err, ThemeError::Config(EffectError::InvalidConfig(_))));
    }

    #[test]
    fn test_out_of_range_patch_rejected() {
        let err = ThemeOverrides::from_toml_str("[winter]\nlifetime_s = [1e30, 1e30]\n").unwrap_err();
        assert!(matches!(err, ThemeError::Config(EffectError::InvalidConfig(_))));

        let err = ThemeOverrides::from_toml_str("[summer]\nmax_trail_length = 1000000\n").unwrap_err();
        assert!(matches!(err, ThemeError::Config(EffectError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ThemeOverrides::from_toml_str("[winter]\nflakes = 3\n").unwrap_err();
        assert!(matches!(err, ThemeError::Config(EffectError::ConfigParse(_))));
    }

    #[test]
    fn test_summer_has_no_controller_config() {
        assert!(ThemeOverrides::none().controller_config(ThemeKind::Summer).is_err());
    }
}
