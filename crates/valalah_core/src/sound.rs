//! # Optional Sound
//!
//! Audio is decoration. A sound that fails to load or play is logged once
//! and switched off for the rest of the session.

use tracing::warn;

use crate::config::SoundConfig;
use crate::error::EffectResult;

/// A playable sound.
pub trait Sound {
    /// Starts one playback.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::Audio`] when playback is refused.
    fn play(&mut self) -> EffectResult<()>;
}

/// Creates sounds from their configuration.
pub trait SoundLoader {
    /// Preloads a sound.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::Audio`] when the asset is unavailable.
    fn load(&mut self, config: &SoundConfig) -> EffectResult<Box<dyn Sound>>;
}

/// A sound that does nothing, successfully.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silence;

impl Sound for Silence {
    fn play(&mut self) -> EffectResult<()> {
        Ok(())
    }
}

/// Loader for headless runs: every sound is [`Silence`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentLoader;

impl SoundLoader for SilentLoader {
    fn load(&mut self, _config: &SoundConfig) -> EffectResult<Box<dyn Sound>> {
        Ok(Box::new(Silence))
    }
}

/// A sound that may be missing.
#[derive(Default)]
pub struct OptionalSound {
    inner: Option<Box<dyn Sound>>,
}

impl OptionalSound {
    /// No sound at all.
    #[must_use]
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// Preloads through `loader`, degrading to no sound on failure.
    pub fn preload(loader: &mut dyn SoundLoader, config: &SoundConfig) -> Self {
        match loader.load(config) {
            Ok(sound) => Self { inner: Some(sound) },
            Err(err) => {
                warn!(src = %config.src, error = %err, "failed to load sound, audio disabled");
                Self::none()
            }
        }
    }

    /// Is there still something to play?
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Plays the sound if enabled. A failure disables it.
    pub fn play(&mut self) {
        let Some(sound) = self.inner.as_mut() else {
            return;
        };
        if let Err(err) = sound.play() {
            warn!(error = %err, "failed to play sound, audio disabled");
            self.inner = None;
        }
    }
}

impl std::fmt::Debug for OptionalSound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionalSound")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EffectError;

    /// Plays `ok_plays` times, then fails.
    struct Flaky {
        ok_plays: u32,
        plays: std::rc::Rc<std::cell::Cell<u32>>,
    }

    impl Sound for Flaky {
        fn play(&mut self) -> EffectResult<()> {
            self.plays.set(self.plays.get() + 1);
            if self.ok_plays == 0 {
                return Err(EffectError::Audio("device lost".into()));
            }
            self.ok_plays -= 1;
            Ok(())
        }
    }

    struct Broken;

    impl SoundLoader for Broken {
        fn load(&mut self, config: &SoundConfig) -> EffectResult<Box<dyn Sound>> {
            Err(EffectError::Audio(format!("{} not found", config.src)))
        }
    }

    fn crunch() -> SoundConfig {
        SoundConfig {
            src: "/themes/easter-eggs/audio.wav".into(),
            volume: 0.3,
        }
    }

    #[test]
    fn test_failed_preload_disables() {
        let mut sound = OptionalSound::preload(&mut Broken, &crunch());
        assert!(!sound.is_enabled());
        sound.play(); // no-op, no panic
    }

    #[test]
    fn test_failed_play_disables_for_session() {
        let plays = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut sound = OptionalSound {
            inner: Some(Box::new(Flaky {
                ok_plays: 1,
                plays: plays.clone(),
            })),
        };

        sound.play();
        assert!(sound.is_enabled());
        sound.play();
        assert!(!sound.is_enabled());
        sound.play();
        assert_eq!(plays.get(), 2); // never retried after the failure
    }

    #[test]
    fn test_silent_loader() {
        let sound = OptionalSound::preload(&mut SilentLoader, &crunch());
        assert!(sound.is_enabled());
    }
}
