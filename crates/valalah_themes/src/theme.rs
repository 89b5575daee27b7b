//! # Theme
//!
//! One running theme: either a falling-particle controller or the pointer
//! trail. Everything the page needs goes through this enum, so the stage and
//! the browser backend never care which kind is active.

use std::time::Duration;

use rand::Rng;
use tracing::info;
use valalah_core::{
    Dispatch, Driven, EntityId, OptionalSound, ParticleController, Phase, Scheduler, SoundLoader,
    Surface, TrailController, Viewport, Wakeup,
};

use crate::error::ThemeResult;
use crate::kind::ThemeKind;
use crate::overrides::ThemeOverrides;

/// What a theme runs on.
#[derive(Debug)]
pub struct ThemeParts<S, K, R> {
    /// Where nodes go.
    pub surface: S,
    /// Timer source.
    pub scheduler: K,
    /// Randomness.
    pub rng: R,
}

/// A built theme.
pub enum Theme<S: Surface, K: Scheduler, R: Rng> {
    /// Autumn, winter or easter.
    Falling {
        /// Which one.
        kind: ThemeKind,
        /// Its controller.
        controller: ParticleController<S, K, R>,
    },
    /// Summer.
    Glow(TrailController<S, K, R>),
}

impl<S: Surface, K: Scheduler, R: Rng> Theme<S, K, R> {
    /// Builds `kind` from its (possibly overridden) preset. Sounds are
    /// preloaded here; a sound that fails to load just leaves the theme mute.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ThemeError::Config`] if the overrides produce an
    /// invalid configuration.
    pub fn build(
        kind: ThemeKind,
        overrides: &ThemeOverrides,
        viewport: &Viewport,
        parts: ThemeParts<S, K, R>,
        sounds: &mut dyn SoundLoader,
    ) -> ThemeResult<Self> {
        let ThemeParts {
            surface,
            scheduler,
            rng,
        } = parts;

        let theme = if kind.is_continuous() {
            let config = overrides.trail_config()?;
            Self::Glow(TrailController::new(config, viewport, surface, scheduler, rng)?)
        } else {
            let config = overrides.controller_config(kind)?;
            let sound = config
                .interaction
                .as_ref()
                .and_then(|interaction| interaction.sound.as_ref())
                .map_or_else(OptionalSound::none, |sound| OptionalSound::preload(sounds, sound));
            let controller =
                ParticleController::new(config, viewport, surface, scheduler, rng)?.with_sound(sound);
            Self::Falling { kind, controller }
        };

        info!(theme = %kind, "{}", kind.load_message());
        Ok(theme)
    }

    /// Which theme this is.
    #[must_use]
    pub fn kind(&self) -> ThemeKind {
        match self {
            Self::Falling { kind, .. } => *kind,
            Self::Glow(_) => ThemeKind::Summer,
        }
    }

    /// Starts spawning (or following the pointer).
    pub fn start(&mut self) {
        match self {
            Self::Falling { controller, .. } => controller.start(),
            Self::Glow(trail) => trail.start(),
        }
    }

    /// Tears down. Idempotent.
    pub fn stop(&mut self) {
        match self {
            Self::Falling { controller, .. } => controller.stop(),
            Self::Glow(trail) => trail.stop(),
        }
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Falling { controller, .. } => controller.phase(),
            Self::Glow(trail) => trail.phase(),
        }
    }

    /// Feeds a pointer sample. Only the glow listens.
    pub fn on_pointer_move(&mut self, x: f32, y: f32, at: Duration) {
        if let Self::Glow(trail) = self {
            trail.on_pointer_move(x, y, at);
        }
    }

    /// Feeds an activation of entity `id` at page position `at`. Only
    /// interactive themes listen.
    pub fn on_interact(&mut self, id: EntityId, at: (f32, f32)) -> bool {
        match self {
            Self::Falling { controller, .. } => controller.on_interact(id, at),
            Self::Glow(_) => false,
        }
    }

    /// Counted entities: particles, or trail segments for the glow.
    #[must_use]
    pub fn live_count(&self) -> usize {
        match self {
            Self::Falling { controller, .. } => controller.live_count(),
            Self::Glow(trail) => trail.trail_len(),
        }
    }

    /// Upper bound on [`Theme::live_count`].
    #[must_use]
    pub fn capacity(&self) -> usize {
        match self {
            Self::Falling { controller, .. } => controller.capacity(),
            Self::Glow(trail) => trail.config().max_trail_length,
        }
    }

    /// The surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        match self {
            Self::Falling { controller, .. } => controller.surface(),
            Self::Glow(trail) => trail.surface(),
        }
    }

    /// The falling controller, if this is one.
    #[must_use]
    pub fn as_falling(&self) -> Option<&ParticleController<S, K, R>> {
        match self {
            Self::Falling { controller, .. } => Some(controller),
            Self::Glow(_) => None,
        }
    }

    /// The trail controller, if this is the glow.
    #[must_use]
    pub fn as_glow(&self) -> Option<&TrailController<S, K, R>> {
        match self {
            Self::Falling { .. } => None,
            Self::Glow(trail) => Some(trail),
        }
    }
}

impl<S: Surface, K: Scheduler, R: Rng> Dispatch for Theme<S, K, R> {
    fn dispatch(&mut self, wakeup: Wakeup) {
        match self {
            Self::Falling { controller, .. } => controller.dispatch(wakeup),
            Self::Glow(trail) => trail.dispatch(wakeup),
        }
    }
}

impl<S: Surface, K: Scheduler, R: Rng> Driven for Theme<S, K, R> {
    type Clock = K;

    fn clock(&self) -> &K {
        match self {
            Self::Falling { controller, .. } => controller.clock(),
            Self::Glow(trail) => trail.clock(),
        }
    }

    fn clock_mut(&mut self) -> &mut K {
        match self {
            Self::Falling { controller, .. } => controller.clock_mut(),
            Self::Glow(trail) => trail.clock_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use valalah_core::{
        advance, EffectError, EffectResult, MemorySurface, SilentLoader, SimulatedScheduler,
        Sound, SoundConfig,
    };

    type TestTheme = Theme<MemorySurface, SimulatedScheduler, ChaCha8Rng>;

    struct MissingAudio;

    impl SoundLoader for MissingAudio {
        fn load(&mut self, config: &SoundConfig) -> EffectResult<Box<dyn Sound>> {
            Err(EffectError::Audio(format!("404 {}", config.src)))
        }
    }

    fn parts() -> ThemeParts<MemorySurface, SimulatedScheduler, ChaCha8Rng> {
        ThemeParts {
            surface: MemorySurface::new(),
            scheduler: SimulatedScheduler::new(),
            rng: ChaCha8Rng::seed_from_u64(8),
        }
    }

    fn build(kind: ThemeKind, sounds: &mut dyn SoundLoader) -> TestTheme {
        Theme::build(kind, &ThemeOverrides::none(), &Viewport::desktop(), parts(), sounds).unwrap()
    }

    #[test]
    fn test_every_kind_builds_and_runs() {
        for kind in ThemeKind::ALL {
            let mut theme = build(kind, &mut SilentLoader);
            assert_eq!(theme.kind(), kind);

            theme.start();
            theme.on_pointer_move(300.0, 300.0, Duration::ZERO);
            advance(&mut theme, Duration::from_secs(5));
            assert!(theme.live_count() > 0, "{kind} produced nothing");
            assert!(theme.live_count() <= theme.capacity());

            theme.stop();
            assert_eq!(theme.live_count(), 0);
            assert_eq!(theme.surface().live_count(), 0);
        }
    }

    #[test]
    fn test_easter_without_audio_still_cracks() {
        let mut theme = build(ThemeKind::Easter, &mut MissingAudio);
        assert!(!theme.as_falling().unwrap().sound_enabled());

        theme.start();
        advance(&mut theme, Duration::from_millis(10));
        let id = theme.as_falling().unwrap().live_ids()[0];
        assert!(theme.on_interact(id, (50.0, 50.0)));
    }

    #[test]
    fn test_only_easter_is_interactive() {
        let mut theme = build(ThemeKind::Winter, &mut SilentLoader);
        theme.start();
        advance(&mut theme, Duration::from_millis(10));
        let id = theme.as_falling().unwrap().live_ids()[0];
        assert!(!theme.on_interact(id, (0.0, 0.0)));
    }
}
