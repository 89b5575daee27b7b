//! # Theme Stage
//!
//! Page-level lifecycle around at most one active theme.
//!
//! ```text
//! new(kind) ─► built, idle
//!   document_ready ─► start (once)
//!   switch_to(next) ─► build next ─► stop current ─► swap ─► start next if ready
//!   before_unload / stop ─► stop current (idempotent)
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};
use valalah_core::{Dispatch, Driven, EntityId, Phase, Scheduler, Surface, Wakeup};

use crate::error::ThemeResult;
use crate::kind::ThemeKind;
use crate::theme::Theme;

/// Builds a fresh theme. Each call gets its own surface, scheduler and RNG.
pub type ThemeFactory<S, K, R> = Box<dyn FnMut(ThemeKind) -> ThemeResult<Theme<S, K, R>>>;

/// Owns the active theme and reacts to page events.
pub struct ThemeStage<S: Surface, K: Scheduler, R: Rng> {
    factory: ThemeFactory<S, K, R>,
    current: Theme<S, K, R>,
    ready: bool,
}

impl<S: Surface, K: Scheduler, R: Rng> ThemeStage<S, K, R> {
    /// Builds the initial theme. Nothing runs until [`Self::document_ready`].
    ///
    /// # Errors
    ///
    /// Returns whatever the factory returns for `kind`.
    pub fn new(kind: ThemeKind, mut factory: ThemeFactory<S, K, R>) -> ThemeResult<Self> {
        let current = factory(kind)?;
        Ok(Self {
            factory,
            current,
            ready: false,
        })
    }

    /// The document finished loading: start the theme if it never started.
    pub fn document_ready(&mut self) {
        self.ready = true;
        if self.current.phase() == Phase::Idle {
            self.current.start();
        }
    }

    /// The page is going away.
    pub fn before_unload(&mut self) {
        self.stop();
    }

    /// Stops the active theme. Safe to call any number of times.
    pub fn stop(&mut self) {
        self.current.stop();
    }

    /// Replaces the active theme. The old one is fully stopped before the
    /// new one starts. If `kind` cannot be built the current theme is kept.
    ///
    /// # Errors
    ///
    /// Returns the factory's error for `kind`.
    pub fn switch_to(&mut self, kind: ThemeKind) -> ThemeResult<()> {
        let next = (self.factory)(kind)?;
        let previous = self.current.kind();

        self.current.stop();
        self.current = next;
        if self.ready {
            self.current.start();
        }

        info!(from = %previous, to = %kind, started = self.ready, "theme switched");
        Ok(())
    }

    /// Forwards a pointer sample.
    pub fn on_pointer_move(&mut self, x: f32, y: f32, at: Duration) {
        self.current.on_pointer_move(x, y, at);
    }

    /// Forwards an activation.
    pub fn on_interact(&mut self, id: EntityId, at: (f32, f32)) -> bool {
        let handled = self.current.on_interact(id, at);
        if !handled {
            debug!(theme = %self.current.kind(), ?id, "activation ignored");
        }
        handled
    }

    /// The active theme.
    #[must_use]
    pub fn current(&self) -> &Theme<S, K, R> {
        &self.current
    }

    /// Which theme is active.
    #[must_use]
    pub fn kind(&self) -> ThemeKind {
        self.current.kind()
    }

    /// Has the document signalled ready?
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl<S: Surface, K: Scheduler, R: Rng> Dispatch for ThemeStage<S, K, R> {
    fn dispatch(&mut self, wakeup: Wakeup) {
        self.current.dispatch(wakeup);
    }
}

impl<S: Surface, K: Scheduler, R: Rng> Driven for ThemeStage<S, K, R> {
    type Clock = K;

    fn clock(&self) -> &K {
        self.current.clock()
    }

    fn clock_mut(&mut self) -> &mut K {
        self.current.clock_mut()
    }
}
