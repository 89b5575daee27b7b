//! # Pointer Trail Controller
//!
//! A glow that follows the pointer, a fixed-length trail behind it, and a
//! random sparkle emitter.
//!
//! ```text
//! pointer move ──► position
//!                     │
//! frame ──────────────┼──► glow.place(pos - glow_offset)
//!   │                 └──► trail.push_back(segment)  ── len > max? ──► pop_front ─► fade ─► remove
//!   └── re-arm next frame
//!
//! sparkle tick ── roll(p) ──► sparkle near pos ─► remove after lifetime
//! ```
//!
//! Fading segments and sparkles are decorations: they are never part of the
//! trail length and never block anything.

use std::collections::VecDeque;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::clock::{Dispatch, Driven, Scheduler, TimerHandle, Wakeup};
use crate::config::{TrailConfig, Viewport};
use crate::controller::Phase;
use crate::ephemeral::Ephemerals;
use crate::error::EffectResult;
use crate::surface::{Mark, Placement, Sprite, Surface};
use crate::variant::{jitter, roll};

/// Last pointer sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    /// Page x in px.
    pub x: f32,
    /// Page y in px.
    pub y: f32,
    /// When the sample was taken.
    pub at: Duration,
}

/// The continuous-motion controller.
pub struct TrailController<S: Surface, K: Scheduler, R: Rng> {
    config: TrailConfig,
    surface: S,
    scheduler: K,
    rng: R,
    motion: bool,
    glow: Option<S::Node>,
    trail: VecDeque<S::Node>,
    decorations: Ephemerals<S::Node>,
    pointer: Option<PointerSample>,
    frame: Option<TimerHandle>,
    sparkle: Option<TimerHandle>,
    phase: Phase,
}

impl<S: Surface, K: Scheduler, R: Rng> TrailController<S, K, R> {
    /// Builds a controller. Touch or narrow viewports get the glow only.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidConfig`] for a bad config.
    pub fn new(
        config: TrailConfig,
        viewport: &Viewport,
        surface: S,
        scheduler: K,
        rng: R,
    ) -> EffectResult<Self> {
        config.validate()?;
        let motion = config.motion_enabled(viewport);

        Ok(Self {
            trail: VecDeque::with_capacity(config.max_trail_length + 1),
            config,
            surface,
            scheduler,
            rng,
            motion,
            glow: None,
            decorations: Ephemerals::new(),
            pointer: None,
            frame: None,
            sparkle: None,
            phase: Phase::Idle,
        })
    }

    /// Creates the glow and arms the frame chain (and the sparkle emitter when
    /// motion is enabled). Only valid once, from `Idle`.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            debug!(theme = %self.config.label, phase = ?self.phase, "start ignored");
            return;
        }

        let parking = self.config.glow_parking_px;
        let sprite = Sprite::new(&self.config.glow_class, Placement::Point { x: parking, y: parking });
        match self.surface.create(&sprite) {
            Ok(node) => self.glow = Some(node),
            Err(err) => warn!(theme = %self.config.label, error = %err, "glow unavailable"),
        }

        self.frame = Some(self.scheduler.next_frame(Wakeup::Frame));
        if self.motion {
            let interval = Duration::from_millis(self.config.sparkle_interval_ms);
            self.sparkle = Some(self.scheduler.every(interval, Wakeup::SparkleTick));
        }
        self.phase = Phase::Running;
        // The emitter ticks once at start, then every interval.
        self.on_sparkle_tick();

        info!(theme = %self.config.label, motion = self.motion, "theme started");
    }

    /// Records the latest pointer position.
    pub fn on_pointer_move(&mut self, x: f32, y: f32, at: Duration) {
        if self.phase == Phase::Stopped {
            return;
        }
        self.pointer = Some(PointerSample { x, y, at });
    }

    /// One animation frame: extend the trail, move the glow, re-arm.
    pub fn on_frame(&mut self) {
        if self.phase == Phase::Stopped {
            return;
        }
        if let Some(frame) = self.frame.take() {
            self.scheduler.cancel(frame);
        }

        if let Some(PointerSample { x, y, .. }) = self.pointer {
            if self.motion {
                self.extend_trail(x, y);
            }
            if let Some(glow) = &self.glow {
                let offset = self.config.glow_offset_px;
                self.surface.place(glow, x - offset, y - offset);
            }
        }

        if self.phase == Phase::Running {
            self.frame = Some(self.scheduler.next_frame(Wakeup::Frame));
        }
    }

    /// One sparkle emitter tick.
    pub fn on_sparkle_tick(&mut self) {
        if self.phase != Phase::Running || !self.motion {
            return;
        }
        let Some(PointerSample { x, y, .. }) = self.pointer else {
            return;
        };
        if !roll(&mut self.rng, self.config.sparkle_chance) {
            return;
        }

        let x = x + jitter(&mut self.rng, self.config.sparkle_jitter_px);
        let y = y + jitter(&mut self.rng, self.config.sparkle_jitter_px);
        let sprite = Sprite::new(&self.config.sparkle_class, Placement::Point { x, y });
        match self.surface.create(&sprite) {
            Ok(node) => {
                let lifetime = Duration::from_millis(self.config.sparkle_lifetime_ms);
                self.decorations.track(&mut self.scheduler, node, lifetime);
            }
            Err(err) => {
                warn!(theme = %self.config.label, error = %err, "sparkles disabled");
                self.disable_motion();
            }
        }
    }

    /// Cancels the frame chain and the emitter, removes every node. Idempotent.
    pub fn stop(&mut self) {
        if self.phase == Phase::Stopped {
            return;
        }

        for handle in [self.frame.take(), self.sparkle.take()].into_iter().flatten() {
            self.scheduler.cancel(handle);
        }
        if let Some(glow) = self.glow.take() {
            self.surface.remove(glow);
        }
        for node in self.trail.drain(..) {
            self.surface.remove(node);
        }
        for node in self.decorations.clear(&mut self.scheduler) {
            self.surface.remove(node);
        }
        self.pointer = None;

        self.phase = Phase::Stopped;
        info!(theme = %self.config.label, "theme stopped");
    }

    fn extend_trail(&mut self, x: f32, y: f32) {
        let offset = self.config.trail_offset_px;
        let sprite = Sprite::new(
            &self.config.trail_class,
            Placement::Point {
                x: x - offset,
                y: y - offset,
            },
        );
        let node = match self.surface.create(&sprite) {
            Ok(node) => node,
            Err(err) => {
                warn!(theme = %self.config.label, error = %err, "trail disabled");
                self.disable_motion();
                return;
            }
        };

        self.trail.push_back(node);
        while self.trail.len() > self.config.max_trail_length {
            let Some(oldest) = self.trail.pop_front() else {
                break;
            };
            self.surface.mark(&oldest, Mark::Fading);
            let fade = Duration::from_millis(self.config.fade_ms);
            self.decorations.track(&mut self.scheduler, oldest, fade);
        }
    }

    /// Turns trail and sparkles off for the rest of the session. The glow
    /// keeps following the pointer.
    fn disable_motion(&mut self) {
        self.motion = false;
        if let Some(sparkle) = self.sparkle.take() {
            self.scheduler.cancel(sparkle);
        }
    }

    /// Trail segments currently counted.
    #[must_use]
    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Trail segments, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = &S::Node> {
        self.trail.iter()
    }

    /// Fading segments plus sparkles on screen.
    #[must_use]
    pub fn decoration_count(&self) -> usize {
        self.decorations.len()
    }

    /// The glow node, while running.
    #[must_use]
    pub fn glow(&self) -> Option<&S::Node> {
        self.glow.as_ref()
    }

    /// Are trail and sparkles running?
    #[must_use]
    pub fn motion_enabled(&self) -> bool {
        self.motion
    }

    /// Last pointer sample.
    #[must_use]
    pub fn pointer(&self) -> Option<PointerSample> {
        self.pointer
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    /// The surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: Surface, K: Scheduler, R: Rng> Dispatch for TrailController<S, K, R> {
    fn dispatch(&mut self, wakeup: Wakeup) {
        if self.phase == Phase::Stopped {
            debug!(theme = %self.config.label, ?wakeup, "wakeup after stop ignored");
            return;
        }
        match wakeup {
            Wakeup::Frame => self.on_frame(),
            Wakeup::SparkleTick => self.on_sparkle_tick(),
            Wakeup::DropEphemeral(id) => {
                if let Some(node) = self.decorations.expire(id) {
                    self.surface.remove(node);
                }
            }
            Wakeup::Burst | Wakeup::SpawnTick | Wakeup::Expire(_) | Wakeup::Dismissed(_) => {
                debug!(theme = %self.config.label, ?wakeup, "unexpected wakeup");
            }
        }
    }
}

impl<S: Surface, K: Scheduler, R: Rng> Driven for TrailController<S, K, R> {
    type Clock = K;

    fn clock(&self) -> &K {
        &self.scheduler
    }

    fn clock_mut(&mut self) -> &mut K {
        &mut self.scheduler
    }
}
