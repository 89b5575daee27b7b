//! # Particle Lifecycle Controller
//!
//! Owns a capacity-bounded population of falling particles.
//!
//! ```text
//! start ─► burst (N staggered spawns) ─► steady spawn tick every interval
//!                      │
//!                      ▼
//!   spawn_one ── full? ──► dropped (never queued)
//!       │
//!       ▼
//!    Alive ── lifetime elapsed ─────────────────────────► Removed
//!       │                                                    ▲
//!       └── on_interact ─► Expiring ── dismiss delay ────────┘
//!                            └─► shards (uncounted, fixed lifetime)
//! ```
//!
//! Every transition into `Removed` goes through a state guard, so an entity
//! is released exactly once no matter which path reaches it first.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::clock::{Dispatch, Driven, Scheduler, TimerHandle, Wakeup};
use crate::config::{ControllerConfig, Viewport};
use crate::entity::{EntityId, EntitySlots, EntityState};
use crate::ephemeral::Ephemerals;
use crate::error::EffectResult;
use crate::sound::OptionalSound;
use crate::surface::{Mark, Placement, Sprite, Surface, Timing};
use crate::variant::{choose, jitter, uniform_count, uniform_in};

/// Controller lifecycle. A stopped controller is never restarted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Built, not started.
    #[default]
    Idle,
    /// Spawning.
    Running,
    /// Torn down.
    Stopped,
}

/// One live entity.
#[derive(Debug)]
pub struct Particle<N> {
    /// Visual representation.
    node: N,
    /// Index into the config's variants.
    variant: usize,
    /// Scheduler time at creation.
    spawned_at: Duration,
    /// Time from creation to expiry.
    lifetime: Duration,
    /// Lifecycle state.
    state: EntityState,
    /// Pending expiry, while Alive.
    expiry: Option<TimerHandle>,
    /// Pending removal, while Expiring.
    dismiss: Option<TimerHandle>,
}

impl<N> Particle<N> {
    /// The visual node.
    #[must_use]
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Index of the variant it was drawn with.
    #[must_use]
    pub fn variant(&self) -> usize {
        self.variant
    }

    /// Scheduler time at creation.
    #[must_use]
    pub fn spawned_at(&self) -> Duration {
        self.spawned_at
    }

    /// Drawn lifetime.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Scheduled expiry time.
    #[must_use]
    pub fn expires_at(&self) -> Duration {
        self.spawned_at + self.lifetime
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> EntityState {
        self.state
    }
}

/// The discrete spawn/expire/dismiss controller.
pub struct ParticleController<S: Surface, K: Scheduler, R: Rng> {
    config: ControllerConfig,
    surface: S,
    scheduler: K,
    rng: R,
    sound: OptionalSound,
    particles: EntitySlots<Particle<S::Node>>,
    shards: Ephemerals<S::Node>,
    shards_enabled: bool,
    burst: Vec<TimerHandle>,
    steady: Option<TimerHandle>,
    phase: Phase,
}

impl<S: Surface, K: Scheduler, R: Rng> ParticleController<S, K, R> {
    /// Builds a controller. The viewport picks the capacity, once.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EffectError::InvalidConfig`] for a bad config.
    pub fn new(
        config: ControllerConfig,
        viewport: &Viewport,
        surface: S,
        scheduler: K,
        rng: R,
    ) -> EffectResult<Self> {
        config.validate()?;
        let capacity = config.capacity_for(viewport);

        Ok(Self {
            config,
            surface,
            scheduler,
            rng,
            sound: OptionalSound::none(),
            particles: EntitySlots::new(capacity),
            shards: Ephemerals::new(),
            shards_enabled: true,
            burst: Vec::new(),
            steady: None,
            phase: Phase::Idle,
        })
    }

    /// Attaches the activation sound.
    #[must_use]
    pub fn with_sound(mut self, sound: OptionalSound) -> Self {
        self.sound = sound;
        self
    }

    /// Starts the burst ramp and the steady spawn tick.
    ///
    /// Only valid once, from `Idle`; anything else is ignored.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            debug!(theme = %self.config.label, phase = ?self.phase, "start ignored");
            return;
        }

        let burst = self.config.burst_size.min(self.capacity());
        let stagger = Duration::from_millis(self.config.burst_stagger_ms);
        self.burst = (0..burst)
            .map(|i| {
                #[allow(clippy::cast_possible_truncation)]
                let delay = stagger * i as u32;
                self.scheduler.after(delay, Wakeup::Burst)
            })
            .collect();

        let interval = Duration::from_millis(self.config.spawn_interval_ms);
        self.steady = Some(self.scheduler.every(interval, Wakeup::SpawnTick));
        self.phase = Phase::Running;

        info!(
            theme = %self.config.label,
            capacity = self.capacity(),
            burst,
            "theme started"
        );
    }

    /// Attempts one spawn. Returns the new entity, or `None` if the spawn was
    /// dropped (at capacity, stopped, or the surface refused).
    pub fn spawn_one(&mut self) -> Option<EntityId> {
        if self.phase == Phase::Stopped {
            return None;
        }
        if self.particles.is_full() {
            debug!(theme = %self.config.label, live = self.particles.len(), "at capacity, spawn dropped");
            return None;
        }

        let variant_index = self.rng.gen_range(0..self.config.variants.len());
        let variant = &self.config.variants[variant_index];
        let lifetime_s = uniform_in(&mut self.rng, self.config.lifetime_s);
        let sway_s = self.config.sway_s.map(|range| uniform_in(&mut self.rng, range));
        let left_vw = self.rng.gen_range(0.0..100.0);
        let Ok(lifetime) = Duration::try_from_secs_f32(lifetime_s) else {
            warn!(theme = %self.config.label, lifetime_s, "unrepresentable lifetime, spawn dropped");
            return None;
        };

        let sprite = Sprite {
            class: &self.config.class,
            glyph: Some(&variant.glyph),
            tint: variant.tint.as_deref(),
            placement: Placement::Column { left_vw },
            timing: Some(Timing {
                primary_s: lifetime_s,
                secondary_s: sway_s,
            }),
            drift: None,
        };
        let node = match self.surface.create(&sprite) {
            Ok(node) => node,
            Err(err) => {
                warn!(theme = %self.config.label, error = %err, "spawn failed");
                return None;
            }
        };

        let particle = Particle {
            node,
            variant: variant_index,
            spawned_at: self.scheduler.now(),
            lifetime,
            state: EntityState::Alive,
            expiry: None,
            dismiss: None,
        };
        let id = match self.particles.insert(particle) {
            Ok(id) => id,
            Err(particle) => {
                self.surface.remove(particle.node);
                return None;
            }
        };

        let expiry = self.scheduler.after(lifetime, Wakeup::Expire(id));
        if let Some(particle) = self.particles.get_mut(id) {
            particle.expiry = Some(expiry);
            if self.config.interaction.is_some() {
                self.surface.attach(&particle.node, id);
            }
        }
        Some(id)
    }

    /// Natural expiry. No-op unless the entity is still Alive.
    pub fn on_expiry(&mut self, id: EntityId) -> bool {
        let alive = self
            .particles
            .get(id)
            .is_some_and(|p| p.state == EntityState::Alive);
        if !alive {
            return false;
        }
        self.release(id)
    }

    /// Click-to-dismiss. Cancels the expiry, cracks the entity, throws shards
    /// at `at`, and schedules removal after the dismiss delay.
    ///
    /// Returns false if this theme has no interaction or the entity is not
    /// Alive.
    pub fn on_interact(&mut self, id: EntityId, at: (f32, f32)) -> bool {
        if self.phase == Phase::Stopped {
            return false;
        }
        let Some(interaction) = self.config.interaction.as_ref() else {
            return false;
        };
        let Some(particle) = self.particles.get_mut(id) else {
            return false;
        };
        if !particle.state.begin_expiring() {
            return false;
        }

        if let Some(expiry) = particle.expiry.take() {
            self.scheduler.cancel(expiry);
        }
        self.surface.mark(&particle.node, Mark::Cracked);
        self.sound.play();

        if self.shards_enabled {
            let count = uniform_count(&mut self.rng, interaction.shard_count);
            let lifetime = Duration::from_millis(interaction.shard_lifetime_ms);
            for _ in 0..count {
                let glyph = choose(&mut self.rng, &interaction.shard_glyphs).map(String::as_str);
                let drift = (
                    jitter(&mut self.rng, interaction.shard_spread_px),
                    jitter(&mut self.rng, interaction.shard_spread_px),
                );
                let sprite = Sprite {
                    glyph,
                    drift: Some(drift),
                    ..Sprite::new(&interaction.shard_class, Placement::Point { x: at.0, y: at.1 })
                };
                match self.surface.create(&sprite) {
                    Ok(node) => {
                        self.shards.track(&mut self.scheduler, node, lifetime);
                    }
                    Err(err) => {
                        warn!(theme = %self.config.label, error = %err, "shards disabled");
                        self.shards_enabled = false;
                        break;
                    }
                }
            }
        }

        let delay = Duration::from_millis(interaction.dismiss_delay_ms);
        particle.dismiss = Some(self.scheduler.after(delay, Wakeup::Dismissed(id)));
        true
    }

    /// Ends a dismissal. No-op unless the entity is Expiring.
    pub fn finish_dismiss(&mut self, id: EntityId) -> bool {
        let expiring = self
            .particles
            .get(id)
            .is_some_and(|p| p.state == EntityState::Expiring);
        if !expiring {
            return false;
        }
        self.release(id)
    }

    /// Cancels every timer, removes every node, zeroes the count. Idempotent.
    pub fn stop(&mut self) {
        if self.phase == Phase::Stopped {
            return;
        }

        if let Some(steady) = self.steady.take() {
            self.scheduler.cancel(steady);
        }
        for handle in self.burst.drain(..) {
            self.scheduler.cancel(handle);
        }
        for particle in self.particles.drain() {
            if let Some(expiry) = particle.expiry {
                self.scheduler.cancel(expiry);
            }
            if let Some(dismiss) = particle.dismiss {
                self.scheduler.cancel(dismiss);
            }
            self.surface.remove(particle.node);
        }
        for node in self.shards.clear(&mut self.scheduler) {
            self.surface.remove(node);
        }

        self.phase = Phase::Stopped;
        info!(theme = %self.config.label, "theme stopped");
    }

    /// Takes the entity out of its slot and removes its node, exactly once.
    fn release(&mut self, id: EntityId) -> bool {
        let Some(mut particle) = self.particles.remove(id) else {
            return false;
        };
        for handle in [particle.expiry.take(), particle.dismiss.take()].into_iter().flatten() {
            self.scheduler.cancel(handle);
        }
        particle.state.finish();
        self.surface.remove(particle.node);
        true
    }

    /// Currently live entities (Alive or Expiring).
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    /// Concurrent entity cap chosen at construction.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.particles.capacity()
    }

    /// State of an entity. Unknown or stale IDs are `Removed`.
    #[must_use]
    pub fn state_of(&self, id: EntityId) -> EntityState {
        self.particles.get(id).map_or(EntityState::Removed, |p| p.state)
    }

    /// Looks up a live entity.
    #[must_use]
    pub fn particle(&self, id: EntityId) -> Option<&Particle<S::Node>> {
        self.particles.get(id)
    }

    /// IDs of every live entity.
    #[must_use]
    pub fn live_ids(&self) -> Vec<EntityId> {
        self.particles.iter().map(|(id, _)| id).collect()
    }

    /// Shards still on screen.
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Is the activation sound still enabled?
    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound.is_enabled()
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
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

impl<S: Surface, K: Scheduler, R: Rng> Dispatch for ParticleController<S, K, R> {
    fn dispatch(&mut self, wakeup: Wakeup) {
        if self.phase == Phase::Stopped {
            debug!(theme = %self.config.label, ?wakeup, "wakeup after stop ignored");
            return;
        }
        match wakeup {
            Wakeup::Burst | Wakeup::SpawnTick => {
                self.spawn_one();
            }
            Wakeup::Expire(id) => {
                self.on_expiry(id);
            }
            Wakeup::Dismissed(id) => {
                self.finish_dismiss(id);
            }
            Wakeup::DropEphemeral(id) => {
                if let Some(node) = self.shards.expire(id) {
                    self.surface.remove(node);
                }
            }
            Wakeup::Frame | Wakeup::SparkleTick => {
                debug!(theme = %self.config.label, ?wakeup, "unexpected wakeup");
            }
        }
    }
}

impl<S: Surface, K: Scheduler, R: Rng> Driven for ParticleController<S, K, R> {
    type Clock = K;

    fn clock(&self) -> &K {
        &self.scheduler
    }

    fn clock_mut(&mut self) -> &mut K {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{advance, SimulatedScheduler};
    use crate::config::{InteractionConfig, Variant};
    use crate::surface::MemorySurface;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    type TestController = ParticleController<MemorySurface, SimulatedScheduler, ChaCha8Rng>;

    fn config(capacity: usize) -> ControllerConfig {
        ControllerConfig {
            label: "Test".into(),
            class: "snowflake".into(),
            capacity,
            narrow_capacity: capacity,
            narrow_breakpoint_px: 768.0,
            spawn_interval_ms: 100,
            lifetime_s: [8.0, 12.0],
            sway_s: None,
            burst_size: 10,
            burst_stagger_ms: 100,
            variants: vec![Variant::glyph("❄"), Variant::glyph("❅")],
            interaction: None,
        }
    }

    fn interactive(capacity: usize) -> ControllerConfig {
        ControllerConfig {
            interaction: Some(InteractionConfig {
                dismiss_delay_ms: 300,
                shard_class: "chocolate-piece".into(),
                shard_glyphs: vec!["🍫".into()],
                shard_count: [5, 7],
                shard_spread_px: 100.0,
                shard_lifetime_ms: 1000,
                sound: None,
            }),
            ..config(capacity)
        }
    }

    fn controller(config: ControllerConfig) -> TestController {
        ParticleController::new(
            config,
            &Viewport::desktop(),
            MemorySurface::new(),
            SimulatedScheduler::new(),
            ChaCha8Rng::seed_from_u64(42),
        )
        .unwrap()
    }

    #[test]
    fn test_spawns_past_capacity_are_dropped() {
        let mut c = controller(config(3));
        let spawned: Vec<_> = (0..5).map(|_| c.spawn_one()).collect();

        assert_eq!(c.live_count(), 3);
        assert!(spawned[..3].iter().all(Option::is_some));
        assert!(spawned[3..].iter().all(Option::is_none));
        assert_eq!(c.surface().live_count(), 3);
    }

    #[test]
    fn test_single_spawn_expires() {
        let mut c = controller(config(3));
        let id = c.spawn_one().unwrap();
        let lifetime = c.particle(id).unwrap().lifetime();
        assert!(lifetime >= Duration::from_secs(8) && lifetime <= Duration::from_secs(12));

        advance(&mut c, Duration::from_secs(13));

        assert_eq!(c.state_of(id), EntityState::Removed);
        assert_eq!(c.live_count(), 0);
        assert_eq!(c.surface().live_count(), 0);
    }

    #[test]
    fn test_expiry_fires_exactly_at_lifetime() {
        let mut c = controller(config(3));
        let id = c.spawn_one().unwrap();
        let expires_at = c.particle(id).unwrap().expires_at();

        crate::clock::advance_to(&mut c, expires_at - Duration::from_millis(1));
        assert_eq!(c.state_of(id), EntityState::Alive);

        crate::clock::advance_to(&mut c, expires_at);
        assert_eq!(c.state_of(id), EntityState::Removed);
    }

    #[test]
    fn test_burst_is_staggered() {
        let mut c = controller(config(30));
        c.start();

        // Burst spawn 0 fires at t=0, spawn i at i * 100ms
        advance(&mut c, Duration::ZERO);
        assert_eq!(c.live_count(), 1);

        advance(&mut c, Duration::from_millis(450));
        // 5 burst spawns (0..=400ms) + 4 steady ticks (100..=400ms)
        assert_eq!(c.live_count(), 9);
    }

    #[test]
    fn test_burst_capped_by_capacity() {
        let mut c = controller(config(2));
        c.start();
        advance(&mut c, Duration::from_millis(50));
        assert_eq!(c.live_count(), 1);
        advance(&mut c, Duration::from_secs(5));
        assert_eq!(c.live_count(), 2);
    }

    #[test]
    fn test_stop_twice() {
        let mut c = controller(config(5));
        c.start();
        advance(&mut c, Duration::from_secs(2));
        assert!(c.live_count() > 0);

        c.stop();
        assert_eq!(c.live_count(), 0);
        c.stop();
        assert_eq!(c.live_count(), 0);
        assert_eq!(c.surface().live_count(), 0);
    }

    #[test]
    fn test_nothing_fires_after_stop() {
        let mut c = controller(interactive(5));
        c.start();
        advance(&mut c, Duration::from_secs(1));
        let id = c.live_ids()[0];
        assert!(c.on_interact(id, (100.0, 100.0)));

        c.stop();
        assert_eq!(c.clock().pending(), 0);

        let created = c.surface().created_count();
        assert_eq!(advance(&mut c, Duration::from_secs(60)), 0);
        assert_eq!(c.live_count(), 0);
        assert_eq!(c.shard_count(), 0);
        assert_eq!(c.surface().created_count(), created);
    }

    #[test]
    fn test_start_after_stop_is_ignored() {
        let mut c = controller(config(5));
        c.start();
        c.stop();
        c.start();
        assert_eq!(c.phase(), Phase::Stopped);
        assert_eq!(c.clock().pending(), 0);
        assert!(c.spawn_one().is_none());
    }

    #[test]
    fn test_interact_removes_once() {
        let mut c = controller(interactive(3));
        let id = c.spawn_one().unwrap();

        assert!(c.on_interact(id, (10.0, 20.0)));
        assert_eq!(c.state_of(id), EntityState::Expiring);
        assert_eq!(c.live_count(), 1);
        assert!((5..=7).contains(&c.shard_count()));

        // Second click while cracking does nothing
        assert!(!c.on_interact(id, (10.0, 20.0)));

        advance(&mut c, Duration::from_millis(300));
        assert_eq!(c.state_of(id), EntityState::Removed);
        assert_eq!(c.live_count(), 0);

        // Expiry never fires for a dismissed entity
        assert!(!c.on_expiry(id));
        advance(&mut c, Duration::from_secs(20));
        assert_eq!(c.live_count(), 0);
        assert_eq!(c.shard_count(), 0);
    }

    #[test]
    fn test_late_expiry_during_dismiss_is_noop() {
        let mut c = controller(interactive(3));
        let id = c.spawn_one().unwrap();
        let other = c.spawn_one().unwrap();
        assert!(c.on_interact(id, (0.0, 0.0)));

        // A stray expiry for the cracking entity must not release it early
        c.dispatch(Wakeup::Expire(id));
        assert_eq!(c.state_of(id), EntityState::Expiring);
        assert_eq!(c.live_count(), 2);

        advance(&mut c, Duration::from_millis(300));
        assert_eq!(c.live_count(), 1);
        assert_eq!(c.state_of(other), EntityState::Alive);
    }

    #[test]
    fn test_interact_without_interaction_config() {
        let mut c = controller(config(3));
        let id = c.spawn_one().unwrap();
        assert!(!c.on_interact(id, (0.0, 0.0)));
        assert_eq!(c.state_of(id), EntityState::Alive);
    }

    #[test]
    fn test_interactive_nodes_are_tagged() {
        let mut c = controller(interactive(3));
        let id = c.spawn_one().unwrap();
        let node = *c.particle(id).unwrap().node();
        assert_eq!(c.surface().get(node).unwrap().entity, Some(id));
    }

    #[test]
    fn test_surface_failure_is_not_retried() {
        let mut c = controller(config(3));
        c.surface_mut().fail_next(1);

        assert!(c.spawn_one().is_none());
        assert_eq!(c.live_count(), 0);
        assert!(c.spawn_one().is_some());
        assert_eq!(c.live_count(), 1);
    }

    #[test]
    fn test_shard_failure_disables_shards() {
        let mut c = controller(interactive(3));
        let first = c.spawn_one().unwrap();
        let second = c.spawn_one().unwrap();

        c.surface_mut().fail_next(1);
        assert!(c.on_interact(first, (0.0, 0.0)));
        assert_eq!(c.shard_count(), 0);

        assert!(c.on_interact(second, (0.0, 0.0)));
        assert_eq!(c.shard_count(), 0);

        advance(&mut c, Duration::from_millis(300));
        assert_eq!(c.live_count(), 0);
    }
}
