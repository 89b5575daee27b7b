//! # Valalah Core
//!
//! The particle-lifecycle engine behind the Valalah page themes:
//! - A capacity-bounded spawn/expire/dismiss controller for falling particles
//! - A pointer-trail controller with a FIFO trail and a random sparkle emitter
//! - Idempotent teardown that cancels every timer it ever armed
//!
//! ## Architecture Rules
//!
//! 1. **No browser types** - visuals go through [`Surface`], time through [`Scheduler`]
//! 2. **Timers are data** - a fired timer is a [`Wakeup`] handed back to [`Dispatch`]
//! 3. **Capacity is structural** - live entities sit in fixed [`EntitySlots`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use valalah_core::{advance, MemorySurface, ParticleController, SimulatedScheduler, Viewport};
//!
//! let mut snow = ParticleController::new(config, &Viewport::desktop(),
//!     MemorySurface::new(), SimulatedScheduler::new(), rng)?;
//! snow.start();
//! advance(&mut snow, Duration::from_secs(13));
//! assert!(snow.live_count() <= snow.capacity());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod config;
pub mod controller;
pub mod entity;
pub mod ephemeral;
pub mod error;
pub mod sound;
pub mod surface;
pub mod trail;
pub mod variant;

pub use clock::{advance, advance_to, Dispatch, Driven, Scheduler, SimulatedScheduler, TimerHandle, Wakeup};
pub use config::{
    ControllerConfig, InteractionConfig, SoundConfig, TrailConfig, Variant, Viewport,
    MAX_CAPACITY, MAX_INTERVAL_S, NARROW_BREAKPOINT_PX,
};
pub use controller::{ParticleController, Particle, Phase};
pub use entity::{EntityId, EntitySlots, EntityState};
pub use ephemeral::{EphemeralId, Ephemerals};
pub use error::{EffectError, EffectResult};
pub use sound::{OptionalSound, Silence, SilentLoader, Sound, SoundLoader};
pub use surface::{Drawn, Mark, MemorySurface, NodeId, Placement, Sprite, Surface, Timing};
pub use trail::{PointerSample, TrailController};
