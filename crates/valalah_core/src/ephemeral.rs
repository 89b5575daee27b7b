//! # Ephemeral Decorations
//!
//! Short-lived nodes that never count against a controller's capacity:
//! chocolate shards, sparkles, fading trail segments. Each one has exactly
//! one cleanup timer, and `clear` disarms every timer before handing the
//! nodes back for removal.

use std::collections::HashMap;
use std::time::Duration;

use crate::clock::{Scheduler, TimerHandle, Wakeup};

/// Identifier of an ephemeral decoration. Never reused within a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EphemeralId(u64);

/// Tracks decorations and their cleanup timers.
#[derive(Debug)]
pub struct Ephemerals<N> {
    next_id: u64,
    live: HashMap<EphemeralId, (N, TimerHandle)>,
}

impl<N> Ephemerals<N> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            live: HashMap::new(),
        }
    }

    /// Number of decorations still on screen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// True when nothing is on screen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Takes ownership of `node` and arms its cleanup `ttl` from now.
    pub fn track<K: Scheduler>(&mut self, scheduler: &mut K, node: N, ttl: Duration) -> EphemeralId {
        let id = EphemeralId(self.next_id);
        self.next_id += 1;
        let handle = scheduler.after(ttl, Wakeup::DropEphemeral(id));
        self.live.insert(id, (node, handle));
        id
    }

    /// Releases a decoration whose timer fired. `None` if already gone.
    pub fn expire(&mut self, id: EphemeralId) -> Option<N> {
        self.live.remove(&id).map(|(node, _)| node)
    }

    /// Disarms every cleanup timer and returns all nodes.
    pub fn clear<K: Scheduler>(&mut self, scheduler: &mut K) -> Vec<N> {
        self.live
            .drain()
            .map(|(_, (node, handle))| {
                scheduler.cancel(handle);
                node
            })
            .collect()
    }
}

impl<N> Default for Ephemerals<N> {
    fn default() -> Self {
        Self::new()
    }
}
