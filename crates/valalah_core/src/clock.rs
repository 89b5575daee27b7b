//! # Scheduling
//!
//! Controllers never touch wall-clock time. They arm timers through a
//! [`Scheduler`] and receive a [`Wakeup`] back through [`Dispatch`] when the
//! timer fires.
//!
//! ```text
//! Controller ── after/every/next_frame ──► Scheduler
//!     ▲                                         │
//!     └──────────── dispatch(Wakeup) ◄──────────┘
//! ```
//!
//! In the browser the scheduler wraps `setTimeout`, `setInterval` and
//! `requestAnimationFrame`. In tests it is a [`SimulatedScheduler`] whose
//! clock only moves when told to.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

use crate::entity::EntityId;
use crate::ephemeral::EphemeralId;

/// Handle to an armed timer. Cancelling a handle that already fired is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Creates a handle from a scheduler-assigned number.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the scheduler-assigned number.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// What a fired timer asks its controller to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Wakeup {
    /// One staggered spawn of the start-up burst.
    Burst,
    /// Steady-state spawn attempt.
    SpawnTick,
    /// An entity's lifetime ran out.
    Expire(EntityId),
    /// A dismissed entity's removal animation finished.
    Dismissed(EntityId),
    /// An uncounted decoration reached its end.
    DropEphemeral(EphemeralId),
    /// Animation frame.
    Frame,
    /// Sparkle emitter tick.
    SparkleTick,
}

/// Timer source used by the controllers.
pub trait Scheduler {
    /// Time since the scheduler's epoch.
    fn now(&self) -> Duration;

    /// Fires `wakeup` once, `delay` from now.
    fn after(&mut self, delay: Duration, wakeup: Wakeup) -> TimerHandle;

    /// Fires `wakeup` every `period` until cancelled.
    fn every(&mut self, period: Duration, wakeup: Wakeup) -> TimerHandle;

    /// Fires `wakeup` once, on the next animation frame.
    fn next_frame(&mut self, wakeup: Wakeup) -> TimerHandle;

    /// Disarms a timer. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Anything that reacts to fired timers.
pub trait Dispatch {
    /// Handles one fired timer.
    fn dispatch(&mut self, wakeup: Wakeup);
}

/// A dispatch target that owns its scheduler.
pub trait Driven: Dispatch {
    /// The scheduler type.
    type Clock: Scheduler;

    /// Shared access to the scheduler.
    fn clock(&self) -> &Self::Clock;

    /// Exclusive access to the scheduler.
    fn clock_mut(&mut self) -> &mut Self::Clock;
}

/// Moves a simulated target forward by `dt`, dispatching every timer that
/// comes due on the way, in deadline order. Returns the number dispatched.
pub fn advance<D>(target: &mut D, dt: Duration) -> usize
where
    D: Driven<Clock = SimulatedScheduler>,
{
    let until = target.clock().now() + dt;
    advance_to(target, until)
}

/// Like [`advance`], with an absolute deadline.
pub fn advance_to<D>(target: &mut D, until: Duration) -> usize
where
    D: Driven<Clock = SimulatedScheduler>,
{
    let mut fired = 0;
    while let Some(wakeup) = target.clock_mut().pop_due(until) {
        target.dispatch(wakeup);
        fired += 1;
    }
    target.clock_mut().settle(until);
    fired
}

/// A queued firing.
#[derive(Debug)]
struct Pending {
    deadline: Duration,
    /// Arming order, breaks deadline ties.
    seq: u64,
    handle: TimerHandle,
    wakeup: Wakeup,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed: BinaryHeap is a max-heap, we want the earliest deadline on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Deterministic scheduler for tests and headless runs.
///
/// Time starts at zero and only moves through [`advance`]/[`advance_to`]
/// (or [`SimulatedScheduler::pop_due`] + [`SimulatedScheduler::settle`]).
/// Animation frames fire every `frame_period`.
#[derive(Debug)]
pub struct SimulatedScheduler {
    now: Duration,
    frame_period: Duration,
    next_handle: u64,
    next_seq: u64,
    queue: BinaryHeap<Pending>,
    /// Armed handles and their repeat period, if any.
    armed: HashMap<TimerHandle, Option<Duration>>,
}

impl SimulatedScheduler {
    /// ~60fps.
    pub const DEFAULT_FRAME_PERIOD: Duration = Duration::from_micros(16_667);

    /// Creates a scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::with_frame_period(Self::DEFAULT_FRAME_PERIOD)
    }

    /// Creates a scheduler with a custom animation frame period.
    #[must_use]
    pub fn with_frame_period(frame_period: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            frame_period,
            next_handle: 1,
            next_seq: 0,
            queue: BinaryHeap::new(),
            armed: HashMap::new(),
        }
    }

    /// Number of armed timers (repeating timers count once).
    #[must_use]
    pub fn pending(&self) -> usize {
        self.armed.len()
    }

    /// Is this handle still armed?
    #[must_use]
    pub fn is_armed(&self, handle: TimerHandle) -> bool {
        self.armed.contains_key(&handle)
    }

    /// Earliest armed deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue
            .iter()
            .filter(|p| self.armed.contains_key(&p.handle))
            .map(|p| p.deadline)
            .min()
    }

    /// Pops the next timer due at or before `until`, moving the clock to its
    /// deadline. Repeating timers are re-queued one period later.
    pub fn pop_due(&mut self, until: Duration) -> Option<Wakeup> {
        loop {
            let top = self.queue.peek()?;
            if top.deadline > until {
                return None;
            }
            let pending = self.queue.pop()?;

            // Cancelled timers stay queued until they surface here.
            let Some(repeat) = self.armed.get(&pending.handle).copied() else {
                continue;
            };

            self.now = self.now.max(pending.deadline);
            match repeat {
                Some(period) => {
                    let deadline = pending.deadline + period;
                    self.push(deadline, pending.handle, pending.wakeup);
                }
                None => {
                    self.armed.remove(&pending.handle);
                }
            }
            return Some(pending.wakeup);
        }
    }

    /// Moves the clock to `until` without firing anything.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn arm(&mut self, delay: Duration, repeat: Option<Duration>, wakeup: Wakeup) -> TimerHandle {
        let handle = TimerHandle::new(self.next_handle);
        self.next_handle += 1;
        self.armed.insert(handle, repeat);
        self.push(self.now + delay, handle, wakeup);
        handle
    }

    fn push(&mut self, deadline: Duration, handle: TimerHandle, wakeup: Wakeup) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Pending {
            deadline,
            seq,
            handle,
            wakeup,
        });
    }
}

impl Default for SimulatedScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for SimulatedScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn after(&mut self, delay: Duration, wakeup: Wakeup) -> TimerHandle {
        self.arm(delay, None, wakeup)
    }

    fn every(&mut self, period: Duration, wakeup: Wakeup) -> TimerHandle {
        // A zero period would spin forever inside a single advance.
        let period = period.max(Duration::from_millis(1));
        self.arm(period, Some(period), wakeup)
    }

    fn next_frame(&mut self, wakeup: Wakeup) -> TimerHandle {
        self.arm(self.frame_period, None, wakeup)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.armed.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records everything it is woken with.
    struct Recorder {
        clock: SimulatedScheduler,
        seen: Vec<(Duration, Wakeup)>,
    }

    impl Dispatch for Recorder {
        fn dispatch(&mut self, wakeup: Wakeup) {
            self.seen.push((self.clock.now(), wakeup));
        }
    }

    impl Driven for Recorder {
        type Clock = SimulatedScheduler;

        fn clock(&self) -> &SimulatedScheduler {
            &self.clock
        }

        fn clock_mut(&mut self) -> &mut SimulatedScheduler {
            &mut self.clock
        }
    }

    fn recorder() -> Recorder {
        Recorder {
            clock: SimulatedScheduler::new(),
            seen: Vec::new(),
        }
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut r = recorder();
        r.clock.after(Duration::from_millis(300), Wakeup::Frame);
        r.clock.after(Duration::from_millis(100), Wakeup::Burst);
        r.clock.after(Duration::from_millis(200), Wakeup::SpawnTick);

        assert_eq!(advance(&mut r, Duration::from_secs(1)), 3);
        let order: Vec<_> = r.seen.iter().map(|(_, w)| *w).collect();
        assert_eq!(order, vec![Wakeup::Burst, Wakeup::SpawnTick, Wakeup::Frame]);
        assert_eq!(r.seen[0].0, Duration::from_millis(100));
        assert_eq!(r.clock.now(), Duration::from_secs(1));
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut r = recorder();
        let handle = r.clock.after(Duration::from_millis(50), Wakeup::Burst);
        r.clock.cancel(handle);

        assert_eq!(advance(&mut r, Duration::from_secs(1)), 0);
        assert_eq!(r.clock.pending(), 0);
        assert!(r.clock.next_deadline().is_none());
    }

    #[test]
    fn test_repeating_timer() {
        let mut r = recorder();
        let handle = r.clock.every(Duration::from_millis(100), Wakeup::SpawnTick);

        assert_eq!(advance(&mut r, Duration::from_millis(350)), 3);
        assert!(r.clock.is_armed(handle));

        r.clock.cancel(handle);
        assert_eq!(advance(&mut r, Duration::from_secs(5)), 0);
    }

    #[test]
    fn test_timer_not_due_stays_queued() {
        let mut r = recorder();
        r.clock.after(Duration::from_millis(500), Wakeup::Frame);

        assert_eq!(advance(&mut r, Duration::from_millis(499)), 0);
        assert_eq!(r.clock.next_deadline(), Some(Duration::from_millis(500)));
        assert_eq!(advance(&mut r, Duration::from_millis(1)), 1);
    }
}
