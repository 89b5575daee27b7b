//! # Browser Scheduler
//!
//! [`Scheduler`] over `setTimeout`, `setInterval` and
//! `requestAnimationFrame`. Each armed timer owns a JS closure that hands
//! its [`Wakeup`] to the dispatch target.
//!
//! A closure must not be dropped while it runs. Fired one-shots and
//! cancelled timers are parked in a graveyard that is emptied at the start
//! of the next firing, when none of them can be on the stack.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::warn;
use valalah_core::{Dispatch, Scheduler, TimerHandle, Wakeup};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// Where fired timers are delivered.
pub type DispatchTarget = Weak<RefCell<dyn Dispatch>>;

/// A live browser timer.
enum Armed {
    Timeout(i32, Closure<dyn FnMut()>),
    Interval(i32, Closure<dyn FnMut()>),
    Frame(i32, Closure<dyn FnMut(f64)>),
}

#[derive(Default)]
struct Timers {
    next_handle: u64,
    armed: HashMap<TimerHandle, Armed>,
    graveyard: Vec<Armed>,
}

impl Timers {
    /// Drops closures parked by earlier firings.
    fn sweep(&mut self) {
        self.graveyard.clear();
    }

    /// A one-shot fired: park it.
    fn retire(&mut self, handle: TimerHandle) {
        self.sweep();
        if let Some(armed) = self.armed.remove(&handle) {
            self.graveyard.push(armed);
        }
    }
}

fn deliver(target: &DispatchTarget, wakeup: Wakeup) {
    let Some(target) = target.upgrade() else {
        return;
    };
    // Timers never nest, so a busy target means a JS callback re-entered.
    match target.try_borrow_mut() {
        Ok(mut target) => target.dispatch(wakeup),
        Err(_) => warn!(?wakeup, "target busy, wakeup dropped"),
    }
}

fn millis(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

/// Browser timers for one theme.
pub struct BrowserScheduler {
    window: Window,
    epoch_ms: f64,
    timers: Rc<RefCell<Timers>>,
    target: DispatchTarget,
}

impl BrowserScheduler {
    /// Creates a scheduler delivering to `target`. Time starts now.
    #[must_use]
    pub fn new(window: Window, target: DispatchTarget) -> Self {
        let epoch_ms = now_ms(&window);
        Self {
            window,
            epoch_ms,
            timers: Rc::new(RefCell::new(Timers::default())),
            target,
        }
    }

    fn next_handle(&self) -> TimerHandle {
        let mut timers = self.timers.borrow_mut();
        timers.next_handle += 1;
        TimerHandle::new(timers.next_handle)
    }

    fn arm(&self, handle: TimerHandle, armed: Result<Armed, wasm_bindgen::JsValue>) {
        match armed {
            Ok(armed) => {
                self.timers.borrow_mut().armed.insert(handle, armed);
            }
            Err(err) => warn!(error = ?err, "browser refused timer"),
        }
    }

    /// Closure for a timer that fires once.
    fn once(&self, handle: TimerHandle, wakeup: Wakeup) -> Closure<dyn FnMut()> {
        let timers = Rc::downgrade(&self.timers);
        let target = self.target.clone();
        Closure::new(move || {
            if let Some(timers) = timers.upgrade() {
                timers.borrow_mut().retire(handle);
            }
            deliver(&target, wakeup);
        })
    }
}

fn now_ms(window: &Window) -> f64 {
    window
        .performance()
        .map_or_else(js_sys::Date::now, |performance| performance.now())
}

impl Scheduler for BrowserScheduler {
    fn now(&self) -> Duration {
        let elapsed = (now_ms(&self.window) - self.epoch_ms).max(0.0);
        Duration::from_secs_f64(elapsed / 1000.0)
    }

    fn after(&mut self, delay: Duration, wakeup: Wakeup) -> TimerHandle {
        let handle = self.next_handle();
        let closure = self.once(handle, wakeup);
        let armed = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis(delay),
            )
            .map(|id| Armed::Timeout(id, closure));
        self.arm(handle, armed);
        handle
    }

    fn every(&mut self, period: Duration, wakeup: Wakeup) -> TimerHandle {
        let handle = self.next_handle();
        let timers = Rc::downgrade(&self.timers);
        let target = self.target.clone();
        let closure: Closure<dyn FnMut()> = Closure::new(move || {
            if let Some(timers) = timers.upgrade() {
                timers.borrow_mut().sweep();
            }
            deliver(&target, wakeup);
        });
        let armed = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis(period).max(1),
            )
            .map(|id| Armed::Interval(id, closure));
        self.arm(handle, armed);
        handle
    }

    fn next_frame(&mut self, wakeup: Wakeup) -> TimerHandle {
        let handle = self.next_handle();
        let timers = Rc::downgrade(&self.timers);
        let target = self.target.clone();
        let closure: Closure<dyn FnMut(f64)> = Closure::new(move |_timestamp: f64| {
            if let Some(timers) = timers.upgrade() {
                timers.borrow_mut().retire(handle);
            }
            deliver(&target, wakeup);
        });
        let armed = self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map(|id| Armed::Frame(id, closure));
        self.arm(handle, armed);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let mut timers = self.timers.borrow_mut();
        let Some(armed) = timers.armed.remove(&handle) else {
            return;
        };
        match &armed {
            Armed::Timeout(id, _) => self.window.clear_timeout_with_handle(*id),
            Armed::Interval(id, _) => self.window.clear_interval_with_handle(*id),
            Armed::Frame(id, _) => {
                let _ = self.window.cancel_animation_frame(*id);
            }
        }
        timers.graveyard.push(armed);
    }
}
