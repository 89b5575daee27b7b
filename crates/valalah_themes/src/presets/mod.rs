//! # Built-in Presets
//!
//! | theme  | cap (wide/narrow) | interval | lifetime | burst        | secondary |
//! |--------|-------------------|----------|----------|--------------|-----------|
//! | autumn | 25 / 12           | 400 ms   | 10-14 s  | 8 @ 150 ms   | sway 3-5 s |
//! | winter | 30 / 15           | 300 ms   | 8-12 s   | 10 @ 100 ms  | sway 3 s   |
//! | easter | 20 / 10           | 500 ms   | 9-12 s   | 6 @ 200 ms   | wobble 0.8-1.2 s |
//!
//! Summer has no capacity: a 15 segment trail and a sparkle every 500 ms at
//! 30% odds.

pub mod autumn;
pub mod easter;
pub mod summer;
pub mod winter;

use valalah_core::ControllerConfig;

use crate::kind::ThemeKind;

/// Built-in controller config for a falling theme. `None` for summer.
#[must_use]
pub fn falling(kind: ThemeKind) -> Option<ControllerConfig> {
    match kind {
        ThemeKind::Autumn => Some(autumn::config()),
        ThemeKind::Winter => Some(winter::config()),
        ThemeKind::Easter => Some(easter::config()),
        ThemeKind::Summer => None,
    }
}
