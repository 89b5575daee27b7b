//! # Lifecycle Verification Tests
//!
//! End-to-end properties of the controllers on the simulated clock:
//!
//! 1. **Capacity**: the live count never exceeds capacity under random load
//! 2. **Teardown**: stop is idempotent and nothing fires afterwards
//! 3. **Exactly once**: every entity is removed once, by expiry or by dismiss
//! 4. **FIFO trail**: evictions happen oldest first
//!
//! Run with: cargo test -p valalah_core --test lifecycle_test

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use valalah_core::{
    advance, ControllerConfig, Dispatch, Driven, EntityState, InteractionConfig, MemorySurface,
    ParticleController, Scheduler, SimulatedScheduler, TrailConfig, TrailController, Variant,
    Viewport, NARROW_BREAKPOINT_PX,
};

type Falling = ParticleController<MemorySurface, SimulatedScheduler, ChaCha8Rng>;

fn eggs(capacity: usize) -> ControllerConfig {
    ControllerConfig {
        label: "Easter Eggs".into(),
        class: "easter-egg".into(),
        capacity,
        narrow_capacity: capacity / 2 + 1,
        narrow_breakpoint_px: NARROW_BREAKPOINT_PX,
        spawn_interval_ms: 100,
        lifetime_s: [2.0, 4.0],
        sway_s: Some([0.8, 1.2]),
        burst_size: 6,
        burst_stagger_ms: 200,
        variants: vec![Variant::glyph("🥚"), Variant::glyph("🐣")],
        interaction: Some(InteractionConfig {
            dismiss_delay_ms: 300,
            shard_class: "chocolate-piece".into(),
            shard_glyphs: vec!["🍫".into(), "🍬".into(), "🍭".into()],
            shard_count: [5, 7],
            shard_spread_px: 100.0,
            shard_lifetime_ms: 1000,
            sound: None,
        }),
    }
}

fn falling(config: ControllerConfig, seed: u64) -> Falling {
    ParticleController::new(
        config,
        &Viewport::desktop(),
        MemorySurface::new(),
        SimulatedScheduler::new(),
        ChaCha8Rng::seed_from_u64(seed),
    )
    .unwrap()
}

/// Drives the controller one wakeup at a time, checking capacity after each.
fn step_checked(c: &mut Falling, dt: Duration) {
    let until = c.clock().now() + dt;
    while let Some(wakeup) = c.clock_mut().pop_due(until) {
        c.dispatch(wakeup);
        assert!(c.live_count() <= c.capacity(), "over capacity after {wakeup:?}");
    }
    c.clock_mut().settle(until);
}

// ============================================================================
// CAPACITY
// ============================================================================

#[test]
fn test_capacity_holds_under_random_clicks() {
    for seed in 0..8 {
        let mut c = falling(eggs(7), seed);
        let mut chaos = ChaCha8Rng::seed_from_u64(seed + 100);
        c.start();

        for _ in 0..400 {
            step_checked(&mut c, Duration::from_millis(chaos.gen_range(1..250)));

            let ids = c.live_ids();
            if !ids.is_empty() && chaos.gen_bool(0.4) {
                let id = ids[chaos.gen_range(0..ids.len())];
                c.on_interact(id, (chaos.gen_range(0.0..1280.0), chaos.gen_range(0.0..800.0)));
            }
            assert!(c.live_count() <= c.capacity());
            assert_eq!(c.surface().count_class("easter-egg"), c.live_count());
        }
        c.stop();
    }
}

#[test]
fn test_capacity_three_five_spawns() {
    let mut config = eggs(3);
    config.interaction = None;
    let mut c = falling(config, 1);

    for _ in 0..5 {
        c.spawn_one();
    }
    assert_eq!(c.live_count(), 3);
}

#[test]
fn test_narrow_viewport_uses_narrow_capacity() {
    let c = ParticleController::new(
        eggs(20),
        &Viewport::phone(),
        MemorySurface::new(),
        SimulatedScheduler::new(),
        ChaCha8Rng::seed_from_u64(0),
    )
    .unwrap();
    assert_eq!(c.capacity(), 11);
}

// ============================================================================
// TEARDOWN
// ============================================================================

#[test]
fn test_stop_is_final() {
    let mut c = falling(eggs(10), 3);
    c.start();
    step_checked(&mut c, Duration::from_secs(3));
    for id in c.live_ids().into_iter().take(2) {
        c.on_interact(id, (0.0, 0.0));
    }

    c.stop();
    c.stop();
    assert_eq!(c.live_count(), 0);
    assert_eq!(c.surface().live_count(), 0);
    assert_eq!(c.clock().pending(), 0);

    let removed = c.surface().removed().len();
    assert_eq!(advance(&mut c, Duration::from_secs(120)), 0);
    assert_eq!(c.surface().removed().len(), removed);
    assert_eq!(c.live_count(), 0);
}

// ============================================================================
// EXACTLY ONCE
// ============================================================================

#[test]
fn test_every_node_removed_once() {
    let mut c = falling(eggs(8), 9);
    let mut chaos = ChaCha8Rng::seed_from_u64(77);
    c.start();

    for _ in 0..200 {
        step_checked(&mut c, Duration::from_millis(97));
        let ids = c.live_ids();
        if let Some(&id) = ids.first() {
            if chaos.gen_bool(0.5) {
                c.on_interact(id, (10.0, 10.0));
            }
        }
    }
    c.stop();

    let removed = c.surface().removed();
    let mut unique = removed.to_vec();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), removed.len());
    assert_eq!(removed.len() as u64, c.surface().created_count());
}

#[test]
fn test_dismiss_after_expiry_scheduled() {
    let mut c = falling(eggs(4), 11);
    let id = c.spawn_one().unwrap();
    let expires_at = c.particle(id).unwrap().expires_at();

    // Click 100ms before the natural expiry
    valalah_core::advance_to(&mut c, expires_at - Duration::from_millis(100));
    assert!(c.on_interact(id, (5.0, 5.0)));

    // The natural expiry deadline passes without effect
    valalah_core::advance_to(&mut c, expires_at);
    assert_eq!(c.state_of(id), EntityState::Expiring);
    assert_eq!(c.live_count(), 1);

    advance(&mut c, Duration::from_millis(200));
    assert_eq!(c.state_of(id), EntityState::Removed);
    assert_eq!(c.live_count(), 0);
}

#[test]
fn test_lifetime_eight_to_twelve() {
    let mut config = eggs(3);
    config.lifetime_s = [8.0, 12.0];
    let mut c = falling(config, 21);

    let id = c.spawn_one().unwrap();
    advance(&mut c, Duration::from_secs(13));
    assert_eq!(c.state_of(id), EntityState::Removed);
    assert_eq!(c.live_count(), 0);
}

// ============================================================================
// FIFO TRAIL
// ============================================================================

#[test]
fn test_trail_keeps_last_k_positions() {
    let config = TrailConfig {
        label: "Summer Glow".into(),
        glow_class: "glow-center".into(),
        trail_class: "glow-trail".into(),
        sparkle_class: "glow-sparkle".into(),
        max_trail_length: 15,
        trail_offset_px: 10.0,
        glow_offset_px: 20.0,
        glow_parking_px: -100.0,
        fade_ms: 300,
        sparkle_interval_ms: 500,
        sparkle_chance: 0.3,
        sparkle_jitter_px: 30.0,
        sparkle_lifetime_ms: 1000,
        narrow_breakpoint_px: NARROW_BREAKPOINT_PX,
    };
    let mut t = TrailController::new(
        config,
        &Viewport::desktop(),
        MemorySurface::new(),
        SimulatedScheduler::new(),
        ChaCha8Rng::seed_from_u64(2),
    )
    .unwrap();
    t.start();

    for i in 0..40u16 {
        let x = f32::from(i);
        t.on_pointer_move(x, x, t.clock().now());
        advance(&mut t, SimulatedScheduler::DEFAULT_FRAME_PERIOD);
        assert!(t.trail_len() <= 15);
    }

    assert_eq!(t.trail_len(), 15);
    let xs: Vec<f32> = t
        .trail()
        .map(|node| match t.surface().get(*node).unwrap().placement {
            valalah_core::Placement::Point { x, .. } => x,
            valalah_core::Placement::Column { .. } => f32::NAN,
        })
        .collect();
    let expected: Vec<f32> = (25..40u16).map(|i| f32::from(i) - 10.0).collect();
    assert_eq!(xs, expected);

    t.stop();
    assert_eq!(t.surface().live_count(), 0);
}
