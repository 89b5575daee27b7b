//! # Theme Soak
//!
//! Runs a theme on the simulated clock with random pointer moves and clicks,
//! checking the capacity bound after every single wakeup.
//!
//! ```bash
//! theme_soak [theme] [seconds] [seed] [themes.toml]
//! theme_soak easter 600 42
//! ```
//!
//! Exits non-zero if the bound is ever broken or anything survives teardown.

use std::process::ExitCode;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use valalah_core::{Driven, Dispatch, Scheduler, Viewport};
use valalah_themes::{headless_stage, HeadlessStage, ThemeKind, ThemeOverrides};

/// Simulated milliseconds between pointer/click events.
const STEP_MS: u64 = 50;
const STEP: Duration = Duration::from_millis(STEP_MS);

/// Steps in `seconds` of simulated time. Saturates instead of wrapping.
const fn steps_for(seconds: u64) -> u64 {
    seconds.saturating_mul(1000 / STEP_MS)
}

/// What the soak observed.
#[derive(Debug, Default)]
struct SoakReport {
    wakeups: u64,
    clicks: u64,
    accepted_clicks: u64,
    peak_live: usize,
    violations: u64,
}

fn parse_args() -> Result<(ThemeKind, u64, u64, ThemeOverrides), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let kind = match args.first() {
        Some(name) => name.parse::<ThemeKind>().map_err(|e| e.to_string())?,
        None => ThemeKind::Winter,
    };
    let seconds = match args.get(1) {
        Some(s) => s.parse::<u64>().map_err(|e| format!("seconds: {e}"))?,
        None => 60,
    };
    let seed = match args.get(2) {
        Some(s) => s.parse::<u64>().map_err(|e| format!("seed: {e}"))?,
        None => 1,
    };
    let overrides = match args.get(3) {
        Some(path) => {
            let source = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
            ThemeOverrides::from_toml_str(&source).map_err(|e| e.to_string())?
        }
        None => ThemeOverrides::none(),
    };
    Ok((kind, seconds, seed, overrides))
}

/// Advances one step, one wakeup at a time.
fn step(stage: &mut HeadlessStage, report: &mut SoakReport) {
    let until = stage.clock().now() + STEP;
    while let Some(wakeup) = stage.clock_mut().pop_due(until) {
        stage.dispatch(wakeup);
        report.wakeups += 1;

        let theme = stage.current();
        report.peak_live = report.peak_live.max(theme.live_count());
        if theme.live_count() > theme.capacity() {
            report.violations += 1;
            eprintln!(
                "   ❌ {} live > capacity {} after {wakeup:?}",
                theme.live_count(),
                theme.capacity()
            );
        }
    }
    stage.clock_mut().settle(until);
}

fn poke(stage: &mut HeadlessStage, chaos: &mut ChaCha8Rng, report: &mut SoakReport) {
    let now = stage.clock().now();
    let x = chaos.gen_range(0.0..1280.0);
    let y = chaos.gen_range(0.0..800.0);
    stage.on_pointer_move(x, y, now);

    if !chaos.gen_bool(0.1) {
        return;
    }
    let Some(ids) = stage.current().as_falling().map(valalah_core::ParticleController::live_ids)
    else {
        return;
    };
    if ids.is_empty() {
        return;
    }
    let id = ids[chaos.gen_range(0..ids.len())];
    report.clicks += 1;
    if stage.on_interact(id, (x, y)) {
        report.accepted_clicks += 1;
    }
}

fn main() -> ExitCode {
    let (kind, seconds, seed, overrides) = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("theme_soak: {err}");
            eprintln!("usage: theme_soak [theme] [seconds] [seed] [themes.toml]");
            return ExitCode::from(2);
        }
    };

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    VALALAH THEME SOAK");
    println!("═══════════════════════════════════════════════════════════════════");
    println!("   {}", kind.load_message());
    println!("   simulated: {seconds}s   seed: {seed}");

    let mut stage = match headless_stage(kind, overrides, Viewport::desktop(), seed) {
        Ok(stage) => stage,
        Err(err) => {
            eprintln!("theme_soak: {err}");
            return ExitCode::from(2);
        }
    };
    let mut chaos = ChaCha8Rng::seed_from_u64(seed ^ 0x5EED);
    let mut report = SoakReport::default();

    stage.document_ready();
    let steps = steps_for(seconds);
    for _ in 0..steps {
        step(&mut stage, &mut report);
        poke(&mut stage, &mut chaos, &mut report);
    }

    stage.before_unload();
    let leftover_nodes = stage.current().surface().live_count();
    let leftover_timers = stage.clock().pending();

    println!("───────────────────────────────────────────────────────────────────");
    println!("   wakeups dispatched : {}", report.wakeups);
    println!("   peak live          : {} / {}", report.peak_live, stage.current().capacity());
    println!("   nodes created      : {}", stage.current().surface().created_count());
    println!("   clicks (accepted)  : {} ({})", report.clicks, report.accepted_clicks);
    println!("   capacity violations: {}", report.violations);
    println!("   after teardown     : {leftover_nodes} nodes, {leftover_timers} timers");
    println!("═══════════════════════════════════════════════════════════════════");

    if report.violations > 0 || leftover_nodes > 0 || leftover_timers > 0 {
        println!("   ❌ SOAK FAILED");
        ExitCode::FAILURE
    } else {
        println!("   ✅ SOAK PASSED");
        ExitCode::SUCCESS
    }
}
