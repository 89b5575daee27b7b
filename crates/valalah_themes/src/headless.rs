//! Headless wiring: memory surface, simulated clock, seeded ChaCha RNG.
//! Used by the soak binary and the tests.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use valalah_core::{MemorySurface, SilentLoader, SimulatedScheduler, Viewport};

use crate::error::ThemeResult;
use crate::kind::ThemeKind;
use crate::overrides::ThemeOverrides;
use crate::stage::{ThemeFactory, ThemeStage};
use crate::theme::{Theme, ThemeParts};

/// A theme with no browser attached.
pub type HeadlessTheme = Theme<MemorySurface, SimulatedScheduler, ChaCha8Rng>;

/// A stage with no browser attached.
pub type HeadlessStage = ThemeStage<MemorySurface, SimulatedScheduler, ChaCha8Rng>;

/// Factory building silent, simulated themes. Each build draws the next seed
/// so switching back to a theme does not replay it.
#[must_use]
pub fn headless_factory(
    overrides: ThemeOverrides,
    viewport: Viewport,
    seed: u64,
) -> ThemeFactory<MemorySurface, SimulatedScheduler, ChaCha8Rng> {
    let mut next_seed = seed;
    Box::new(move |kind| {
        let parts = ThemeParts {
            surface: MemorySurface::new(),
            scheduler: SimulatedScheduler::new(),
            rng: ChaCha8Rng::seed_from_u64(next_seed),
        };
        next_seed = next_seed.wrapping_add(1);
        Theme::build(kind, &overrides, &viewport, parts, &mut SilentLoader)
    })
}

/// A headless stage showing `kind`.
///
/// # Errors
///
/// Returns [`crate::ThemeError::Config`] for invalid overrides.
pub fn headless_stage(
    kind: ThemeKind,
    overrides: ThemeOverrides,
    viewport: Viewport,
    seed: u64,
) -> ThemeResult<HeadlessStage> {
    ThemeStage::new(kind, headless_factory(overrides, viewport, seed))
}
