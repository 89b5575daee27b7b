//! Random selection helpers.
//!
//! Pure functions over an injected RNG, so a seeded generator makes every
//! theme run reproducible.

use rand::Rng;

pub use crate::config::Variant;

/// Picks one item uniformly. `None` only for an empty slice.
pub fn choose<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.gen_range(0..items.len()))
}

/// Uniform draw from the closed interval `[min, max]`. A degenerate interval
/// returns `min`.
pub fn uniform_in<R: Rng + ?Sized>(rng: &mut R, [min, max]: [f32; 2]) -> f32 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}

/// Uniform draw from the closed integer interval `[min, max]`.
pub fn uniform_count<R: Rng + ?Sized>(rng: &mut R, [min, max]: [u32; 2]) -> u32 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}

/// Uniform offset in `[-spread / 2, spread / 2]`.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> f32 {
    uniform_in(rng, [-spread / 2.0, spread / 2.0])
}

/// True with probability `p`.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, p: f32) -> bool {
    rng.gen::<f32>() < p
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_choose_covers_every_variant() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let items = ["❄", "❅", "❆"];
        let mut seen = [0u32; 3];

        for _ in 0..3000 {
            let pick = choose(&mut rng, &items).unwrap();
            let index = items.iter().position(|i| i == pick).unwrap();
            seen[index] += 1;
        }

        // Uniform within a generous tolerance
        for count in seen {
            assert!((800..1200).contains(&count), "skewed choice: {seen:?}");
        }
    }

    #[test]
    fn test_choose_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let items: [u8; 0] = [];
        assert!(choose(&mut rng, &items).is_none());
    }

    #[test]
    fn test_uniform_in_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1000 {
            let v = uniform_in(&mut rng, [8.0, 12.0]);
            assert!((8.0..=12.0).contains(&v));
        }
        assert!((uniform_in(&mut rng, [3.0, 3.0]) - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_roll_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert!((0..100).all(|_| !roll(&mut rng, 0.0)));
        assert!((0..100).all(|_| roll(&mut rng, 1.0)));
    }
}
