// Random sources for probability gating, pattern generation and Random direction
// Swappable so tests can substitute a fixed sequence

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform values in `[0, 1)`
pub trait RandomSource: Send {
    fn next_float(&mut self) -> f32;

    /// Uniform index in `[0, len)`; returns 0 when `len` is 0
    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_float() * len as f32) as usize).min(len - 1)
    }

    /// Percent gate: true with `percent`/100 chance. 0 never passes, 100 always does.
    fn chance(&mut self, percent: u8) -> bool {
        match percent {
            0 => false,
            p if p >= 100 => true,
            p => self.next_float() * 100.0 < p as f32,
        }
    }
}

/// Production source backed by `StdRng`
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Reproducible stream
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_float(&mut self) -> f32 {
        self.rng.gen_range(0.0f32..1.0)
    }
}

/// Cycles through a fixed list of values (test double)
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f32>,
    cursor: usize,
}

impl FixedSequence {
    /// Values are clamped into `[0, 1)`; an empty list behaves like `[0.0]`
    pub fn new(values: Vec<f32>) -> Self {
        let values = if values.is_empty() {
            vec![0.0]
        } else {
            values
                .into_iter()
                .map(|v| v.clamp(0.0, 1.0 - f32::EPSILON))
                .collect()
        };
        Self { values, cursor: 0 }
    }

    /// Always returns the same value
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for FixedSequence {
    fn next_float(&mut self) -> f32 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// Stateless mix of (seed, track, absolute step), used by the Random direction
/// so every tick inside one step resolves to the same position.
pub fn step_hash(seed: u64, track: usize, absolute_step: u64) -> u64 {
    let mut z = seed
        ^ (track as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ absolute_step.wrapping_mul(0xD1B5_4A32_D192_ED03);
    // splitmix64 finalizer
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
