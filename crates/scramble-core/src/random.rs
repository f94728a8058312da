#![forbid(unsafe_code)]

//! Random sources for scramble noise, dwell times, and seeding.
//!
//! Everything random in the engine goes through [`RandomSource`], so a run
//! can be made fully deterministic by swapping in [`SeededRandom::seeded`]
//! or a [`SequenceRandom`].
//!
//! # Invariants
//!
//! 1. [`RandomSource::random_int`] is inclusive on both ends.
//! 2. [`RandomSource::random_scramble_duration`] returns 0 iff `scramble == 0`.
//! 3. [`RandomSource::passes_chance`] never passes for `chance <= 0` and
//!    always passes for `chance >= 1`.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::config::CharRange;

/// Substituted when a sampled code point is not a valid `char`.
pub const FALLBACK_CHAR: char = '?';

/// One in this many dwell times receives a bonus (20%).
const BONUS_ODDS: u32 = 5;

/// Upper bound of the chance gate draw.
const CHANCE_SCALE: u32 = 10;

/// A source of uniformly distributed `u64` values.
///
/// Only [`next_u64`](Self::next_u64) is required; the sampling helpers the
/// engine needs are provided on top of it.
pub trait RandomSource {
    /// Next raw value.
    fn next_u64(&mut self) -> u64;

    /// Uniform integer in `[min, max]`. Inverted bounds are swapped.
    fn random_int(&mut self, min: u32, max: u32) -> u32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = u64::from(hi - lo) + 1;
        lo + (self.next_u64() % span) as u32
    }

    /// Uniform index in `[lo, hi)`. Returns `lo` for an empty interval.
    fn random_index(&mut self, lo: usize, hi: usize) -> usize {
        if hi <= lo + 1 {
            return lo;
        }
        let span = (hi - lo) as u64;
        lo + (self.next_u64() % span) as usize
    }

    /// A random character drawn from `range`.
    fn random_char(&mut self, range: &CharRange) -> char {
        let code = match range {
            CharRange::Interval { lo, hi } => self.random_int(*lo, *hi),
            CharRange::Set(codes) => match codes.len() {
                0 => return FALLBACK_CHAR,
                len => codes[self.random_index(0, len)],
            },
        };
        char::from_u32(code).unwrap_or(FALLBACK_CHAR)
    }

    /// Per-character dwell time: `scramble`, plus a bonus in
    /// `[0, scramble]` one time in five.
    fn random_scramble_duration(&mut self, scramble: u32) -> u32 {
        if scramble == 0 {
            return 0;
        }
        if self.random_int(0, BONUS_ODDS - 1) == 0 {
            scramble.saturating_add(self.random_int(0, scramble))
        } else {
            scramble
        }
    }

    /// Probability gate for whether a character scrambles at all.
    fn passes_chance(&mut self, chance: f64) -> bool {
        if chance >= 1.0 {
            return true;
        }
        if chance <= 0.0 || chance.is_nan() {
            return false;
        }
        let draw = f64::from(self.random_int(0, CHANCE_SCALE));
        draw >= (1.0 - chance) * f64::from(CHANCE_SCALE)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }
}

/// [`StdRng`]-backed source; deterministic when built with [`seeded`](Self::seeded).
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic source: the same seed yields the same draws.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

/// Replays a fixed list of raw values, cycling when exhausted.
///
/// An empty list yields zeros.
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    values: Vec<u64>,
    cursor: usize,
}

impl SequenceRandom {
    /// Create a source that replays `values` in order.
    #[must_use]
    pub fn new(values: impl Into<Vec<u64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Number of values drawn so far.
    #[must_use]
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRandom {
    fn next_u64(&mut self) -> u64 {
        if self.values.is_empty() {
            self.cursor += 1;
            return 0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
