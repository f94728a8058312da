#![forbid(unsafe_code)]

//! Scramble configuration and sanitizing.
//!
//! [`ScrambleConfig`] is a plain struct with public fields so hosts can
//! build it however they like. Nothing in the engine trusts it directly:
//! [`ScrambleConfig::sanitized`] clamps every field into its valid domain
//! and reports each correction as a [`ConfigIssue`] (also logged at
//! `warn`). A bad parameter never stops the animation.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Filler character painted by the default overdrive sweep (`'_'`).
pub const DEFAULT_OVERDRIVE_CHAR: char = '_';

/// Default noise interval, `[65, 125]` (`'A'..='}'`).
pub const DEFAULT_RANGE: CharRange = CharRange::Interval { lo: 65, hi: 125 };

// ---------------------------------------------------------------------------
// CharRange
// ---------------------------------------------------------------------------

/// The pool scramble noise is drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<u32>", into = "Vec<u32>"))]
pub enum CharRange {
    /// Closed code point interval `[lo, hi]`.
    Interval { lo: u32, hi: u32 },
    /// Explicit discrete set; duplicates bias the draw.
    Set(Vec<u32>),
}

impl CharRange {
    /// Interpret a code point list: two entries form an interval, more
    /// entries form a discrete set.
    pub fn from_codes(codes: &[u32]) -> Result<Self, ConfigIssue> {
        match codes {
            [lo, hi] => Ok(Self::Interval { lo: *lo, hi: *hi }),
            codes if codes.len() > 2 => Ok(Self::Set(codes.to_vec())),
            codes => Err(ConfigIssue::RangeTooShort { len: codes.len() }),
        }
    }

    /// Code points in list form (inverse of [`from_codes`](Self::from_codes)).
    #[must_use]
    pub fn to_codes(&self) -> Vec<u32> {
        match self {
            Self::Interval { lo, hi } => vec![*lo, *hi],
            Self::Set(codes) => codes.clone(),
        }
    }
}

impl Default for CharRange {
    fn default() -> Self {
        DEFAULT_RANGE
    }
}

impl TryFrom<Vec<u32>> for CharRange {
    type Error = ConfigIssue;

    fn try_from(codes: Vec<u32>) -> Result<Self, Self::Error> {
        Self::from_codes(&codes)
    }
}

impl From<CharRange> for Vec<u32> {
    fn from(range: CharRange) -> Self {
        range.to_codes()
    }
}

// ---------------------------------------------------------------------------
// Overdrive
// ---------------------------------------------------------------------------

/// Ungated filler sweep ahead of the scramble frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Overdrive {
    /// No sweep.
    #[default]
    Off,
    /// Sweep with [`DEFAULT_OVERDRIVE_CHAR`].
    Default,
    /// Sweep with a custom filler.
    Char(char),
}

impl Overdrive {
    /// Filler painted by the sweep, if enabled.
    #[must_use]
    pub const fn filler(self) -> Option<char> {
        match self {
            Self::Off => None,
            Self::Default => Some(DEFAULT_OVERDRIVE_CHAR),
            Self::Char(c) => Some(c),
        }
    }

    /// Overdrive from a character code; invalid codes use the default filler.
    #[must_use]
    pub fn from_code(code: u32) -> Self {
        char::from_u32(code).map_or(Self::Default, Self::Char)
    }
}

impl From<bool> for Overdrive {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Default } else { Self::Off }
    }
}

// ---------------------------------------------------------------------------
// ConfigIssue
// ---------------------------------------------------------------------------

/// A configuration value that was out of its valid domain.
///
/// Issues are diagnostics: the offending value has already been replaced
/// by the nearest valid one when an issue is reported.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    /// `step` was below 1; clamped to 1.
    StepBelowMinimum { given: u32 },
    /// `tick` was below 1; clamped to 1.
    TickBelowMinimum { given: u32 },
    /// `speed` was outside `[0, 1]` or NaN.
    SpeedOutOfRange { given: f64 },
    /// `chance` was outside `[0, 1]` or NaN.
    ChanceOutOfRange { given: f64 },
    /// A code point list had fewer than two entries.
    RangeTooShort { len: usize },
    /// An explicit set was empty; the default range is used.
    EmptyRangeSet,
    /// An interval had `lo > hi`; the bounds were swapped.
    InvertedRange { lo: u32, hi: u32 },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StepBelowMinimum { given } => {
                write!(f, "step must be at least 1 (got {given}); using 1")
            }
            Self::TickBelowMinimum { given } => {
                write!(f, "tick must be at least 1 (got {given}); using 1")
            }
            Self::SpeedOutOfRange { given } => {
                write!(f, "speed must be within [0, 1] (got {given}); clamped")
            }
            Self::ChanceOutOfRange { given } => {
                write!(f, "chance must be within [0, 1] (got {given}); clamped")
            }
            Self::RangeTooShort { len } => write!(
                f,
                "range needs an interval [lo, hi] or a set of 3+ codes (got {len} entries)"
            ),
            Self::EmptyRangeSet => write!(f, "range set is empty; using the default range"),
            Self::InvertedRange { lo, hi } => {
                write!(f, "range [{lo}, {hi}] is inverted; bounds swapped")
            }
        }
    }
}

impl std::error::Error for ConfigIssue {}

// ---------------------------------------------------------------------------
// ScrambleConfig
// ---------------------------------------------------------------------------

/// Animation parameters.
///
/// Defaults: `speed 1`, `tick 1`, `step 1`, `seed 1`, `scramble 1`,
/// `chance 1`, range `[65, 125]`, ignore `{' '}`, overflow on, overdrive
/// off, play on mount, no reduced motion.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrambleConfig {
    /// Frame-accept rate as a fraction of 60 fps. 0 pauses.
    pub speed: f64,
    /// Frontier and seed logic run every `tick` accepted frames.
    pub tick: u32,
    /// Positions advanced (and cells resized) per tick.
    pub step: u32,
    /// Random pre-arm attempts per tick.
    pub seed: u32,
    /// Base scramble dwell, in frames.
    pub scramble: u32,
    /// Probability a character scrambles at all.
    pub chance: f64,
    /// Noise pool.
    pub range: CharRange,
    /// Characters rendered verbatim, never scrambled.
    pub ignore: Vec<char>,
    /// Restart from an empty buffer when the target text changes.
    pub overflow: bool,
    /// Filler sweep ahead of the frontier.
    pub overdrive: Overdrive,
    /// Animate on first mount; otherwise snap to the revealed text.
    pub play_on_mount: bool,
    /// Reveal (almost) at once: whole-text step, no scrambling, no overdrive.
    pub reduced_motion: bool,
}

impl Default for ScrambleConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            tick: 1,
            step: 1,
            seed: 1,
            scramble: 1,
            chance: 1.0,
            range: DEFAULT_RANGE,
            ignore: vec![' '],
            overflow: true,
            overdrive: Overdrive::Off,
            play_on_mount: true,
            reduced_motion: false,
        }
    }
}

impl ScrambleConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn tick(mut self, tick: u32) -> Self {
        self.tick = tick;
        self
    }

    #[must_use]
    pub fn step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn scramble(mut self, scramble: u32) -> Self {
        self.scramble = scramble;
        self
    }

    #[must_use]
    pub fn chance(mut self, chance: f64) -> Self {
        self.chance = chance;
        self
    }

    #[must_use]
    pub fn range(mut self, range: CharRange) -> Self {
        self.range = range;
        self
    }

    /// Replace the ignore set.
    #[must_use]
    pub fn ignore(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.ignore = chars.into_iter().collect();
        self
    }

    #[must_use]
    pub fn overflow(mut self, overflow: bool) -> Self {
        self.overflow = overflow;
        self
    }

    #[must_use]
    pub fn overdrive(mut self, overdrive: impl Into<Overdrive>) -> Self {
        self.overdrive = overdrive.into();
        self
    }

    #[must_use]
    pub fn play_on_mount(mut self, play: bool) -> Self {
        self.play_on_mount = play;
        self
    }

    #[must_use]
    pub fn reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Whether `c` is exempt from scrambling.
    #[inline]
    #[must_use]
    pub fn is_ignored(&self, c: char) -> bool {
        self.ignore.contains(&c)
    }

    /// Clamp every field into its valid domain.
    ///
    /// Returns the corrected configuration and one [`ConfigIssue`] per
    /// correction. Each issue is also logged at `warn`.
    #[must_use]
    pub fn sanitized(mut self) -> (Self, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        if self.step < 1 {
            issues.push(ConfigIssue::StepBelowMinimum { given: self.step });
            self.step = 1;
        }
        if self.tick < 1 {
            issues.push(ConfigIssue::TickBelowMinimum { given: self.tick });
            self.tick = 1;
        }
        if !(0.0..=1.0).contains(&self.speed) {
            issues.push(ConfigIssue::SpeedOutOfRange { given: self.speed });
            self.speed = if self.speed.is_nan() {
                1.0
            } else {
                self.speed.clamp(0.0, 1.0)
            };
        }
        if !(0.0..=1.0).contains(&self.chance) {
            issues.push(ConfigIssue::ChanceOutOfRange { given: self.chance });
            self.chance = if self.chance.is_nan() {
                1.0
            } else {
                self.chance.clamp(0.0, 1.0)
            };
        }
        match &self.range {
            CharRange::Set(codes) if codes.is_empty() => {
                issues.push(ConfigIssue::EmptyRangeSet);
                self.range = DEFAULT_RANGE;
            }
            CharRange::Interval { lo, hi } if lo > hi => {
                issues.push(ConfigIssue::InvertedRange { lo: *lo, hi: *hi });
                self.range = CharRange::Interval { lo: *hi, hi: *lo };
            }
            _ => {}
        }

        for issue in &issues {
            tracing::warn!(issue = %issue, "scramble config clamped");
        }
        (self, issues)
    }

    /// The configuration actually driven for a target of `target_len`
    /// characters, after applying [`reduced_motion`](Self::reduced_motion).
    #[must_use]
    pub fn motion_adjusted(&self, target_len: usize) -> Self {
        let mut effective = self.clone();
        if self.reduced_motion {
            effective.step = u32::try_from(target_len).unwrap_or(u32::MAX).max(1);
            effective.chance = 0.0;
            effective.overdrive = Overdrive::Off;
        }
        effective
    }
}
