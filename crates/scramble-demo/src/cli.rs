#![forbid(unsafe_code)]

//! Command-line argument parsing for the scramble demo.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Supports environment variable overrides via `SCRAMBLE_DEMO_*` prefix.
//!
//! Precedence, lowest first: built-in defaults, the `--config` JSON file,
//! environment variables, command-line flags.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;

use scramble_core::{CharRange, Overdrive, ScrambleConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Scramble Demo: text decrypt animations in your terminal

USAGE:
    scramble-demo [OPTIONS]

OPTIONS:
    --text=TEXT          Phrase to reveal; repeat for several (default: built-in set)
    --config=PATH        JSON file with scramble parameters
    --speed=F            Frame-accept rate, fraction of 60 fps in [0, 1] (default: 1)
    --tick=N             Advance every N accepted frames (default: 1)
    --step=N             Positions revealed per tick (default: 1)
    --seed=N             Random pre-arm attempts per tick (default: 1)
    --scramble=N         Base scramble dwell in frames (default: 1)
    --chance=F           Probability a character scrambles, [0, 1] (default: 1)
    --range=LO,HI[,...]  Noise code points: an interval or a set of 3+ codes
    --overdrive[=CHAR]   Paint filler ahead of the frontier ('_' or CHAR, 'off')
    --preserve           Keep overlapping text when switching phrases
    --reduced-motion     Reveal at once, without scrambling
    --fps=N              Terminal refresh rate (default: 60)
    --rng-seed=N         Fixed random seed for reproducible runs
    --hold-ms=N          Pause after each phrase (default: 1200)
    --loop               Cycle through the phrases until interrupted
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    SCRAMBLE_DEMO_TEXT             Phrases separated by '|'
    SCRAMBLE_DEMO_CONFIG           Override --config
    SCRAMBLE_DEMO_SPEED            Override --speed
    SCRAMBLE_DEMO_TICK             Override --tick
    SCRAMBLE_DEMO_STEP             Override --step
    SCRAMBLE_DEMO_SEED             Override --seed
    SCRAMBLE_DEMO_SCRAMBLE         Override --scramble
    SCRAMBLE_DEMO_CHANCE           Override --chance
    SCRAMBLE_DEMO_RANGE            Override --range
    SCRAMBLE_DEMO_OVERDRIVE        on | off | CHAR
    SCRAMBLE_DEMO_PRESERVE         1 to keep overlapping text
    SCRAMBLE_DEMO_REDUCED_MOTION   1 to reveal at once
    SCRAMBLE_DEMO_FPS              Override --fps
    SCRAMBLE_DEMO_RNG_SEED         Override --rng-seed
    SCRAMBLE_LOG                   Tracing filter (e.g. debug); logs go to stderr";

/// Phrases shown when none are given.
pub const DEFAULT_PHRASES: &[&str] = &[
    "decrypting transmission",
    "signal acquired",
    "access granted",
];

/// A flag or variable whose value could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// The value did not parse for this option.
    InvalidValue { option: &'static str, value: String },
    /// Not a recognised argument.
    Unknown(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { option, value } => {
                write!(f, "invalid {option} value: {value}")
            }
            Self::Unknown(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Scramble parameters set from the environment or the command line.
/// Unset fields leave the base configuration alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPatch {
    pub speed: Option<f64>,
    pub tick: Option<u32>,
    pub step: Option<u32>,
    pub seed: Option<u32>,
    pub scramble: Option<u32>,
    pub chance: Option<f64>,
    pub range: Option<CharRange>,
    pub overdrive: Option<Overdrive>,
    pub overflow: Option<bool>,
    pub reduced_motion: Option<bool>,
}

impl ConfigPatch {
    /// Overlay this patch on `base`.
    #[must_use]
    pub fn apply(&self, mut base: ScrambleConfig) -> ScrambleConfig {
        if let Some(speed) = self.speed {
            base.speed = speed;
        }
        if let Some(tick) = self.tick {
            base.tick = tick;
        }
        if let Some(step) = self.step {
            base.step = step;
        }
        if let Some(seed) = self.seed {
            base.seed = seed;
        }
        if let Some(scramble) = self.scramble {
            base.scramble = scramble;
        }
        if let Some(chance) = self.chance {
            base.chance = chance;
        }
        if let Some(range) = &self.range {
            base.range = range.clone();
        }
        if let Some(overdrive) = self.overdrive {
            base.overdrive = overdrive;
        }
        if let Some(overflow) = self.overflow {
            base.overflow = overflow;
        }
        if let Some(reduced) = self.reduced_motion {
            base.reduced_motion = reduced;
        }
        base
    }
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Phrases to reveal in order; empty means [`DEFAULT_PHRASES`].
    pub phrases: Vec<String>,
    /// JSON configuration file.
    pub config_path: Option<PathBuf>,
    /// Scramble parameter overrides.
    pub patch: ConfigPatch,
    /// Terminal refresh rate.
    pub fps: u32,
    /// Fixed random seed.
    pub rng_seed: Option<u64>,
    /// Pause after each completed phrase, in milliseconds.
    pub hold_ms: u64,
    /// Cycle until interrupted.
    pub repeat: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            phrases: Vec::new(),
            config_path: None,
            patch: ConfigPatch::default(),
            fps: 60,
            rng_seed: None,
            hold_ms: 1200,
            repeat: false,
        }
    }
}

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse the process arguments and environment.
    ///
    /// Prints help or version and exits when asked; exits with status 1 on
    /// a bad argument.
    pub fn parse() -> Self {
        let env_lookup = |key: &str| env::var(key).ok();
        match Self::parse_from(env::args().skip(1), env_lookup) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("scramble-demo {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with environment values from `env_lookup`.
    ///
    /// Unparseable environment values are ignored; unparseable flags are
    /// errors.
    pub fn parse_from<I, E>(args: I, env_lookup: E) -> Result<Command, CliError>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = env_lookup("SCRAMBLE_DEMO_TEXT") {
            opts.phrases = val
                .split('|')
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(val) = env_lookup("SCRAMBLE_DEMO_CONFIG") {
            opts.config_path = Some(PathBuf::from(val));
        }
        for (key, option) in ENV_OPTIONS {
            if let Some(val) = env_lookup(key) {
                let _ = opts.set(option, &val);
            }
        }

        // Parse command-line args (override env vars)
        let mut phrases_from_args = Vec::new();
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                "--overdrive" => opts.patch.overdrive = Some(Overdrive::Default),
                "--preserve" => opts.patch.overflow = Some(false),
                "--reduced-motion" => opts.patch.reduced_motion = Some(true),
                "--loop" => opts.repeat = true,
                other => {
                    if let Some(val) = other.strip_prefix("--text=") {
                        phrases_from_args.push(val.to_owned());
                    } else if let Some(val) = other.strip_prefix("--config=") {
                        opts.config_path = Some(PathBuf::from(val));
                    } else if let Some((name, val)) = other
                        .strip_prefix("--")
                        .and_then(|rest| rest.split_once('='))
                        && let Some(option) = FLAG_OPTIONS.iter().find(|o| o.flag() == name)
                    {
                        opts.set(*option, val)?;
                    } else {
                        return Err(CliError::Unknown(other.to_owned()));
                    }
                }
            }
        }
        if !phrases_from_args.is_empty() {
            opts.phrases = phrases_from_args;
        }

        Ok(Command::Run(opts))
    }

    /// Phrases to play, falling back to [`DEFAULT_PHRASES`].
    #[must_use]
    pub fn phrases(&self) -> Vec<String> {
        if self.phrases.is_empty() {
            DEFAULT_PHRASES.iter().map(|p| (*p).to_owned()).collect()
        } else {
            self.phrases.clone()
        }
    }

    fn set(&mut self, option: ValueOption, value: &str) -> Result<(), CliError> {
        let invalid = || CliError::InvalidValue {
            option: option.display(),
            value: value.to_owned(),
        };
        let value = value.trim();
        match option {
            ValueOption::Speed => self.patch.speed = Some(value.parse().map_err(|_| invalid())?),
            ValueOption::Tick => self.patch.tick = Some(value.parse().map_err(|_| invalid())?),
            ValueOption::Step => self.patch.step = Some(value.parse().map_err(|_| invalid())?),
            ValueOption::Seed => self.patch.seed = Some(value.parse().map_err(|_| invalid())?),
            ValueOption::Scramble => {
                self.patch.scramble = Some(value.parse().map_err(|_| invalid())?);
            }
            ValueOption::Chance => {
                self.patch.chance = Some(value.parse().map_err(|_| invalid())?);
            }
            ValueOption::Range => {
                let codes = value
                    .split(',')
                    .map(|c| c.trim().parse::<u32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| invalid())?;
                self.patch.range = Some(CharRange::from_codes(&codes).map_err(|_| invalid())?);
            }
            ValueOption::Overdrive => {
                self.patch.overdrive = Some(parse_overdrive(value).ok_or_else(invalid)?);
            }
            ValueOption::Preserve => {
                self.patch.overflow = Some(!parse_switch(value).ok_or_else(invalid)?);
            }
            ValueOption::ReducedMotion => {
                self.patch.reduced_motion = Some(parse_switch(value).ok_or_else(invalid)?);
            }
            ValueOption::Fps => self.fps = value.parse().map_err(|_| invalid())?,
            ValueOption::RngSeed => {
                self.rng_seed = Some(value.parse().map_err(|_| invalid())?);
            }
            ValueOption::HoldMs => self.hold_ms = value.parse().map_err(|_| invalid())?,
        }
        Ok(())
    }
}

/// Options that carry a value, shared by flags and environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueOption {
    Speed,
    Tick,
    Step,
    Seed,
    Scramble,
    Chance,
    Range,
    Overdrive,
    Preserve,
    ReducedMotion,
    Fps,
    RngSeed,
    HoldMs,
}

impl ValueOption {
    const fn flag(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Tick => "tick",
            Self::Step => "step",
            Self::Seed => "seed",
            Self::Scramble => "scramble",
            Self::Chance => "chance",
            Self::Range => "range",
            Self::Overdrive => "overdrive",
            Self::Preserve => "preserve",
            Self::ReducedMotion => "reduced-motion",
            Self::Fps => "fps",
            Self::RngSeed => "rng-seed",
            Self::HoldMs => "hold-ms",
        }
    }

    const fn display(self) -> &'static str {
        match self {
            Self::Speed => "--speed",
            Self::Tick => "--tick",
            Self::Step => "--step",
            Self::Seed => "--seed",
            Self::Scramble => "--scramble",
            Self::Chance => "--chance",
            Self::Range => "--range",
            Self::Overdrive => "--overdrive",
            Self::Preserve => "--preserve",
            Self::ReducedMotion => "--reduced-motion",
            Self::Fps => "--fps",
            Self::RngSeed => "--rng-seed",
            Self::HoldMs => "--hold-ms",
        }
    }
}

const FLAG_OPTIONS: [ValueOption; 13] = [
    ValueOption::Speed,
    ValueOption::Tick,
    ValueOption::Step,
    ValueOption::Seed,
    ValueOption::Scramble,
    ValueOption::Chance,
    ValueOption::Range,
    ValueOption::Overdrive,
    ValueOption::Preserve,
    ValueOption::ReducedMotion,
    ValueOption::Fps,
    ValueOption::RngSeed,
    ValueOption::HoldMs,
];

const ENV_OPTIONS: [(&str, ValueOption); 12] = [
    ("SCRAMBLE_DEMO_SPEED", ValueOption::Speed),
    ("SCRAMBLE_DEMO_TICK", ValueOption::Tick),
    ("SCRAMBLE_DEMO_STEP", ValueOption::Step),
    ("SCRAMBLE_DEMO_SEED", ValueOption::Seed),
    ("SCRAMBLE_DEMO_SCRAMBLE", ValueOption::Scramble),
    ("SCRAMBLE_DEMO_CHANCE", ValueOption::Chance),
    ("SCRAMBLE_DEMO_RANGE", ValueOption::Range),
    ("SCRAMBLE_DEMO_OVERDRIVE", ValueOption::Overdrive),
    ("SCRAMBLE_DEMO_PRESERVE", ValueOption::Preserve),
    ("SCRAMBLE_DEMO_REDUCED_MOTION", ValueOption::ReducedMotion),
    ("SCRAMBLE_DEMO_FPS", ValueOption::Fps),
    ("SCRAMBLE_DEMO_RNG_SEED", ValueOption::RngSeed),
];

/// `on`/`off`, a single filler character, or a numeric code point.
fn parse_overdrive(value: &str) -> Option<Overdrive> {
    match value {
        "" | "on" | "true" | "1" => return Some(Overdrive::Default),
        "off" | "false" | "0" => return Some(Overdrive::Off),
        _ => {}
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(Overdrive::Char(c)),
        _ => value.parse::<u32>().ok().map(Overdrive::from_code),
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
