#![forbid(unsafe_code)]

//! Core: the host-agnostic text scramble engine.
//!
//! A scramble animation reveals a target string position by position,
//! showing random noise in each position until it settles. This crate
//! holds the whole state machine and nothing else: no clock, no output.
//!
//! - [`Cell`] - per-position state (empty, armed, scrambling, revealed, literal, filler)
//! - [`ControlBuffer`] - the ordered cells of one animation
//! - [`AdvanceEngine`] - grow/shrink, frontier stepping, seeding, overdrive
//! - [`project`] - buffer to output string, with completion detection
//! - [`Scrambler`] - the above bundled per animation
//! - [`RandomSource`] - every random draw, swappable for determinism
//! - [`ScrambleConfig`] - parameters, clamped by [`ScrambleConfig::sanitized`]
//!
//! # Example
//! ```
//! use scramble_core::{ScrambleConfig, Scrambler, SeededRandom};
//!
//! let (config, _issues) = ScrambleConfig::default().scramble(2).sanitized();
//! let mut scrambler = Scrambler::new("hello world");
//! let mut rng = SeededRandom::seeded(7);
//!
//! let mut frames = 0;
//! loop {
//!     scrambler.sweep(&config);
//!     let frame = scrambler.frame(&config, &mut rng);
//!     frames += 1;
//!     if frame.complete {
//!         assert_eq!(frame.text, "hello world");
//!         break;
//!     }
//! }
//! assert!(frames >= 11);
//! ```

pub mod advance;
pub mod cell;
pub mod config;
pub mod control;
pub mod project;
pub mod random;
pub mod scrambler;

pub use advance::{AdvanceEngine, TickReport};
pub use cell::Cell;
pub use config::{CharRange, ConfigIssue, Overdrive, ScrambleConfig};
pub use control::{ControlBuffer, TargetText};
pub use project::{Projection, project};
pub use random::{RandomSource, SeededRandom, SequenceRandom};
pub use scrambler::Scrambler;
