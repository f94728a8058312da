#![forbid(unsafe_code)]

//! Text scramble animations.
//!
//! This crate is the public surface: it re-exports the engine from
//! `scramble-core` and, with the default `runtime` feature, the frame
//! scheduling and session types from `scramble-runtime`.
//!
//! ```
//! use scramble::prelude::*;
//! use std::time::Duration;
//!
//! let config = ScrambleConfig::default().scramble(3).overdrive(true);
//! let mut session = Session::new("decrypting", config, ManualFrames::new())
//!     .with_random(SeededRandom::seeded(3))
//!     .with_sink(StringSink::recording());
//! session.mount();
//! while !session.is_complete() {
//!     session.host_mut().advance(Duration::from_millis(17));
//!     session.pump();
//! }
//! assert_eq!(session.output(), "decrypting");
//! ```

// --- Engine re-exports -----------------------------------------------------

pub use scramble_core::{
    AdvanceEngine, Cell, CharRange, ConfigIssue, ControlBuffer, Overdrive, Projection,
    RandomSource, ScrambleConfig, Scrambler, SeededRandom, SequenceRandom, TargetText, TickReport,
    project,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use scramble_runtime::{
    FrameHost, FrameOutcome, FrameRequest, Hooks, IntervalFrames, ManualFrames, RenderSink,
    SchedulerState, Session, StringSink,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{CharRange, ConfigIssue, Overdrive, RandomSource, ScrambleConfig, SeededRandom};

    #[cfg(feature = "runtime")]
    pub use crate::{
        FrameHost, FrameOutcome, Hooks, IntervalFrames, ManualFrames, RenderSink, Session,
        StringSink,
    };

    pub use crate::core;
    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use scramble_core as core;
#[cfg(feature = "runtime")]
pub use scramble_runtime as runtime;
