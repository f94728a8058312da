#![forbid(unsafe_code)]

//! `scramble-runtime` drives a [`scramble_core::Scrambler`] from a display
//! clock.
//!
//! Design goals:
//! - **Host-driven time**: the embedding loop polls a [`FrameHost`] and
//!   forwards deliveries; nothing here spawns threads or timers.
//! - **Deterministic tests**: [`ManualFrames`] advances time explicitly.
//! - **One request in flight**: every reschedule cancels first, so parameter
//!   changes never double the frame rate.
//!
//! The pieces:
//! - [`host`]: frame request tokens and the two provided hosts.
//! - [`scheduler`]: speed-based frame acceptance and lifecycle state.
//! - [`sink`]: where projected strings go.
//! - [`session`]: the controller tying them together, with hooks.

pub mod host;
pub mod scheduler;
pub mod session;
pub mod sink;

pub use host::{FrameHost, FrameQueue, FrameRequest, IntervalFrames, ManualFrames};
pub use scheduler::{BASELINE_FRAME, Scheduler, SchedulerState};
pub use session::{FrameOutcome, Hooks, Session};
pub use sink::{RenderSink, StringSink};
