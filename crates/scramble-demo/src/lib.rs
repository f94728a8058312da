#![forbid(unsafe_code)]

//! Scramble demo library: CLI parsing, the terminal sink, and the frame
//! loop shared by the binary and its tests.

pub mod cli;
pub mod error;
pub mod terminal;

use std::fs;
use std::io::Write;
use std::path::Path;

use scramble_core::ScrambleConfig;
use scramble_runtime::{FrameHost, SchedulerState, Session};

pub use error::{DemoError, Result};
pub use terminal::TerminalLine;

/// How [`drive`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// The phrase is fully revealed.
    Complete,
    /// Speed 0: no frames will come until reconfigured.
    Parked,
    /// The session was stopped.
    Stopped,
}

/// Base configuration: the JSON file at `path`, or defaults.
pub fn load_config(path: Option<&Path>) -> Result<ScrambleConfig> {
    let Some(path) = path else {
        return Ok(ScrambleConfig::default());
    };
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| DemoError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Run `session` until its phrase settles.
///
/// `wait` blocks until the host's next refresh; every delivery due at that
/// point is handled before waiting again. A terminal write failure ends the
/// loop with an error.
pub fn drive<H, W>(
    session: &mut Session<H, TerminalLine<W>>,
    mut wait: impl FnMut(&mut H),
) -> Result<Settled>
where
    H: FrameHost,
    W: Write,
{
    loop {
        match session.state() {
            SchedulerState::Completed => return Ok(Settled::Complete),
            SchedulerState::Cancelled | SchedulerState::Idle => return Ok(Settled::Stopped),
            SchedulerState::Running if !session.awaiting_frame() => return Ok(Settled::Parked),
            SchedulerState::Running => {}
        }
        wait(session.host_mut());
        while session.pump().is_some() {}
        if let Some(err) = session.sink_mut().and_then(TerminalLine::take_error) {
            return Err(err.into());
        }
    }
}
