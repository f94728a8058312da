#![forbid(unsafe_code)]

//! Single-line terminal sink.
//!
//! Each frame rewrites the current terminal line in place: return to
//! column 0, clear the line, print. Write failures are kept and reported
//! through [`TerminalLine::take_error`]; until taken, the sink reports
//! itself not ready so the session stops producing frames.

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveToColumn, Show};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::{QueueableCommand, queue};
use scramble_runtime::RenderSink;

/// Renders frames onto one terminal line.
#[derive(Debug)]
pub struct TerminalLine<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl TerminalLine<Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalLine<W> {
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Hide the cursor while animating.
    pub fn begin(&mut self) -> io::Result<()> {
        self.out.queue(Hide)?;
        self.out.flush()
    }

    /// End the current line and restore the cursor.
    pub fn finish(&mut self) -> io::Result<()> {
        queue!(self.out, Print("\n"), Show)?;
        self.out.flush()
    }

    /// The first write error since the last call, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, text: &str) -> io::Result<()> {
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(text)
        )?;
        self.out.flush()
    }
}

impl<W: Write> RenderSink for TerminalLine<W> {
    fn render(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.draw(text) {
            tracing::warn!(error = %err, "terminal write failed");
            self.error = Some(err);
        }
    }

    fn is_ready(&self) -> bool {
        self.error.is_none()
    }
}
