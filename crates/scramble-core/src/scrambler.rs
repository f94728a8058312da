#![forbid(unsafe_code)]

//! [`Scrambler`]: target text, control buffer, and advance engine for one
//! animation, stepped one accepted frame at a time.
//!
//! The scrambler knows nothing about time. A host (see `scramble-runtime`)
//! decides which frames are accepted and calls:
//!
//! - [`Scrambler::sweep`] on every host frame (overdrive),
//! - [`Scrambler::frame`] on every accepted frame (gated tick + projection).

use crate::advance::{AdvanceEngine, TickReport};
use crate::cell::Cell;
use crate::config::ScrambleConfig;
use crate::control::{ControlBuffer, TargetText};
use crate::project::{Projection, project};
use crate::random::RandomSource;

/// Per-animation state machine.
#[derive(Debug, Clone, Default)]
pub struct Scrambler {
    target: TargetText,
    buffer: ControlBuffer,
    engine: AdvanceEngine,
}

impl Scrambler {
    /// Scrambler for `text` with an empty buffer.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            target: TargetText::new(text),
            buffer: ControlBuffer::new(),
            engine: AdvanceEngine::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> &TargetText {
        &self.target
    }

    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &ControlBuffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        self.buffer.cells()
    }

    #[inline]
    #[must_use]
    pub fn frontier(&self) -> usize {
        self.engine.frontier()
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.engine.frame()
    }

    /// Replace the target. Returns `true` if the text changed.
    ///
    /// Does not reset; callers decide how the change is played.
    pub fn set_target(&mut self, text: &str) -> bool {
        if self.target.as_str() == text {
            return false;
        }
        self.target = TargetText::new(text);
        true
    }

    /// Restart playback from frontier 0.
    ///
    /// With `clear_buffer` the buffer is emptied and the text plays from
    /// nothing; otherwise existing cells are kept and resized in place, so
    /// only the difference to the previous text scrambles.
    pub fn reset(&mut self, clear_buffer: bool) {
        self.engine.reset();
        if clear_buffer {
            self.buffer.clear();
        }
    }

    /// Snap straight to the fully revealed target.
    pub fn reveal_all(&mut self, config: &ScrambleConfig) {
        self.buffer.reveal(&self.target, |c| config.is_ignored(c));
        self.engine.finish_at(self.target.len());
    }

    /// Overdrive sweep for one host frame. Returns positions painted.
    pub fn sweep(&mut self, config: &ScrambleConfig) -> usize {
        self.engine
            .overdrive_sweep(&mut self.buffer, &self.target, config)
    }

    /// Run one accepted frame: gated tick, then projection.
    pub fn frame(&mut self, config: &ScrambleConfig, rng: &mut dyn RandomSource) -> Projection {
        self.advance(config, rng);
        self.render(config, rng)
    }

    /// Tick phase of [`frame`](Self::frame), if this frame is a tick frame.
    pub fn advance(
        &mut self,
        config: &ScrambleConfig,
        rng: &mut dyn RandomSource,
    ) -> Option<TickReport> {
        if !self.engine.is_tick_frame(config.tick) {
            return None;
        }
        Some(
            self.engine
                .tick(&mut self.buffer, &self.target, config, rng),
        )
    }

    /// Projection phase of [`frame`](Self::frame). Counts the frame.
    pub fn render(&mut self, config: &ScrambleConfig, rng: &mut dyn RandomSource) -> Projection {
        let projection = project(
            &mut self.buffer,
            &self.target,
            self.engine.frontier(),
            &config.range,
            rng,
        );
        self.engine.end_frame();
        projection
    }
}
