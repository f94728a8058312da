#![forbid(unsafe_code)]

//! Session controller: one scramble animation bound to a host and a sink.
//!
//! [`Session`] owns everything an animation needs: the configuration, the
//! [`Scrambler`] state, its random source, the frame host, the render sink,
//! and the lifecycle hooks. It is driven entirely from outside: the
//! embedding loop forwards host deliveries to [`Session::on_frame`] (or
//! calls [`Session::pump`]) and every state change happens inside that call.
//!
//! # Frame handling
//!
//! For each delivery, in order:
//!
//! 1. Stale or cancelled requests are dropped.
//! 2. Without a ready sink the frame is skipped and re-requested.
//! 3. At speed 0 the session parks until [`Session::configure`] resumes it.
//! 4. The overdrive sweep runs (every delivered frame).
//! 5. Throttled frames re-request and stop here.
//! 6. Accepted frames advance, project, render, and fire `on_frame`.
//! 7. On completion `on_complete` fires once and nothing more is requested.
//!
//! # Example
//! ```
//! use core::time::Duration;
//! use scramble_core::{ScrambleConfig, SeededRandom};
//! use scramble_runtime::{ManualFrames, Session, StringSink};
//!
//! let mut session = Session::new("ok", ScrambleConfig::default(), ManualFrames::new())
//!     .with_random(SeededRandom::seeded(1))
//!     .with_sink(StringSink::new());
//! session.mount();
//! while !session.is_complete() {
//!     session.host_mut().advance(Duration::from_millis(17));
//!     session.pump();
//! }
//! assert_eq!(session.output(), "ok");
//! ```

use core::fmt;
use core::time::Duration;

use scramble_core::{
    Cell, ConfigIssue, RandomSource, ScrambleConfig, Scrambler, SeededRandom, TargetText,
};

use crate::host::{FrameHost, FrameRequest};
use crate::scheduler::{Scheduler, SchedulerState};
use crate::sink::{RenderSink, StringSink};

type Hook = Box<dyn FnMut()>;
type FrameHook = Box<dyn FnMut(&str)>;

/// Lifecycle callbacks.
///
/// - `on_start` fires once per play, before the first frame.
/// - `on_frame` fires once per accepted frame with the projected output.
/// - `on_complete` fires once when the output equals the target.
#[derive(Default)]
pub struct Hooks {
    on_start: Option<Hook>,
    on_frame: Option<FrameHook>,
    on_complete: Option<Hook>,
}

impl Hooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_start(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_frame(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.on_frame = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_complete(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    fn started(&mut self) {
        if let Some(hook) = self.on_start.as_mut() {
            hook();
        }
    }

    fn framed(&mut self, text: &str) {
        if let Some(hook) = self.on_frame.as_mut() {
            hook(text);
        }
    }

    fn completed(&mut self) {
        if let Some(hook) = self.on_complete.as_mut() {
            hook();
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_frame", &self.on_frame.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// What happened to one delivered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not the outstanding request, or the session is not running.
    Stale,
    /// No ready sink; re-requested without touching state.
    Skipped,
    /// Speed is 0; nothing re-requested.
    Parked,
    /// Too soon after the last accepted frame; re-requested.
    Throttled,
    /// A frame was rendered and another requested.
    Rendered,
    /// The final frame was rendered.
    Completed,
}

/// One scramble animation.
pub struct Session<H: FrameHost, S: RenderSink = StringSink> {
    requested: ScrambleConfig,
    config: ScrambleConfig,
    issues: Vec<ConfigIssue>,
    scrambler: Scrambler,
    rng: Box<dyn RandomSource>,
    host: H,
    sink: Option<S>,
    scheduler: Scheduler,
    hooks: Hooks,
    mounted: bool,
    output: String,
    frames_accepted: u64,
}

impl<H: FrameHost, S: RenderSink> Session<H, S> {
    /// Unmounted session for `text`. Nothing is requested until
    /// [`mount`](Self::mount) or [`play`](Self::play).
    ///
    /// The configuration is sanitized; corrections are available from
    /// [`config_issues`](Self::config_issues).
    pub fn new(text: impl Into<String>, config: ScrambleConfig, host: H) -> Self {
        let scrambler = Scrambler::new(text);
        let (requested, issues) = config.sanitized();
        let config = requested.motion_adjusted(scrambler.target().len());
        Self {
            requested,
            config,
            issues,
            scrambler,
            rng: Box::new(SeededRandom::from_entropy()),
            host,
            sink: None,
            scheduler: Scheduler::new(),
            hooks: Hooks::new(),
            mounted: false,
            output: String::new(),
            frames_accepted: 0,
        }
    }

    /// Replace the random source (e.g. with a seeded one for replays).
    #[must_use]
    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: S) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn set_hooks(&mut self, hooks: Hooks) {
        self.hooks = hooks;
    }

    /// Attach a sink, returning the previous one.
    pub fn attach_sink(&mut self, sink: S) -> Option<S> {
        self.sink.replace(sink)
    }

    /// Detach the sink. Frames are skipped until one is attached again.
    pub fn detach_sink(&mut self) -> Option<S> {
        self.sink.take()
    }

    #[must_use]
    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // -- Introspection ------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.scheduler.state() == SchedulerState::Completed
    }

    /// A frame request is outstanding. False while parked or stopped.
    #[must_use]
    pub fn awaiting_frame(&self) -> bool {
        self.scheduler.pending().is_some()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Effective configuration (sanitized, reduced motion applied).
    #[must_use]
    pub fn config(&self) -> &ScrambleConfig {
        &self.config
    }

    /// Corrections made by the most recent sanitize.
    #[must_use]
    pub fn config_issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    #[must_use]
    pub fn target(&self) -> &TargetText {
        self.scrambler.target()
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        self.scrambler.cells()
    }

    #[must_use]
    pub fn frontier(&self) -> usize {
        self.scrambler.frontier()
    }

    /// Last projected output.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Accepted frames over the session's lifetime.
    #[must_use]
    pub fn frames_accepted(&self) -> u64 {
        self.frames_accepted
    }

    // -- Lifecycle ----------------------------------------------------------

    /// First attach to the host. Plays, or with `play_on_mount` off snaps
    /// straight to the revealed text. Later calls do nothing.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        if self.config.play_on_mount {
            self.play();
        } else {
            self.reveal_now();
        }
    }

    /// Apply new text and configuration.
    ///
    /// A changed text restarts the frontier; the buffer is cleared only in
    /// overflow mode, otherwise it resizes in place and overlapping
    /// characters stay revealed. An unchanged text keeps its progress and
    /// the new parameters apply from the next frame.
    pub fn configure(&mut self, text: &str, config: ScrambleConfig) -> Vec<ConfigIssue> {
        let (requested, issues) = config.sanitized();
        self.requested = requested;
        self.issues = issues.clone();
        let changed = self.scrambler.set_target(text);
        self.config = self
            .requested
            .motion_adjusted(self.scrambler.target().len());

        if changed {
            tracing::debug!(
                target_len = self.scrambler.target().len(),
                overflow = self.config.overflow,
                "scramble target changed"
            );
            self.scrambler.reset(self.config.overflow);
            if self.mounted && self.scheduler.state() != SchedulerState::Cancelled {
                self.scheduler.start(&mut self.host, self.config.speed);
            }
        } else {
            self.scheduler.schedule(&mut self.host, self.config.speed);
        }
        issues
    }

    /// Change only the text, keeping the configuration.
    pub fn set_text(&mut self, text: &str) {
        let config = self.requested.clone();
        let _ = self.configure(text, config);
    }

    /// Start over from an empty buffer: fires `on_start` and requests the
    /// first frame. Cancels whatever was in flight.
    pub fn play(&mut self) {
        self.mounted = true;
        self.scrambler.reset(true);
        self.output.clear();
        self.config = self
            .requested
            .motion_adjusted(self.scrambler.target().len());
        tracing::debug!(
            target_len = self.scrambler.target().len(),
            speed = self.config.speed,
            "scramble play"
        );
        self.hooks.started();
        self.scheduler.start(&mut self.host, self.config.speed);
    }

    /// Same as [`play`](Self::play).
    pub fn replay(&mut self) {
        self.play();
    }

    /// Cancel the outstanding request; no further frames are produced
    /// until the next play. Idempotent.
    pub fn stop(&mut self) {
        self.scheduler.stop(&mut self.host);
    }

    /// Snap to the fully revealed text and render it once, bypassing the
    /// scheduler. Fires `on_frame` and `on_complete`.
    pub fn reveal_now(&mut self) {
        self.scrambler.reveal_all(&self.config);
        let projection = self.scrambler.render(&self.config, self.rng.as_mut());
        self.output = projection.text;
        self.scheduler.complete(&mut self.host);
        tracing::debug!(target_len = self.scrambler.target().len(), "scramble revealed");
        if let Some(sink) = self.sink.as_mut().filter(|s| s.is_ready()) {
            sink.render(&self.output);
        }
        self.hooks.framed(&self.output);
        self.hooks.completed();
    }

    // -- Frames -------------------------------------------------------------

    /// Handle one host delivery.
    pub fn on_frame(&mut self, request: FrameRequest, now: Duration) -> FrameOutcome {
        if !self.scheduler.claim(request) {
            return FrameOutcome::Stale;
        }
        if !self.sink.as_ref().is_some_and(|s| s.is_ready()) {
            tracing::trace!("no ready sink, frame skipped");
            self.scheduler.schedule(&mut self.host, self.config.speed);
            return FrameOutcome::Skipped;
        }
        if Scheduler::frame_interval(self.config.speed).is_none() {
            tracing::debug!("scramble parked at speed 0");
            return FrameOutcome::Parked;
        }

        self.scrambler.sweep(&self.config);
        if !self.scheduler.accept(now, self.config.speed) {
            self.scheduler.schedule(&mut self.host, self.config.speed);
            return FrameOutcome::Throttled;
        }

        let _span = tracing::debug_span!("scramble.frame", frame = self.frames_accepted).entered();
        let projection = self.scrambler.frame(&self.config, self.rng.as_mut());
        self.frames_accepted += 1;
        self.output = projection.text;
        if let Some(sink) = self.sink.as_mut() {
            sink.render(&self.output);
        }
        self.hooks.framed(&self.output);

        if projection.complete {
            self.scheduler.complete(&mut self.host);
            tracing::debug!(
                frames = self.frames_accepted,
                len = self.output.chars().count(),
                "scramble complete"
            );
            self.hooks.completed();
            return FrameOutcome::Completed;
        }
        self.scheduler.schedule(&mut self.host, self.config.speed);
        FrameOutcome::Rendered
    }

    /// Poll the host once and handle the delivery, if any.
    pub fn pump(&mut self) -> Option<FrameOutcome> {
        let (request, now) = self.host.poll_frame()?;
        Some(self.on_frame(request, now))
    }
}

impl<H: FrameHost, S: RenderSink> Drop for Session<H, S> {
    fn drop(&mut self) {
        self.scheduler.stop(&mut self.host);
    }
}

impl<H, S> fmt::Debug for Session<H, S>
where
    H: FrameHost + fmt::Debug,
    S: RenderSink + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("scrambler", &self.scrambler)
            .field("host", &self.host)
            .field("sink", &self.sink)
            .field("scheduler", &self.scheduler)
            .field("hooks", &self.hooks)
            .field("mounted", &self.mounted)
            .field("output", &self.output)
            .field("frames_accepted", &self.frames_accepted)
            .finish_non_exhaustive()
    }
}
