#![forbid(unsafe_code)]

//! Frame scheduler: decides which host refreshes advance the animation.
//!
//! The scheduler busy-polls the host: while running it always keeps exactly
//! one request outstanding, and on each delivery compares the elapsed time
//! since the last accepted frame against `BASELINE_FRAME / speed`. Because
//! the interval is recomputed on every delivery, a speed change applies to
//! the next frame without restarting the loop.
//!
//! # State machine
//!
//! ```text
//!            start              complete
//!   Idle ───────────▶ Running ───────────▶ Completed
//!                      │  ▲                   │
//!                 stop │  └──── start ────────┤
//!                      ▼                      │
//!                  Cancelled ◀───── start ────┘ (any state restarts)
//! ```
//!
//! # Invariants
//!
//! 1. At most one request is outstanding; every reschedule cancels first.
//! 2. Only the outstanding request is honoured; anything else is stale.
//! 3. No request is outstanding outside `Running`.
//! 4. `speed == 0` parks: the delivery is consumed and nothing is requested.

use core::time::Duration;

use crate::host::{FrameHost, FrameRequest};

/// Refresh interval at full speed (60 Hz).
pub const BASELINE_FRAME: Duration = Duration::from_nanos(16_666_667);

/// Lifecycle of one play-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Never started.
    #[default]
    Idle,
    /// Requesting frames.
    Running,
    /// Output reached the target; no more frames.
    Completed,
    /// Stopped by the host; no more frames.
    Cancelled,
}

/// Outstanding request and pacing for one session.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    state: SchedulerState,
    pending: Option<FrameRequest>,
    last_accepted: Option<Duration>,
}

impl Scheduler {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            pending: None,
            last_accepted: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// The request currently awaited, if any.
    #[inline]
    #[must_use]
    pub const fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Minimum spacing between accepted frames at `speed`, or `None` when
    /// the speed pauses the animation.
    #[must_use]
    pub fn frame_interval(speed: f64) -> Option<Duration> {
        if speed.is_nan() || speed <= 0.0 {
            return None;
        }
        let nanos = (BASELINE_FRAME.as_nanos() as f64 / speed).round();
        if nanos >= u64::MAX as f64 {
            return Some(Duration::MAX);
        }
        Some(Duration::from_nanos(nanos as u64))
    }

    /// Begin a play-through from any state.
    pub fn start<H: FrameHost + ?Sized>(&mut self, host: &mut H, speed: f64) {
        self.cancel_pending(host);
        self.state = SchedulerState::Running;
        self.last_accepted = None;
        self.schedule(host, speed);
    }

    /// Cancel-then-request. Returns `true` if a request is now outstanding.
    ///
    /// Does nothing unless running; parks (requests nothing) at speed 0.
    pub fn schedule<H: FrameHost + ?Sized>(&mut self, host: &mut H, speed: f64) -> bool {
        self.cancel_pending(host);
        if self.state != SchedulerState::Running {
            return false;
        }
        if Self::frame_interval(speed).is_none() {
            tracing::debug!(speed, "scramble scheduler parked");
            return false;
        }
        self.pending = Some(host.request_frame());
        true
    }

    /// Take ownership of a delivered request.
    ///
    /// Returns `false` for stale deliveries: not running, nothing pending,
    /// or a token other than the outstanding one.
    pub fn claim(&mut self, request: FrameRequest) -> bool {
        if self.state != SchedulerState::Running || self.pending != Some(request) {
            tracing::trace!(request = request.id(), "stale frame ignored");
            return false;
        }
        self.pending = None;
        true
    }

    /// Whether a claimed frame at `now` is far enough from the last
    /// accepted one. The first frame after [`start`](Self::start) always is.
    pub fn accept(&mut self, now: Duration, speed: f64) -> bool {
        let Some(interval) = Self::frame_interval(speed) else {
            return false;
        };
        let due = match self.last_accepted {
            Some(last) => now.saturating_sub(last) > interval,
            None => true,
        };
        if due {
            self.last_accepted = Some(now);
        }
        due
    }

    /// Stop after the final frame.
    pub fn complete<H: FrameHost + ?Sized>(&mut self, host: &mut H) {
        self.cancel_pending(host);
        self.state = SchedulerState::Completed;
    }

    /// Stop on request of the host. Idempotent.
    pub fn stop<H: FrameHost + ?Sized>(&mut self, host: &mut H) {
        self.cancel_pending(host);
        if self.state == SchedulerState::Running {
            self.state = SchedulerState::Cancelled;
            tracing::debug!("scramble scheduler cancelled");
        }
    }

    fn cancel_pending<H: FrameHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(request) = self.pending.take() {
            host.cancel_frame(request);
        }
    }
}
