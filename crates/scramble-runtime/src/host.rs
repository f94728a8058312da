#![forbid(unsafe_code)]

//! Frame hosts: the collaborators that drive time.
//!
//! A [`FrameHost`] hands out [`FrameRequest`] tokens and later delivers
//! each live request once, together with the refresh timestamp. Hosts never
//! call back into the session; the embedding loop polls them and forwards
//! deliveries to [`Session::on_frame`](crate::Session::on_frame).
//!
//! Two hosts are provided:
//!
//! - [`ManualFrames`]: deterministic stepper; the caller advances time.
//! - [`IntervalFrames`]: fixed-rate refreshes on the wall clock.
//!
//! # Invariants
//!
//! 1. A request is delivered at most once.
//! 2. A cancelled request is never delivered.
//! 3. A request made while a refresh is being drained waits for the next
//!    refresh, so one refresh never runs the same session twice.

use core::time::Duration;
use std::collections::VecDeque;
use std::time::Instant;

/// Token for one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequest(u64);

impl FrameRequest {
    /// Raw token value.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// A source of display refreshes.
pub trait FrameHost {
    /// Ask for a callback on the next refresh.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a request. Unknown or already delivered requests are ignored.
    fn cancel_frame(&mut self, request: FrameRequest);

    /// Next due delivery, if any: the request and the refresh timestamp.
    fn poll_frame(&mut self) -> Option<(FrameRequest, Duration)>;
}

impl<H: FrameHost + ?Sized> FrameHost for &mut H {
    fn request_frame(&mut self) -> FrameRequest {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        (**self).cancel_frame(request);
    }

    fn poll_frame(&mut self) -> Option<(FrameRequest, Duration)> {
        (**self).poll_frame()
    }
}

/// Request bookkeeping shared by the provided hosts.
///
/// Requests wait until [`refresh`](Self::refresh) stamps them with a
/// timestamp; stamped requests are then popped in request order.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    next_id: u64,
    waiting: Vec<FrameRequest>,
    due: VecDeque<(FrameRequest, Duration)>,
}

impl FrameQueue {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            waiting: Vec::new(),
            due: VecDeque::new(),
        }
    }

    /// Issue a fresh token and queue it for the next refresh.
    pub fn request(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_id);
        self.next_id += 1;
        self.waiting.push(request);
        request
    }

    pub fn cancel(&mut self, request: FrameRequest) {
        self.waiting.retain(|r| *r != request);
        self.due.retain(|(r, _)| *r != request);
    }

    /// Mark every waiting request due at `now`. Returns how many.
    pub fn refresh(&mut self, now: Duration) -> usize {
        let count = self.waiting.len();
        self.due.extend(self.waiting.drain(..).map(|r| (r, now)));
        count
    }

    pub fn pop_due(&mut self) -> Option<(FrameRequest, Duration)> {
        self.due.pop_front()
    }

    /// Live requests, waiting or due.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.waiting.len() + self.due.len()
    }

    #[must_use]
    pub fn has_due(&self) -> bool {
        !self.due.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ManualFrames
// ---------------------------------------------------------------------------

/// Deterministic host controlled by the caller.
///
/// Time only moves through [`advance`](Self::advance), and each advance
/// is exactly one refresh.
#[derive(Debug, Clone, Default)]
pub struct ManualFrames {
    now: Duration,
    refreshes: u64,
    queue: FrameQueue,
}

impl ManualFrames {
    /// Host at time zero with nothing pending.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            refreshes: 0,
            queue: FrameQueue::new(),
        }
    }

    /// Current host time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Refreshes performed so far.
    #[must_use]
    pub const fn refreshes(&self) -> u64 {
        self.refreshes
    }

    /// Move time forward by `dt` and perform one refresh.
    /// Returns the number of requests that became due.
    pub fn advance(&mut self, dt: Duration) -> usize {
        self.now = self.now.saturating_add(dt);
        self.refreshes += 1;
        self.queue.refresh(self.now)
    }

    /// Live requests, waiting or due.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }
}

impl FrameHost for ManualFrames {
    fn request_frame(&mut self) -> FrameRequest {
        self.queue.request()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.queue.cancel(request);
    }

    fn poll_frame(&mut self) -> Option<(FrameRequest, Duration)> {
        self.queue.pop_due()
    }
}

// ---------------------------------------------------------------------------
// IntervalFrames
// ---------------------------------------------------------------------------

/// Wall-clock host refreshing at a fixed period.
///
/// Timestamps are measured from construction. If the loop falls behind,
/// missed refreshes are dropped rather than delivered in a burst.
#[derive(Debug, Clone)]
pub struct IntervalFrames {
    origin: Instant,
    period: Duration,
    next_refresh: Instant,
    queue: FrameQueue,
}

impl IntervalFrames {
    /// Host refreshing every `period` (at least 1ms).
    #[must_use]
    pub fn new(period: Duration) -> Self {
        let origin = Instant::now();
        let period = period.max(Duration::from_millis(1));
        Self {
            origin,
            period,
            next_refresh: origin,
            queue: FrameQueue::new(),
        }
    }

    /// Host refreshing `fps` times per second.
    #[must_use]
    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Time since construction.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Block until the next refresh is due.
    pub fn wait_next(&self) {
        let remaining = self.next_refresh.saturating_duration_since(Instant::now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }

    fn refresh_if_due(&mut self) {
        let now = Instant::now();
        if now < self.next_refresh {
            return;
        }
        self.queue.refresh(now.duration_since(self.origin));
        self.next_refresh += self.period;
        if self.next_refresh <= now {
            self.next_refresh = now + self.period;
        }
    }
}

impl FrameHost for IntervalFrames {
    fn request_frame(&mut self) -> FrameRequest {
        self.queue.request()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.queue.cancel(request);
    }

    fn poll_frame(&mut self) -> Option<(FrameRequest, Duration)> {
        if !self.queue.has_due() {
            self.refresh_if_due();
        }
        self.queue.pop_due()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(17);

    #[test]
    fn requests_wait_for_a_refresh() {
        let mut host = ManualFrames::new();
        let request = host.request_frame();
        assert_eq!(host.poll_frame(), None);

        assert_eq!(host.advance(FRAME), 1);
        assert_eq!(host.poll_frame(), Some((request, FRAME)));
        assert_eq!(host.poll_frame(), None);
        assert_eq!(host.pending_count(), 0);
    }

    #[test]
    fn cancelled_requests_are_never_delivered() {
        let mut host = ManualFrames::new();
        let first = host.request_frame();
        host.cancel_frame(first);
        host.cancel_frame(first);
        let second = host.request_frame();
        host.advance(FRAME);
        assert_eq!(host.poll_frame(), Some((second, FRAME)));
        assert_eq!(host.poll_frame(), None);
    }

    #[test]
    fn cancel_after_refresh_removes_due_entry() {
        let mut host = ManualFrames::new();
        let request = host.request_frame();
        host.advance(FRAME);
        host.cancel_frame(request);
        assert_eq!(host.poll_frame(), None);
    }

    #[test]
    fn request_during_drain_waits_for_next_refresh() {
        let mut host = ManualFrames::new();
        host.request_frame();
        host.advance(FRAME);
        let _ = host.poll_frame();
        let follow_up = host.request_frame();
        assert_eq!(host.poll_frame(), None);
        host.advance(FRAME);
        assert_eq!(host.poll_frame(), Some((follow_up, FRAME * 2)));
    }

    #[test]
    fn tokens_are_unique() {
        let mut queue = FrameQueue::new();
        let a = queue.request();
        let b = queue.request();
        assert_ne!(a, b);
        assert!(b.id() > a.id());
    }

    #[test]
    fn interval_host_delivers_first_refresh_immediately() {
        let mut host = IntervalFrames::from_fps(1000);
        let request = host.request_frame();
        let delivered = host.poll_frame();
        assert_eq!(delivered.map(|(r, _)| r), Some(request));
        assert_eq!(host.period(), Duration::from_millis(1));
    }

    #[test]
    fn interval_host_refreshes_after_waiting() {
        let mut host = IntervalFrames::new(Duration::from_millis(2));
        host.request_frame();
        let (_, first) = host.poll_frame().expect("first refresh");
        let request = host.request_frame();
        host.wait_next();
        let (delivered, second) = host.poll_frame().expect("second refresh");
        assert_eq!(delivered, request);
        assert!(second > first);
    }

    #[test]
    fn zero_fps_is_clamped() {
        let host = IntervalFrames::from_fps(0);
        assert_eq!(host.period(), Duration::from_secs(1));
    }
}
