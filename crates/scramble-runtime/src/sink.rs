#![forbid(unsafe_code)]

//! Render sinks: where projected frames go.
//!
//! A sink receives the whole output string once per accepted frame and
//! replaces whatever it showed before. It may report itself not ready
//! (e.g. a display surface not attached yet); frames are then skipped
//! rather than failing the session.

/// Destination for projected frames.
pub trait RenderSink {
    /// Replace the displayed text with `text`.
    fn render(&mut self, text: &str);

    /// Whether frames can be shown right now.
    fn is_ready(&self) -> bool {
        true
    }
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn render(&mut self, text: &str) {
        (**self).render(text);
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn render(&mut self, text: &str) {
        (**self).render(text);
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// In-memory sink holding the latest frame, optionally every frame.
#[derive(Debug, Clone, Default)]
pub struct StringSink {
    current: String,
    history: Option<Vec<String>>,
    renders: usize,
    offline: bool,
}

impl StringSink {
    /// Sink keeping only the latest frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink keeping every rendered frame in order.
    #[must_use]
    pub fn recording() -> Self {
        Self {
            history: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Toggle readiness; a sink that is not ready causes frames to be skipped.
    pub fn set_ready(&mut self, ready: bool) {
        self.offline = !ready;
    }

    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Rendered frames, oldest first. Empty unless [`recording`](Self::recording).
    #[must_use]
    pub fn history(&self) -> &[String] {
        self.history.as_deref().unwrap_or_default()
    }

    /// Number of `render` calls received.
    #[must_use]
    pub const fn renders(&self) -> usize {
        self.renders
    }
}

impl RenderSink for StringSink {
    fn render(&mut self, text: &str) {
        self.current.clear();
        self.current.push_str(text);
        if let Some(history) = self.history.as_mut() {
            history.push(text.to_owned());
        }
        self.renders += 1;
    }

    fn is_ready(&self) -> bool {
        !self.offline
    }
}
