#![forbid(unsafe_code)]

//! Per-position animation state.

/// One position of the control buffer.
///
/// The variant decides what the projector emits for the position and
/// whether the position still has work to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    /// Allocated but not yet assigned. Emits nothing.
    #[default]
    Empty,
    /// Pre-selected ahead of the frontier. Emits noise and holds its
    /// duration until the frontier reaches it.
    Armed(u32),
    /// Behind the frontier, emitting noise for `remaining` more frames.
    Scrambling(u32),
    /// Final character committed.
    Revealed(char),
    /// Exempt from scrambling; always emitted as-is.
    Literal(char),
    /// Overdrive paint ahead of the frontier.
    Filler(char),
}

impl Cell {
    /// Whether the cell holds a scramble countdown (armed or active).
    #[inline]
    #[must_use]
    pub const fn is_counting(self) -> bool {
        matches!(self, Self::Armed(_) | Self::Scrambling(_))
    }

    /// Whether the cell is final for `target`: revealed as `target` or a
    /// literal `target`.
    #[inline]
    #[must_use]
    pub fn is_settled_as(self, target: char) -> bool {
        matches!(self, Self::Revealed(c) | Self::Literal(c) if c == target)
    }

    /// The character the cell emits verbatim, if any.
    #[inline]
    #[must_use]
    pub const fn glyph(self) -> Option<char> {
        match self {
            Self::Revealed(c) | Self::Literal(c) | Self::Filler(c) => Some(c),
            Self::Empty | Self::Armed(_) | Self::Scrambling(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_cells() {
        assert!(Cell::Armed(0).is_counting());
        assert!(Cell::Scrambling(3).is_counting());
        assert!(!Cell::Empty.is_counting());
        assert!(!Cell::Revealed('a').is_counting());
    }

    #[test]
    fn settled_requires_matching_char() {
        assert!(Cell::Revealed('a').is_settled_as('a'));
        assert!(Cell::Literal(' ').is_settled_as(' '));
        assert!(!Cell::Revealed('a').is_settled_as('b'));
        assert!(!Cell::Filler('a').is_settled_as('a'));
        assert!(!Cell::Scrambling(0).is_settled_as('a'));
    }

    #[test]
    fn glyphs() {
        assert_eq!(Cell::Filler('_').glyph(), Some('_'));
        assert_eq!(Cell::Armed(2).glyph(), None);
        assert_eq!(Cell::default(), Cell::Empty);
    }
}
