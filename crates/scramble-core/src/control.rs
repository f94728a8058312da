#![forbid(unsafe_code)]

//! Control buffer: the animation's mutable per-position state.
//!
//! The buffer follows the target text's length but may lag behind it
//! while a resize is in progress. Resizing is paced: [`ControlBuffer::grow_toward`]
//! and [`ControlBuffer::shrink_toward`] each move at most `step` cells per call.

use crate::cell::Cell;

/// The text being revealed, indexed by `char`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetText {
    text: String,
    chars: Vec<char>,
}

impl TargetText {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let chars = text.chars().collect();
        Self { text, chars }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[inline]
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Length in `char`s.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }
}

/// Ordered cells, one per position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlBuffer {
    cells: Vec<Cell>,
}

impl ControlBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    #[must_use]
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Overwrite `index`, extending with [`Cell::Empty`] if it lies past the end.
    pub fn set(&mut self, index: usize, cell: Cell) {
        if index >= self.cells.len() {
            self.cells.resize(index + 1, Cell::Empty);
        }
        self.cells[index] = cell;
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn truncate(&mut self, len: usize) {
        self.cells.truncate(len);
    }

    /// Append up to `step` cells toward `target`'s length.
    ///
    /// Appended cells are [`Cell::Literal`] where the target character is
    /// ignored and [`Cell::Empty`] otherwise. Returns the number appended.
    pub fn grow_toward(
        &mut self,
        target: &TargetText,
        step: usize,
        is_ignored: impl Fn(char) -> bool,
    ) -> usize {
        let mut appended = 0;
        while self.cells.len() < target.len() && appended < step {
            let cell = match target.char_at(self.cells.len()) {
                Some(c) if is_ignored(c) => Cell::Literal(c),
                _ => Cell::Empty,
            };
            self.cells.push(cell);
            appended += 1;
        }
        appended
    }

    /// Remove up to `step` cells from the tail toward `len`.
    /// Returns the number removed.
    pub fn shrink_toward(&mut self, len: usize, step: usize) -> usize {
        let excess = self.cells.len().saturating_sub(len);
        let removed = excess.min(step);
        self.cells.truncate(self.cells.len() - removed);
        removed
    }

    /// Replace the contents with the fully revealed `target`.
    pub fn reveal(&mut self, target: &TargetText, is_ignored: impl Fn(char) -> bool) {
        self.cells.clear();
        self.cells.extend(target.chars().iter().map(|&c| {
            if is_ignored(c) {
                Cell::Literal(c)
            } else {
                Cell::Revealed(c)
            }
        }));
    }
}
