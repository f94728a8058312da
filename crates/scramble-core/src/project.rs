#![forbid(unsafe_code)]

//! Projector: control buffer + target + frontier → this frame's string.
//!
//! Projection is not read-only: counting cells at or behind the frontier
//! tick down, and cells that reach zero are committed as [`Cell::Revealed`].
//!
//! | Cell              | Emits                 | Side effect                       |
//! |-------------------|-----------------------|-----------------------------------|
//! | `Scrambling(d>0)` | noise                 | `d -= 1` if `i <= frontier`       |
//! | `Scrambling(0)`   | target char           | becomes `Revealed(target)`        |
//! | `Armed(_)`        | noise                 | none (holds until crossed)        |
//! | `Revealed(c)`     | `c`                   | none                              |
//! | `Literal(c)`      | `c`                   | none                              |
//! | `Filler(c)`       | `c`                   | none                              |
//! | `Empty`           | nothing               | none                              |

use crate::cell::Cell;
use crate::config::CharRange;
use crate::control::{ControlBuffer, TargetText};
use crate::random::RandomSource;

/// One projected frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// The string to display.
    pub text: String,
    /// Output equals the target; the buffer has been trimmed to its length.
    pub complete: bool,
}

/// Render `buffer` into a string, advancing countdowns.
///
/// Completion is output equality, which noise can reach before every
/// countdown has run out. On completion the buffer is truncated to the
/// target length and every remaining cell is committed.
pub fn project(
    buffer: &mut ControlBuffer,
    target: &TargetText,
    frontier: usize,
    range: &CharRange,
    rng: &mut dyn RandomSource,
) -> Projection {
    let mut text = String::with_capacity(buffer.len());

    for (index, cell) in buffer.cells_mut().iter_mut().enumerate() {
        match *cell {
            Cell::Scrambling(remaining) if remaining > 0 => {
                text.push(rng.random_char(range));
                if index <= frontier {
                    *cell = Cell::Scrambling(remaining - 1);
                }
            }
            Cell::Scrambling(_) => match target.char_at(index) {
                Some(c) => {
                    text.push(c);
                    *cell = Cell::Revealed(c);
                }
                None => *cell = Cell::Empty,
            },
            Cell::Armed(_) => text.push(rng.random_char(range)),
            Cell::Revealed(c) | Cell::Literal(c) | Cell::Filler(c) => text.push(c),
            Cell::Empty => {}
        }
    }

    let complete = text == target.as_str();
    if complete {
        settle(buffer, target);
    }
    Projection { text, complete }
}

/// Trim to the target length and commit every position as its target
/// character, so later projections repeat the same output.
fn settle(buffer: &mut ControlBuffer, target: &TargetText) {
    buffer.truncate(target.len());
    for (cell, &want) in buffer.cells_mut().iter_mut().zip(target.chars()) {
        if !cell.is_settled_as(want) {
            *cell = Cell::Revealed(want);
        }
    }
}
