#![forbid(unsafe_code)]

//! Advance engine: resizes the control buffer, pushes the reveal frontier,
//! and seeds positions ahead of it.
//!
//! A tick runs four phases in a fixed order. Later phases observe the
//! buffer length and frontier produced by earlier ones:
//!
//! 1. **Grow** toward the target length, at most `step` cells.
//! 2. **Shrink** toward the target length, at most `step` cells.
//! 3. **Step forward**: the frontier crosses up to `step` positions.
//! 4. **Seed forward**: `seed` random positions in `[frontier, len)` are armed.
//!
//! The overdrive sweep is separate: it runs on every host frame, not only
//! on gated ticks. It writes past the end of the buffer when the target is
//! longer, so with overdrive on the buffer can grow by more than `step`
//! cells between two ticks. Until the sweep catches up, positions grown but
//! not yet painted stay `Empty`, and output after such a gap is shifted left.
//!
//! # Invariants
//!
//! - The frontier never decreases except through [`AdvanceEngine::reset`].
//! - `frontier <= target.len()` after every tick.
//! - Cells behind the frontier are `Scrambling`, `Revealed`, or `Literal`.

use crate::cell::Cell;
use crate::config::ScrambleConfig;
use crate::control::{ControlBuffer, TargetText};
use crate::random::RandomSource;

/// What one tick changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Cells appended by the grow phase.
    pub grown: usize,
    /// Cells removed by the shrink phase.
    pub shrunk: usize,
    /// Positions crossed by the frontier.
    pub stepped: usize,
    /// Positions armed by seeding.
    pub seeded: usize,
}

/// Frontier, overdrive cursor, and frame counter for one playback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceEngine {
    frontier: usize,
    overdrive: usize,
    frame: u64,
}

impl AdvanceEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frontier: 0,
            overdrive: 0,
            frame: 0,
        }
    }

    /// Index up to which positions are being revealed.
    #[inline]
    #[must_use]
    pub const fn frontier(&self) -> usize {
        self.frontier
    }

    /// Next position the overdrive sweep will paint.
    #[inline]
    #[must_use]
    pub const fn overdrive_cursor(&self) -> usize {
        self.overdrive
    }

    /// Accepted frames since the last reset.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Zero the frontier, overdrive cursor, and frame counter.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Park every cursor at the end of `len` positions (reveal immediately).
    pub fn finish_at(&mut self, len: usize) {
        self.frontier = len;
        self.overdrive = len;
        self.frame = len as u64;
    }

    /// Whether the frontier/seed phases fire on the current frame.
    #[inline]
    #[must_use]
    pub fn is_tick_frame(&self, tick: u32) -> bool {
        self.frame % u64::from(tick.max(1)) == 0
    }

    /// Count one accepted frame.
    #[inline]
    pub fn end_frame(&mut self) {
        self.frame += 1;
    }

    /// Run the four tick phases in order.
    pub fn tick(
        &mut self,
        buffer: &mut ControlBuffer,
        target: &TargetText,
        config: &ScrambleConfig,
        rng: &mut dyn RandomSource,
    ) -> TickReport {
        let step = config.step.max(1) as usize;
        let ignored = |c: char| config.is_ignored(c);

        let grown = buffer.grow_toward(target, step, ignored);
        let shrunk = buffer.shrink_toward(target.len(), step);
        let stepped = self.step_forward(buffer, target, config, rng);
        let seeded = self.seed_forward(buffer, target, config, rng);

        let report = TickReport {
            grown,
            shrunk,
            stepped,
            seeded,
        };
        tracing::trace!(
            frame = self.frame,
            frontier = self.frontier,
            len = buffer.len(),
            grown,
            shrunk,
            stepped,
            seeded,
            "scramble tick"
        );
        report
    }

    /// Move the frontier across up to `step` positions, assigning each
    /// crossed position its scramble state.
    fn step_forward(
        &mut self,
        buffer: &mut ControlBuffer,
        target: &TargetText,
        config: &ScrambleConfig,
        rng: &mut dyn RandomSource,
    ) -> usize {
        let step = config.step.max(1) as usize;
        let mut stepped = 0;
        while stepped < step && self.frontier < target.len() {
            let index = self.frontier;
            let Some(want) = target.char_at(index) else {
                break;
            };
            let current = buffer.get(index).unwrap_or_default();
            let next = if config.is_ignored(want) {
                Cell::Literal(want)
            } else if current == Cell::Revealed(want) {
                // Overlap with the previous text: keep it.
                current
            } else if let Cell::Armed(remaining) = current {
                Cell::Scrambling(remaining)
            } else if rng.passes_chance(config.chance) {
                Cell::Scrambling(rng.random_scramble_duration(config.scramble))
            } else {
                Cell::Scrambling(0)
            };
            buffer.set(index, next);
            self.frontier += 1;
            stepped += 1;
        }
        stepped
    }

    /// Arm up to `seed` random positions in `[frontier, len)`.
    ///
    /// Any cell not already counting is armable: `Empty` and `Filler` cells,
    /// and `Revealed` cells left over from a previous target.
    fn seed_forward(
        &mut self,
        buffer: &mut ControlBuffer,
        target: &TargetText,
        config: &ScrambleConfig,
        rng: &mut dyn RandomSource,
    ) -> usize {
        if self.frontier >= target.len() {
            return 0;
        }
        let mut seeded = 0;
        for _ in 0..config.seed {
            let len = buffer.len();
            if self.frontier >= len {
                break;
            }
            let index = rng.random_index(self.frontier, len);
            let Some(cell) = buffer.get(index) else {
                continue;
            };
            let want = target.char_at(index);
            if want.is_some_and(|c| config.is_ignored(c)) {
                continue;
            }
            let armable = match cell {
                Cell::Empty | Cell::Filler(_) => true,
                Cell::Revealed(c) => Some(c) != want,
                Cell::Armed(_) | Cell::Scrambling(_) | Cell::Literal(_) => false,
            };
            if armable && rng.passes_chance(config.chance) {
                buffer.set(
                    index,
                    Cell::Armed(rng.random_scramble_duration(config.scramble)),
                );
                seeded += 1;
            }
        }
        seeded
    }

    /// Overdrive sweep: paint up to `step` positions ahead of the frontier
    /// with the configured filler. Runs every host frame.
    ///
    /// Ignored target positions are written as literals; cells already
    /// revealed as their target are left alone. Returns positions visited.
    pub fn overdrive_sweep(
        &mut self,
        buffer: &mut ControlBuffer,
        target: &TargetText,
        config: &ScrambleConfig,
    ) -> usize {
        let Some(filler) = config.overdrive.filler() else {
            return 0;
        };
        self.overdrive = self.overdrive.max(self.frontier);
        let step = config.step.max(1) as usize;
        let mut swept = 0;
        while swept < step {
            let limit = buffer.len().max(target.len());
            if self.overdrive >= limit {
                break;
            }
            let index = self.overdrive;
            let want = target.char_at(index);
            let current = buffer.get(index).unwrap_or_default();
            match want {
                Some(c) if config.is_ignored(c) => buffer.set(index, Cell::Literal(c)),
                Some(c) if current == Cell::Revealed(c) => {}
                _ => buffer.set(index, Cell::Filler(filler)),
            }
            self.overdrive += 1;
            swept += 1;
        }
        swept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overdrive;
    use crate::random::{SeededRandom, SequenceRandom};

    fn config() -> ScrambleConfig {
        ScrambleConfig::default().seed(0)
    }

    #[test]
    fn first_tick_grows_and_steps() {
        let target = TargetText::new("CAT");
        let mut buffer = ControlBuffer::new();
        let mut engine = AdvanceEngine::new();
        // Draw 1 skips the dwell bonus.
        let mut rng = SequenceRandom::new([1]);
        let cfg = config().scramble(2).ignore([]);

        let report = engine.tick(&mut buffer, &target, &cfg, &mut rng);

        assert_eq!(report.grown, 1);
        assert_eq!(report.stepped, 1);
        assert_eq!(engine.frontier(), 1);
        assert_eq!(buffer.cells(), &[Cell::Scrambling(2)]);
    }

    #[test]
    fn step_forward_writes_literal_for_ignored() {
        let target = TargetText::new(" A");
        let mut buffer = ControlBuffer::new();
        let mut engine = AdvanceEngine::new();
        let mut rng = SeededRandom::seeded(1);

        engine.tick(&mut buffer, &target, &config(), &mut rng);

        assert_eq!(buffer.get(0), Some(Cell::Literal(' ')));
    }

    #[test]
    fn step_forward_preserves_matching_revealed() {
        let target = TargetText::new("HI");
        let mut buffer =
            ControlBuffer::from_cells(vec![Cell::Revealed('H'), Cell::Revealed('E')]);
        let mut engine = AdvanceEngine::new();
        let mut rng = SeededRandom::seeded(2);
        let cfg = config().step(2).scramble(3);

        engine.tick(&mut buffer, &target, &cfg, &mut rng);

        assert_eq!(buffer.get(0), Some(Cell::Revealed('H')));
        assert!(matches!(buffer.get(1), Some(Cell::Scrambling(d)) if d >= 3));
    }

    #[test]
    fn step_forward_promotes_armed_duration() {
        let target = TargetText::new("AB");
        let mut buffer = ControlBuffer::from_cells(vec![Cell::Armed(7), Cell::Empty]);
        let mut engine = AdvanceEngine::new();
        let mut rng = SeededRandom::seeded(3);

        engine.tick(&mut buffer, &target, &config(), &mut rng);

        assert_eq!(buffer.get(0), Some(Cell::Scrambling(7)));
    }

    #[test]
    fn zero_chance_reveals_on_crossing() {
        let target = TargetText::new("XY");
        let mut buffer = ControlBuffer::new();
        let mut engine = AdvanceEngine::new();
        let mut rng = SeededRandom::seeded(4);
        let cfg = config().chance(0.0).scramble(5).step(2);

        engine.tick(&mut buffer, &target, &cfg, &mut rng);

        assert_eq!(buffer.cells(), &[Cell::Scrambling(0), Cell::Scrambling(0)]);
    }

    #[test]
    fn frontier_stops_at_target_length() {
        let target = TargetText::new("AB");
        let mut buffer = ControlBuffer::new();
        let mut engine = AdvanceEngine::new();
        let mut rng = SeededRandom::seeded(5);
        let cfg = config().step(5);

        engine.tick(&mut buffer, &target, &cfg, &mut rng);
        engine.tick(&mut buffer, &target, &cfg, &mut rng);

        assert_eq!(engine.frontier(), 2);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn shrink_happens_in_steps() {
        let target = TargetText::new("HI");
        let mut buffer = ControlBuffer::from_cells(vec![Cell::Revealed('x'); 5]);
        let mut engine = AdvanceEngine::new();
        let mut rng = SeededRandom::seeded(6);

        let report = engine.tick(&mut buffer, &target, &config(), &mut rng);
        assert_eq!(report.shrunk, 1);
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn seeding_arms_only_ahead_of_frontier() {
        let target = TargetText::new("ABCDEF");
        let mut buffer = ControlBuffer::from_cells(vec![Cell::Revealed('z'); 6]);
        let mut engine = AdvanceEngine::new();
        let mut rng = SeededRandom::seeded(7);
        let cfg = config().seed(50).scramble(2);

        let report = engine.tick(&mut buffer, &target, &cfg, &mut rng);

        assert!(report.seeded > 0);
        assert!(matches!(buffer.get(0), Some(Cell::Scrambling(_))));
        for cell in &buffer.cells()[1..] {
            assert!(
                matches!(cell, Cell::Armed(_) | Cell::Revealed('z')),
                "unexpected {cell:?}"
            );
        }
    }

    #[test]
    fn seeding_arms_empty_cells_left_by_growth() {
        // Preserve-mode growth: "AB" is revealed, the rest is still unallocated.
        let target = TargetText::new("ABCDEFGH");
        let mut buffer = ControlBuffer::from_cells(vec![Cell::Revealed('A'), Cell::Revealed('B')]);
        let mut engine = AdvanceEngine::new();
        let mut rng = SeededRandom::seeded(10);
        let cfg = config().step(6).seed(50).scramble(2);

        // One tick: grow to 8, frontier to 6, then seed the two cells ahead.
        let report = engine.tick(&mut buffer, &target, &cfg, &mut rng);

        assert_eq!(report.grown, 6);
        assert_eq!(engine.frontier(), 6);
        assert_eq!(report.seeded, 2);
        assert!(matches!(buffer.get(6), Some(Cell::Armed(d)) if d >= 2));
        assert!(matches!(buffer.get(7), Some(Cell::Armed(d)) if d >= 2));
    }

    #[test]
    fn seeding_arms_empty_cells_ahead_of_frontier() {
        let target = TargetText::new("ABCDEFGH");
        let mut buffer = ControlBuffer::from_cells(vec![Cell::Empty; 8]);
        let mut engine = AdvanceEngine::new();
        let mut rng = SeededRandom::seeded(11);
        let cfg = config().seed(50);

        let report = engine.tick(&mut buffer, &target, &cfg, &mut rng);

        assert!(report.seeded > 0);
        assert!(matches!(buffer.get(0), Some(Cell::Scrambling(_))));
        assert!(buffer.cells()[1..].iter().any(|c| matches!(c, Cell::Armed(_))));
        assert!(
            buffer.cells()[1..]
                .iter()
                .all(|c| matches!(c, Cell::Armed(_) | Cell::Empty))
        );
    }

    #[test]
    fn seeding_skips_matching_and_literal_cells() {
        let target = TargetText::new("A B");
        let mut buffer = ControlBuffer::from_cells(vec![
            Cell::Revealed('A'),
            Cell::Literal(' '),
            Cell::Revealed('B'),
        ]);
        let mut engine = AdvanceEngine::new();
        let mut rng = SeededRandom::seeded(8);
        let cfg = config().seed(40);

        let report = engine.tick(&mut buffer, &target, &cfg, &mut rng);

        assert_eq!(report.seeded, 0);
        assert_eq!(buffer.get(1), Some(Cell::Literal(' ')));
        assert_eq!(buffer.get(2), Some(Cell::Revealed('B')));
    }

    #[test]
    fn tick_gating_uses_frame_counter() {
        let mut engine = AdvanceEngine::new();
        let fired: Vec<bool> = (0..6)
            .map(|_| {
                let fire = engine.is_tick_frame(3);
                engine.end_frame();
                fire
            })
            .collect();
        assert_eq!(fired, vec![true, false, false, true, false, false]);
    }

    #[test]
    fn overdrive_paints_ahead_and_respects_literals() {
        let target = TargetText::new("AB CD");
        let mut buffer = ControlBuffer::new();
        let mut engine = AdvanceEngine::new();
        let cfg = config().overdrive(true).step(2);

        assert_eq!(engine.overdrive_sweep(&mut buffer, &target, &cfg), 2);
        assert_eq!(engine.overdrive_sweep(&mut buffer, &target, &cfg), 2);
        assert_eq!(
            buffer.cells(),
            &[
                Cell::Filler('_'),
                Cell::Filler('_'),
                Cell::Literal(' '),
                Cell::Filler('_'),
            ]
        );
        assert_eq!(engine.overdrive_sweep(&mut buffer, &target, &cfg), 1);
        assert_eq!(engine.overdrive_sweep(&mut buffer, &target, &cfg), 0);
        assert_eq!(engine.overdrive_cursor(), 5);
    }

    #[test]
    fn overdrive_never_paints_behind_frontier() {
        let target = TargetText::new("ABCD");
        let mut buffer = ControlBuffer::new();
        let mut engine = AdvanceEngine::new();
        let mut rng = SeededRandom::seeded(9);
        let cfg = config().step(2).overdrive(Overdrive::Char('#'));

        engine.tick(&mut buffer, &target, &cfg, &mut rng);
        engine.overdrive_sweep(&mut buffer, &target, &cfg);

        assert!(buffer.cells()[..2].iter().all(|c| c.is_counting()));
        assert_eq!(buffer.cells()[2..], [Cell::Filler('#'), Cell::Filler('#')]);
    }

    #[test]
    fn overdrive_off_is_noop() {
        let target = TargetText::new("AB");
        let mut buffer = ControlBuffer::new();
        let mut engine = AdvanceEngine::new();
        assert_eq!(engine.overdrive_sweep(&mut buffer, &target, &config()), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn finish_and_reset() {
        let mut engine = AdvanceEngine::new();
        engine.finish_at(4);
        assert_eq!((engine.frontier(), engine.overdrive_cursor(), engine.frame()), (4, 4, 4));
        engine.reset();
        assert_eq!(engine, AdvanceEngine::new());
    }
}
