//! Fixed-capacity circular buffer computing windowed counter deltas.
//!
//! Each channel keeps the last `W` cumulative samples. Writing a new sample
//! evicts the sample taken `W` ticks earlier; the difference between the two
//! is the counter growth over the window. No timestamps are involved: the
//! caller must push exactly one sample per polling tick.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Decides when an evicted cell is old enough to produce a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupGuard {
    /// A cell holding zero is treated like an unwritten cell.
    ///
    /// A genuine zero sample is indistinguishable from "no data" and never
    /// produces a delta when evicted.
    #[default]
    ZeroSentinel,
    /// Any written cell produces a delta when evicted, including zero.
    WrittenFlag,
}

impl WarmupGuard {
    /// Returns the evicted sample if it may be used as a delta base.
    fn base(self, cell: Option<i64>) -> Option<i64> {
        match (self, cell) {
            (_, None) => None,
            (WarmupGuard::ZeroSentinel, Some(0)) => None,
            (_, Some(sample)) => Some(sample),
        }
    }
}

/// A ring of `W` sample cells with a write cursor.
#[derive(Debug, Clone)]
pub struct DeltaRing {
    cells: Box<[Option<i64>]>,
    cursor: usize,
    guard: WarmupGuard,
}

impl DeltaRing {
    /// Creates a ring with `window` empty cells and the cursor at 0.
    pub fn new(window: NonZeroUsize, guard: WarmupGuard) -> Self {
        Self {
            cells: vec![None; window.get()].into_boxed_slice(),
            cursor: 0,
            guard,
        }
    }

    /// Returns the ring capacity `W`.
    pub fn window(&self) -> usize {
        self.cells.len()
    }

    /// Returns the position the next sample will be written to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Writes `sample` at the cursor and advances it by one.
    ///
    /// Returns `sample - evicted - noise` when the evicted cell is warm,
    /// or `None` while the slot is still warming up.
    pub fn push(&mut self, sample: i64, noise: i64) -> Option<i64> {
        let evicted = self.cells[self.cursor];
        let delta = self
            .guard
            .base(evicted)
            .map(|base| sample.saturating_sub(base).saturating_sub(noise));

        self.write(sample);
        delta
    }

    /// Writes `value` at the cursor and advances it by one, without
    /// computing a delta.
    pub fn write(&mut self, value: i64) {
        self.cells[self.cursor] = Some(value);
        self.cursor = (self.cursor + 1) % self.cells.len();
    }

    /// Returns the most recently written cell, `cells[(cursor - 1) mod W]`.
    ///
    /// `None` if that cell has never been written.
    pub fn latest(&self) -> Option<i64> {
        let len = self.cells.len();
        self.cells[(self.cursor + len - 1) % len]
    }

    /// Returns true once every cell has been written at least once.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Iterates over the cells in storage order, unwritten cells read as 0.
    pub fn samples(&self) -> impl Iterator<Item = i64> + '_ {
        self.cells.iter().map(|cell| cell.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ring(window: usize, guard: WarmupGuard) -> DeltaRing {
        DeltaRing::new(NonZeroUsize::new(window).unwrap(), guard)
    }

    #[test]
    fn test_first_pass_is_warmup() {
        let mut r = ring(3, WarmupGuard::ZeroSentinel);
        assert_eq!(r.push(10, 0), None);
        assert_eq!(r.push(20, 0), None);
        assert_eq!(r.push(30, 0), None);
        assert!(r.is_full());
        assert_eq!(r.push(45, 0), Some(35));
        assert_eq!(r.push(50, 0), Some(30));
    }

    #[test]
    fn test_noise_is_subtracted() {
        let mut r = ring(3, WarmupGuard::ZeroSentinel);
        for s in [10, 20, 30] {
            r.push(s, 0);
        }
        assert_eq!(r.push(45, 2), Some(33));
    }

    #[test]
    fn test_noise_ignored_during_warmup() {
        let mut r = ring(2, WarmupGuard::ZeroSentinel);
        assert_eq!(r.push(10, 100), None);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut r = ring(3, WarmupGuard::ZeroSentinel);
        assert_eq!(r.cursor(), 0);
        for expected in [1, 2, 0, 1, 2, 0] {
            r.push(1, 0);
            assert_eq!(r.cursor(), expected);
        }
    }

    #[test]
    fn test_window_of_one() {
        let mut r = ring(1, WarmupGuard::ZeroSentinel);
        assert_eq!(r.push(5, 0), None);
        assert_eq!(r.push(8, 0), Some(3));
        assert_eq!(r.cursor(), 0);
        assert_eq!(r.latest(), Some(8));
    }

    #[test]
    fn test_zero_sample_stays_cold_with_zero_sentinel() {
        let mut r = ring(2, WarmupGuard::ZeroSentinel);
        r.push(0, 0);
        r.push(7, 0);
        // evicts the zero written first
        assert_eq!(r.push(9, 0), None);
        // evicts 7
        assert_eq!(r.push(12, 0), Some(5));
    }

    #[test]
    fn test_zero_sample_is_warm_with_written_flag() {
        let mut r = ring(2, WarmupGuard::WrittenFlag);
        r.push(0, 0);
        r.push(7, 0);
        assert_eq!(r.push(9, 0), Some(9));
    }

    #[test]
    fn test_guards_agree_on_non_zero_streams() {
        let mut legacy = ring(4, WarmupGuard::ZeroSentinel);
        let mut flagged = ring(4, WarmupGuard::WrittenFlag);
        for s in [3, 9, 14, 20, 31, 40, 41, 55, 60] {
            assert_eq!(legacy.push(s, 1), flagged.push(s, 1));
        }
    }

    #[test]
    fn test_latest_reads_last_written_cell() {
        let mut r = ring(3, WarmupGuard::ZeroSentinel);
        assert_eq!(r.latest(), None);
        r.push(-1, 0);
        assert_eq!(r.latest(), Some(-1));
        r.push(4, 0);
        r.push(6, 0);
        r.push(11, 0);
        assert_eq!(r.latest(), Some(11));
    }

    #[test]
    fn test_write_stores_value_and_advances() {
        let mut r = ring(2, WarmupGuard::ZeroSentinel);
        r.write(0);
        assert_eq!(r.cursor(), 1);
        assert_eq!(r.latest(), Some(0));
        r.write(-7);
        r.write(3);
        assert_eq!(r.cursor(), 1);
        assert_eq!(r.latest(), Some(3));
        assert_eq!(r.samples().collect::<Vec<_>>(), vec![3, -7]);
    }

    #[test]
    fn test_samples_zero_fill() {
        let mut r = ring(3, WarmupGuard::ZeroSentinel);
        r.push(5, 0);
        assert_eq!(r.samples().collect::<Vec<_>>(), vec![5, 0, 0]);
    }
}
