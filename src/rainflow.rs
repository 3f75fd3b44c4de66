//! Incremental rainflow cycle counting (ASTM E1049-85, section 5.4.4).
//!
//! [`Dropflow`] drops one point at a time into the counter instead of letting the
//! whole "rain" of a series fall at once. Reversal points are tracked as samples
//! arrive; cycles are pulled out of the reversal buffer on demand with
//! [`Dropflow::extract_new_cycles`] or [`Dropflow::extract_all_cycles`].
//!
//! ```
//! use dropflow::rainflow::Dropflow;
//!
//! let mut counter = Dropflow::new();
//! for (i, x) in [-2.0, 1.0, -3.0, 5.0, -1.0, 3.0, -4.0, 4.0, -2.0].into_iter().enumerate() {
//!     counter.add_point(x, i);
//! }
//! let cycles: Vec<_> = counter.extract_all_cycles(false).collect();
//! assert_eq!(cycles.len(), 7);
//! assert_eq!(cycles.iter().filter(|c| c.is_full()).count(), 1);
//! ```
use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::cycle::Cycle;
use crate::reversal::{ReversalTracker, Sample, Step};
use crate::stats::RunningMean;

/// Incremental rainflow counter for a single load series.
#[derive(Debug, Clone, Default)]
pub struct Dropflow {
    tracker: ReversalTracker,
    /// Confirmed reversal points, oldest first.
    reversals: VecDeque<Sample>,
    /// Latest sample, whose reversal status is decided by the next one.
    stopper: Option<Sample>,
    /// Records whose points left the buffer during all-cycles extraction.
    closed_cycles: Vec<Cycle>,
    mean: RunningMean,
}

impl Dropflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the point `(index, x)` to the series.
    ///
    /// Indices are expected to be non-decreasing. Non-finite values are
    /// skipped and leave the counter untouched.
    pub fn add_point(&mut self, x: f64, index: usize) {
        if !x.is_finite() {
            warn!(index, value = x, "ignoring non-finite sample");
            return;
        }
        let sample = Sample::new(index, x);
        match self.tracker.push(sample) {
            Step::Started => {}
            Step::Plateau => {
                if let Some(stopper) = self.stopper.as_mut() {
                    stopper.index = index;
                }
            }
            Step::Origin(origin) => self.reversals.push_back(origin),
            Step::Moved { confirmed } => {
                if let Some(reversal) = confirmed {
                    self.reversals.push_back(reversal);
                }
                // A new point is a reversal until the following point says otherwise.
                self.stopper = Some(sample);
            }
        }
        self.mean.update(x);
    }

    /// Returns the counter to its initial empty state.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.reversals.clear();
        self.stopper = None;
        self.closed_cycles.clear();
        self.mean.reset();
    }

    /// Confirmed reversal points followed by the provisional last point, in
    /// order of occurrence. Empty until two distinct values have been seen.
    pub fn reversals(&self) -> impl Iterator<Item = Sample> + '_ {
        self.reversals.iter().chain(self.stopper.iter()).copied()
    }

    /// Cycles already finalized by [`Dropflow::extract_all_cycles`].
    pub fn closed_cycles(&self) -> &[Cycle] {
        &self.closed_cycles
    }

    /// Mean of every accepted sample.
    pub fn mean(&self) -> f64 {
        self.mean.mean()
    }

    /// Number of accepted samples.
    pub fn len(&self) -> usize {
        self.mean.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the cycles closed so far and the half cycles still open.
    ///
    /// Closed cycles are recorded in the ledger and their points are removed
    /// from the reversal buffer; cycles recorded by previous calls are yielded
    /// first. Half cycles are re-derived on every call and never recorded.
    ///
    /// With `ignore_stopper` the provisional last point takes no part in the
    /// count.
    pub fn extract_all_cycles(&mut self, ignore_stopper: bool) -> Cycles<'_> {
        self.cycles(true, ignore_stopper)
    }

    /// Iterates the cycles closed since the previous extraction and the half
    /// cycles still open.
    ///
    /// Nothing is recorded: the caller owns the closed cycles once they are
    /// yielded, and their points are gone from the reversal buffer.
    pub fn extract_new_cycles(&mut self, ignore_stopper: bool) -> Cycles<'_> {
        self.cycles(false, ignore_stopper)
    }

    fn cycles(&mut self, record: bool, ignore_stopper: bool) -> Cycles<'_> {
        let stopper = match self.stopper {
            Some(stopper) if !ignore_stopper => {
                self.reversals.push_back(stopper);
                Some(stopper)
            }
            _ => None,
        };
        let ledger = if record { Some(&mut self.closed_cycles) } else { None };
        let replay_end = ledger.as_ref().map_or(0, |ledger| ledger.len());
        if replay_end == 0 && self.reversals.len() < 2 {
            debug!(points = self.reversals.len(), "not enough samples");
        }
        Cycles {
            reversals: &mut self.reversals,
            ledger,
            replayed: 0,
            replay_end,
            phase: Phase::Scan(0),
            stopper,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Three-point comparison starting at the given buffer position.
    Scan(usize),
    /// Residual half cycles starting at the given buffer position.
    Residual(usize),
    Done,
}

/// Lazy cycle extraction over the reversal buffer of a [`Dropflow`].
///
/// The buffer is consumed as records are pulled. Dropping the iterator before
/// it is exhausted keeps every record pulled so far and restores the
/// provisional point.
#[derive(Debug)]
pub struct Cycles<'a> {
    reversals: &'a mut VecDeque<Sample>,
    ledger: Option<&'a mut Vec<Cycle>>,
    replayed: usize,
    replay_end: usize,
    phase: Phase,
    /// Provisional point appended to the buffer for this extraction.
    stopper: Option<Sample>,
}

impl Cycles<'_> {
    fn scan(&mut self, mut i: usize) -> Option<Cycle> {
        let reversals = &mut *self.reversals;
        while i + 2 < reversals.len() {
            let y = (reversals[i + 1].value - reversals[i].value).abs();
            let x = (reversals[i + 2].value - reversals[i + 1].value).abs();
            if x < y {
                i += 1;
                continue;
            }
            let cycle = if i == 0 {
                // Y holds the starting point: half a cycle, drop the start.
                let cycle = Cycle::half(&reversals[0], &reversals[1]);
                reversals.pop_front();
                cycle
            } else {
                let cycle = Cycle::full(&reversals[i], &reversals[i + 1]);
                reversals.drain(i..i + 2);
                cycle
            };
            if let Some(ledger) = self.ledger.as_mut() {
                ledger.push(cycle);
            }
            // Removing points may close ranges further back.
            self.phase = Phase::Scan(0);
            return Some(cycle);
        }
        self.phase = Phase::Residual(0);
        None
    }

    fn residual(&mut self, i: usize) -> Option<Cycle> {
        if i + 1 >= self.reversals.len() {
            self.finish();
            return None;
        }
        self.phase = Phase::Residual(i + 1);
        Some(Cycle::half(&self.reversals[i], &self.reversals[i + 1]))
    }

    fn finish(&mut self) {
        self.phase = Phase::Done;
        if let Some(stopper) = self.stopper.take() {
            if self.reversals.back() == Some(&stopper) {
                self.reversals.pop_back();
            }
        }
    }
}

impl Iterator for Cycles<'_> {
    type Item = Cycle;

    fn next(&mut self) -> Option<Cycle> {
        if self.replayed < self.replay_end {
            let cycle = self.ledger.as_ref().map(|ledger| ledger[self.replayed]);
            self.replayed += 1;
            return cycle;
        }
        loop {
            match self.phase {
                Phase::Scan(i) => {
                    if let Some(cycle) = self.scan(i) {
                        return Some(cycle);
                    }
                }
                Phase::Residual(i) => return self.residual(i),
                Phase::Done => return None,
            }
        }
    }
}

impl Drop for Cycles<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Counts the cycles of a complete series, indexing samples by position.
pub fn rainflow(series: &[f64]) -> Vec<Cycle> {
    let mut counter = Dropflow::new();
    for (i, &x) in series.iter().enumerate() {
        counter.add_point(x, i);
    }
    let cycles: Vec<Cycle> = counter.extract_all_cycles(false).collect();
    cycles
}
