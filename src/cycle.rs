//! Cycle records produced by the rainflow extractor.
use serde::Serialize;

use crate::reversal::Sample;

/// Count of a closed hysteresis loop.
pub const FULL_CYCLE: f64 = 1.0;
/// Count of a range that is still open at the current data horizon.
pub const HALF_CYCLE: f64 = 0.5;

/// A rainflow cycle or half-cycle.
///
/// `start` and `end` are the indices of the two reversal points that define the
/// range, in the order they occupy the reversal buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cycle {
    pub range: f64,
    pub mean: f64,
    pub count: f64,
    pub start: usize,
    pub end: usize,
}

impl Cycle {
    fn between(first: &Sample, second: &Sample, count: f64) -> Self {
        Cycle {
            range: (first.value - second.value).abs(),
            mean: 0.5 * (first.value + second.value),
            count,
            start: first.index,
            end: second.index,
        }
    }

    pub fn full(first: &Sample, second: &Sample) -> Self {
        Self::between(first, second, FULL_CYCLE)
    }

    pub fn half(first: &Sample, second: &Sample) -> Self {
        Self::between(first, second, HALF_CYCLE)
    }

    pub fn is_full(&self) -> bool {
        self.count == FULL_CYCLE
    }
}
