//! Incremental detection of reversal points (local extrema) in a load series.
//!
//! Whether a sample is a reversal is only known once the following sample has
//! been read, so the tracker lags one sample behind the input: every call to
//! [`ReversalTracker::push`] can confirm at most the sample before it.
/// A point of the load series. Confirmed reversal points are stored as samples too.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub index: usize,
    pub value: f64,
}

impl Sample {
    pub fn new(index: usize, value: f64) -> Self {
        Sample { index, value }
    }
}

/// Outcome of pushing one sample into the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// The very first sample; it becomes the origin of the series.
    Started,
    /// Same value as the previous sample. Only its index moved.
    Plateau,
    /// First sample with a value different from the origin. The origin is
    /// confirmed as the first reversal of the series.
    Origin(Sample),
    /// The series moved on. `confirmed` holds the previous sample when the
    /// derivative changed sign across it.
    Moved { confirmed: Option<Sample> },
}

#[derive(Debug, Clone, Copy, Default)]
enum State {
    #[default]
    Empty,
    Origin(Sample),
    Tracking { last: Sample, slope: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct ReversalTracker {
    state: State,
}

impl ReversalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) -> Step {
        match self.state {
            State::Empty => {
                self.state = State::Origin(sample);
                Step::Started
            }
            // Leading plateaus collapse into the origin, which keeps its first index.
            State::Origin(origin) if origin.value == sample.value => Step::Plateau,
            State::Origin(origin) => {
                self.state = State::Tracking {
                    last: sample,
                    slope: sample.value - origin.value,
                };
                Step::Origin(origin)
            }
            State::Tracking { last, slope } if last.value == sample.value => {
                self.state = State::Tracking {
                    last: Sample::new(sample.index, last.value),
                    slope,
                };
                Step::Plateau
            }
            State::Tracking { last, slope } => {
                let next = sample.value - last.value;
                let confirmed = (slope * next < 0.0).then_some(last);
                self.state = State::Tracking { last: sample, slope: next };
                Step::Moved { confirmed }
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = State::Empty;
    }
}
