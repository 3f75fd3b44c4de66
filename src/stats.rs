//! Running statistics kept alongside the reversal tracker.

/// Incremental arithmetic mean of every sample seen so far.
#[derive(Debug, Clone, Default)]
pub struct RunningMean {
    count: usize,
    mean: f64,
}

impl RunningMean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, x: f64) {
        self.count += 1;
        self.mean += (x - self.mean) / self.count as f64;
    }

    /// Mean of the samples seen, `0.0` before the first one.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_running_mean() {
        let mut stats = RunningMean::new();
        assert_eq!(stats.mean(), 0.0);
        for x in [-2.0, 1.0, -3.0, 5.0, -1.0, 3.0, -4.0, 4.0, -2.0] {
            stats.update(x);
        }
        assert_eq!(stats.count(), 9);
        assert_relative_eq!(stats.mean(), 1.0 / 9.0, epsilon = 1e-12);

        stats.reset();
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.mean(), 0.0);
    }
}
