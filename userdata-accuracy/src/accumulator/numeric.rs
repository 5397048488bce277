//! Numeric accumulator: sum, contributor count, min and max

use crate::math;

/// Running statistics over a nullable numeric stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericAccumulator {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Default for NumericAccumulator {
    fn default() -> Self {
        Self {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl NumericAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one value into the statistics; `None` is ignored entirely
    pub fn accumulate(self, value: Option<f64>) -> Self {
        match value {
            Some(v) => Self {
                sum: self.sum + v,
                count: self.count + 1,
                min: self.min.min(v),
                max: self.max.max(v),
            },
            None => self,
        }
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Number of values that actually contributed
    pub fn count(&self) -> usize {
        self.count
    }

    /// Smallest value seen, `0` if nothing was accumulated
    pub fn min(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.min
        }
    }

    /// Largest value seen, `0` if nothing was accumulated
    pub fn max(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.max
        }
    }

    /// Mean over contributors, `0` if nothing was accumulated
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Agreement of `value` with the accumulated data, in `[0, 1]`
    pub fn confirmation(&self, value: f64) -> f64 {
        math::confirmation(value, self.average(), self.min(), self.max())
    }
}

impl FromIterator<Option<f64>> for NumericAccumulator {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::default(), |acc, value| acc.accumulate(value))
    }
}
