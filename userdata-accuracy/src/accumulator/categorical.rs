//! Categorical accumulator: insertion-ordered frequency tally
//!
//! Ties in [`CategoricalAccumulator::highest`] and
//! [`CategoricalAccumulator::lowest`] go to the value that was seen first;
//! stored scores depend on that order, so the tally must stay an ordered list.

/// Frequency tally over a nullable enumerated stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoricalAccumulator {
    tallies: Vec<(String, usize)>,
    total: usize,
}

impl CategoricalAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `value`; `None` is a no-op
    pub fn accumulate(mut self, value: Option<&str>) -> Self {
        let Some(value) = value else {
            return self;
        };

        match self.tallies.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, count)) => *count += 1,
            None => self.tallies.push((value.to_string(), 1)),
        }
        self.total += 1;
        self
    }

    /// Occurrences of `value`
    pub fn count(&self, value: &str) -> usize {
        self.tallies
            .iter()
            .find(|(seen, _)| seen == value)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Total number of accumulated (non-absent) values
    pub fn total(&self) -> usize {
        self.total
    }

    /// Share of accumulated values equal to `value`; unseen values yield `0`
    pub fn confirmation(&self, value: &str) -> f64 {
        self.count(value) as f64 / self.total.max(1) as f64
    }

    /// Most frequent value (first inserted wins ties)
    pub fn highest(&self) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.tallies {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(value, _)| value.as_str())
    }

    /// Least frequent value (first inserted wins ties)
    pub fn lowest(&self) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.tallies {
            if best.map_or(true, |b| entry.1 < b.1) {
                best = Some(entry);
            }
        }
        best.map(|(value, _)| value.as_str())
    }

    /// Tallies in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.tallies.iter().map(|(value, count)| (value.as_str(), *count))
    }
}
