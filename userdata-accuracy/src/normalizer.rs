//! Weighted-key normalizer
//!
//! Combines independent per-field confirmations into one record score:
//!
//! ```text
//! score = (Σ_present weight × confirmation − Σ_missing weight) / Σ weight
//! ```
//!
//! Missing fields are penalized at full weight, so the result is NOT clamped:
//! a record with every field missing scores `-1`. Callers that need `[0, 1]`
//! clamp after the fact (see `ScoringConfig::clamp_scores`).

use crate::math;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Per-field confirmations for one record; a missing key means "absent"
pub type FieldScores = HashMap<&'static str, f64>;

/// Weight map construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightError {
    #[error("weight map must contain at least one field")]
    Empty,

    #[error("weight for '{field}' must be positive, got {weight}")]
    NonPositive { field: &'static str, weight: f64 },

    #[error("field '{0}' is weighted twice")]
    Duplicate(&'static str),
}

/// Immutable field -> importance weight mapping, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightMap {
    entries: Vec<(&'static str, f64)>,
}

impl WeightMap {
    /// Build a weight map; every weight must be positive and finite
    pub fn new(entries: Vec<(&'static str, f64)>) -> Result<Self, WeightError> {
        if entries.is_empty() {
            return Err(WeightError::Empty);
        }
        for (i, (field, weight)) in entries.iter().enumerate() {
            if !(weight.is_finite() && *weight > 0.0) {
                return Err(WeightError::NonPositive {
                    field: *field,
                    weight: *weight,
                });
            }
            if entries[..i].iter().any(|(other, _)| other == field) {
                return Err(WeightError::Duplicate(*field));
            }
        }
        Ok(Self { entries })
    }

    /// Weight 1 for each distinct field
    pub fn uniform(fields: &[&'static str]) -> Self {
        let mut entries: Vec<(&'static str, f64)> = Vec::with_capacity(fields.len());
        for field in fields {
            if !entries.iter().any(|(seen, _)| seen == field) {
                entries.push((*field, 1.0));
            }
        }
        Self { entries }
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, weight)| *weight)
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, weight)| weight).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.entries.iter().copied()
    }
}

/// Combine field confirmations into one score using `weights`
///
/// Fields present in `data` but not in `weights` are ignored. An empty weight
/// map scores `0`.
pub fn normalize_weighted(data: &FieldScores, weights: &WeightMap) -> f64 {
    let total = weights.total();
    let mut deficit = total;

    for (field, weight) in weights.iter() {
        match data.get(field) {
            Some(confirmation) => deficit -= confirmation * weight,
            None => deficit += weight,
        }
    }

    math::normalize(total - deficit, 0.0, total)
}
