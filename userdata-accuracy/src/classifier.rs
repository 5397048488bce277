//! Batch orchestration and category dispatch
//!
//! [`score_batch`] validates a comparison group, folds it into one aggregate
//! and scores every record against it. [`Classifier`] maps a category to its
//! model, or reports [`Classification::Unsupported`] for categories without
//! one.
//!
//! Classification is pure and synchronous: no I/O, no shared state, and every
//! score is recomputed from the full group.

use crate::error::ValidationError;
use crate::models::{CategoryModel, DemographicModel, LocationModel};
use crate::normalizer::WeightMap;
use crate::schema::PayloadSchema;
use serde_json::Value;
use tracing::debug;
use userdata_common::config::ScoringConfig;
use userdata_common::db::{Record, RecordScore};
use userdata_common::Category;
use uuid::Uuid;

/// Result of a classification call
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Scores for every record of the group, in batch order (new record last)
    Scored(Vec<RecordScore>),

    /// No model is registered for the category
    Unsupported,
}

impl Classification {
    pub fn scores(&self) -> Option<&[RecordScore]> {
        match self {
            Classification::Scored(scores) => Some(scores),
            Classification::Unsupported => None,
        }
    }

    pub fn score_for(&self, id: Uuid) -> Option<f64> {
        self.scores()?
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.score)
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Classification::Unsupported)
    }
}

/// Validate, fold and score one comparison group with `model`
///
/// Fails fast on the first record whose payload violates the schema.
pub fn score_batch<M: CategoryModel>(
    model: &M,
    category: Category,
    records: &[&Record],
) -> Result<Vec<RecordScore>, ValidationError> {
    let payloads = records
        .iter()
        .map(|record| {
            model
                .parse(&record.payload)
                .map_err(|violation| ValidationError {
                    record_id: record.id,
                    category,
                    violation,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let state = payloads
        .iter()
        .fold(model.base_state(), |state, payload| model.fold(state, payload));
    let average = model.average(state);

    let scores: Vec<RecordScore> = records
        .iter()
        .zip(&payloads)
        .map(|(record, payload)| RecordScore {
            id: record.id,
            score: model.predict(&average, payload),
        })
        .collect();

    debug!(
        category = %category,
        record_count = scores.len(),
        "Scored comparison group"
    );

    Ok(scores)
}

/// Category dispatcher holding one model per scored category
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    location: LocationModel,
    demographic: DemographicModel,
}

impl Classifier {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            location: LocationModel::new(),
            demographic: DemographicModel::new(config.absent_numeric),
        }
    }

    /// Score `new_record` and every prior record of its comparison group
    ///
    /// The batch is `prior_records` followed by `new_record`; the returned
    /// scores follow the same order.
    pub fn classify(
        &self,
        category: Category,
        new_record: &Record,
        prior_records: &[Record],
    ) -> Result<Classification, ValidationError> {
        let batch: Vec<&Record> = prior_records
            .iter()
            .chain(std::iter::once(new_record))
            .collect();

        let scores = match category {
            Category::Location => score_batch(&self.location, category, &batch)?,
            Category::Demographic => score_batch(&self.demographic, category, &batch)?,
            Category::Other => {
                debug!(category = %category, "No accuracy model for category");
                return Ok(Classification::Unsupported);
            }
        };

        Ok(Classification::Scored(scores))
    }

    /// Published payload schema for a category
    pub fn schema_for(&self, category: Category) -> Option<&'static PayloadSchema> {
        match category {
            Category::Location => Some(self.location.schema()),
            Category::Demographic => Some(self.demographic.schema()),
            Category::Other => None,
        }
    }

    /// Field weights for a category
    pub fn weights_for(&self, category: Category) -> Option<&WeightMap> {
        match category {
            Category::Location => Some(self.location.weights()),
            Category::Demographic => Some(self.demographic.weights()),
            Category::Other => None,
        }
    }

    /// Check a single payload before it is stored
    ///
    /// Categories without a model accept any payload.
    pub fn validate_payload(
        &self,
        category: Category,
        record_id: Uuid,
        payload: &Value,
    ) -> Result<(), ValidationError> {
        match self.schema_for(category) {
            Some(schema) => schema
                .validate(payload)
                .map_err(|violation| ValidationError {
                    record_id,
                    category,
                    violation,
                }),
            None => Ok(()),
        }
    }
}
