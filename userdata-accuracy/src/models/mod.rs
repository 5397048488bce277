//! Category models
//!
//! A model supplies everything the orchestrator needs to score one category:
//! payload schema, base state, fold step, averaging step, per-record
//! prediction and the weight map used to combine field confirmations.

pub mod demographic;
pub mod location;

pub use demographic::{DemographicModel, DemographicPayload, DemographicState};
pub use location::{Centroid, LocationModel, LocationPayload, LocationState};

use crate::error::SchemaViolation;
use crate::normalizer::WeightMap;
use crate::schema::PayloadSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Scoring behaviour for one record category
pub trait CategoryModel {
    /// Typed payload, deserialized after schema validation
    type Payload: DeserializeOwned;

    /// Fold accumulator
    type State;

    /// Aggregate every record is scored against
    type Average;

    fn schema(&self) -> &'static PayloadSchema;

    fn weights(&self) -> &WeightMap;

    /// Empty accumulator the fold starts from
    fn base_state(&self) -> Self::State;

    /// Fold one payload into the state
    fn fold(&self, state: Self::State, payload: &Self::Payload) -> Self::State;

    fn average(&self, state: Self::State) -> Self::Average;

    /// Score one payload against the aggregate
    fn predict(&self, average: &Self::Average, payload: &Self::Payload) -> f64;

    /// Validate a raw payload against the schema and deserialize it
    fn parse(&self, payload: &Value) -> Result<Self::Payload, SchemaViolation> {
        self.schema().validate(payload)?;
        serde_json::from_value(payload.clone())
            .map_err(|e| SchemaViolation::Malformed(e.to_string()))
    }
}
