//! Demographic model
//!
//! Every field is optional. `age` and `householdSize` are tracked with numeric
//! accumulators, everything else with categorical tallies; each field's
//! confirmation is combined through the weighted normalizer with weight 1.
//!
//! A numeric field the candidate leaves out is, by default, scored as the
//! literal value `0` ([`AbsentNumericPolicy::Zero`]). That conflates "not
//! provided" with "zero"; [`AbsentNumericPolicy::Missing`] scores it as absent
//! instead.

use super::CategoryModel;
use crate::accumulator::{CategoricalAccumulator, NumericAccumulator};
use crate::normalizer::{normalize_weighted, FieldScores, WeightMap};
use crate::schema::{FieldKind, FieldSpec, PayloadSchema};
use serde::Deserialize;
use userdata_common::config::AbsentNumericPolicy;

pub const AGE: &str = "age";
pub const HOUSEHOLD_SIZE: &str = "householdSize";

/// Categorical fields, in state order
pub const CATEGORICAL_FIELDS: [&str; 12] = [
    "gender",
    "ethnicity",
    "maritalStatus",
    "educationLevel",
    "occupation",
    "incomeRange",
    "residenceType",
    "language",
    "nationality",
    "religion",
    "housingStatus",
    "disabilityStatus",
];

/// All weighted fields
pub const DEMOGRAPHIC_FIELDS: [&str; 14] = [
    AGE,
    "gender",
    "ethnicity",
    "maritalStatus",
    "educationLevel",
    "occupation",
    "incomeRange",
    "residenceType",
    "language",
    "nationality",
    "religion",
    HOUSEHOLD_SIZE,
    "housingStatus",
    "disabilityStatus",
];

/// Demographic payload schema
pub const DEMOGRAPHIC_SCHEMA: PayloadSchema = PayloadSchema {
    fields: &[
        FieldSpec::optional(AGE, FieldKind::Number).at_least(0.0),
        FieldSpec::optional("gender", FieldKind::String),
        FieldSpec::optional("ethnicity", FieldKind::String),
        FieldSpec::optional("maritalStatus", FieldKind::String),
        FieldSpec::optional("educationLevel", FieldKind::String),
        FieldSpec::optional("occupation", FieldKind::String),
        FieldSpec::optional("incomeRange", FieldKind::String),
        FieldSpec::optional("residenceType", FieldKind::String),
        FieldSpec::optional("language", FieldKind::String),
        FieldSpec::optional("nationality", FieldKind::String),
        FieldSpec::optional("religion", FieldKind::String),
        FieldSpec::optional(HOUSEHOLD_SIZE, FieldKind::Number).at_least(0.0),
        FieldSpec::optional("housingStatus", FieldKind::String),
        FieldSpec::optional("disabilityStatus", FieldKind::String),
    ],
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DemographicPayload {
    pub age: Option<f64>,
    pub gender: Option<String>,
    pub ethnicity: Option<String>,
    pub marital_status: Option<String>,
    pub education_level: Option<String>,
    pub occupation: Option<String>,
    pub income_range: Option<String>,
    pub residence_type: Option<String>,
    pub language: Option<String>,
    pub nationality: Option<String>,
    pub religion: Option<String>,
    pub household_size: Option<f64>,
    pub housing_status: Option<String>,
    pub disability_status: Option<String>,
}

impl DemographicPayload {
    /// Categorical values in [`CATEGORICAL_FIELDS`] order
    pub fn categorical_values(&self) -> [Option<&str>; 12] {
        [
            self.gender.as_deref(),
            self.ethnicity.as_deref(),
            self.marital_status.as_deref(),
            self.education_level.as_deref(),
            self.occupation.as_deref(),
            self.income_range.as_deref(),
            self.residence_type.as_deref(),
            self.language.as_deref(),
            self.nationality.as_deref(),
            self.religion.as_deref(),
            self.housing_status.as_deref(),
            self.disability_status.as_deref(),
        ]
    }
}

/// One accumulator per demographic field
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicState {
    pub age: NumericAccumulator,
    pub household_size: NumericAccumulator,
    /// Tallies in [`CATEGORICAL_FIELDS`] order
    pub categorical: Vec<CategoricalAccumulator>,
}

impl Default for DemographicState {
    fn default() -> Self {
        Self {
            age: NumericAccumulator::new(),
            household_size: NumericAccumulator::new(),
            categorical: vec![CategoricalAccumulator::new(); CATEGORICAL_FIELDS.len()],
        }
    }
}

impl DemographicState {
    /// Tally for a categorical field by its payload name
    pub fn categorical(&self, field: &str) -> Option<&CategoricalAccumulator> {
        CATEGORICAL_FIELDS
            .iter()
            .position(|name| *name == field)
            .and_then(|index| self.categorical.get(index))
    }
}

/// Per-field agreement model with uniform weights
#[derive(Debug, Clone)]
pub struct DemographicModel {
    weights: WeightMap,
    absent_numeric: AbsentNumericPolicy,
}

impl DemographicModel {
    pub fn new(absent_numeric: AbsentNumericPolicy) -> Self {
        Self {
            weights: WeightMap::uniform(&DEMOGRAPHIC_FIELDS),
            absent_numeric,
        }
    }

    fn numeric_confirmation(
        &self,
        accumulator: &NumericAccumulator,
        value: Option<f64>,
    ) -> Option<f64> {
        match (value, self.absent_numeric) {
            (Some(v), _) => Some(accumulator.confirmation(v)),
            (None, AbsentNumericPolicy::Zero) => Some(accumulator.confirmation(0.0)),
            (None, AbsentNumericPolicy::Missing) => None,
        }
    }
}

impl Default for DemographicModel {
    fn default() -> Self {
        Self::new(AbsentNumericPolicy::default())
    }
}

impl CategoryModel for DemographicModel {
    type Payload = DemographicPayload;
    type State = DemographicState;
    type Average = DemographicState;

    fn schema(&self) -> &'static PayloadSchema {
        &DEMOGRAPHIC_SCHEMA
    }

    fn weights(&self) -> &WeightMap {
        &self.weights
    }

    fn base_state(&self) -> DemographicState {
        DemographicState::default()
    }

    fn fold(&self, state: DemographicState, payload: &DemographicPayload) -> DemographicState {
        DemographicState {
            age: state.age.accumulate(payload.age),
            household_size: state.household_size.accumulate(payload.household_size),
            categorical: state
                .categorical
                .into_iter()
                .zip(payload.categorical_values())
                .map(|(tally, value)| tally.accumulate(value))
                .collect(),
        }
    }

    /// Accumulators already expose their averages
    fn average(&self, state: DemographicState) -> DemographicState {
        state
    }

    fn predict(&self, average: &DemographicState, payload: &DemographicPayload) -> f64 {
        let mut scores = FieldScores::new();

        if let Some(c) = self.numeric_confirmation(&average.age, payload.age) {
            scores.insert(AGE, c);
        }
        let household_size =
            self.numeric_confirmation(&average.household_size, payload.household_size);
        if let Some(c) = household_size {
            scores.insert(HOUSEHOLD_SIZE, c);
        }

        for ((field, tally), value) in CATEGORICAL_FIELDS
            .iter()
            .zip(&average.categorical)
            .zip(payload.categorical_values())
        {
            if let Some(value) = value {
                scores.insert(*field, tally.confirmation(value));
            }
        }

        normalize_weighted(&scores, &self.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fold_all(model: &DemographicModel, payloads: &[DemographicPayload]) -> DemographicState {
        let state = payloads
            .iter()
            .fold(model.base_state(), |s, p| model.fold(s, p));
        model.average(state)
    }

    fn full_payload() -> DemographicPayload {
        DemographicPayload {
            age: Some(30.0),
            gender: Some("female".into()),
            ethnicity: Some("asian".into()),
            marital_status: Some("married".into()),
            education_level: Some("masters".into()),
            occupation: Some("engineer".into()),
            income_range: Some("50k-75k".into()),
            residence_type: Some("urban".into()),
            language: Some("en".into()),
            nationality: Some("ca".into()),
            religion: Some("none".into()),
            household_size: Some(3.0),
            housing_status: Some("renting".into()),
            disability_status: Some("no".into()),
        }
    }

    #[test]
    fn test_weights_cover_every_field_uniformly() {
        let model = DemographicModel::default();
        assert_eq!(model.weights().len(), 14);
        assert_eq!(model.weights().total(), 14.0);
        for spec in model.schema().fields {
            assert_eq!(model.weights().get(spec.name), Some(1.0), "{}", spec.name);
        }
    }

    #[test]
    fn test_identical_history_scores_one() {
        let model = DemographicModel::default();
        let payloads = vec![full_payload(), full_payload(), full_payload()];
        let average = fold_all(&model, &payloads);

        assert_eq!(model.predict(&average, &full_payload()), 1.0);
    }

    #[test]
    fn test_fold_tracks_each_field_independently() {
        let model = DemographicModel::default();
        let sparse = DemographicPayload {
            age: Some(40.0),
            gender: Some("male".into()),
            ..Default::default()
        };
        let average = fold_all(&model, &[full_payload(), sparse]);

        assert_eq!(average.age.count(), 2);
        assert_eq!(average.age.average(), 35.0);
        assert_eq!(average.household_size.count(), 1);
        assert_eq!(average.categorical("gender").unwrap().total(), 2);
        assert_eq!(average.categorical("gender").unwrap().confirmation("female"), 0.5);
        assert_eq!(average.categorical("religion").unwrap().total(), 1);
        assert!(average.categorical("favouriteColour").is_none());
    }

    #[test]
    fn test_absent_numeric_scored_as_zero_by_default() {
        // No history of age or household size: an absent value is scored as
        // literal 0 and "confirms" the empty accumulator
        let model = DemographicModel::new(AbsentNumericPolicy::Zero);
        let candidate = DemographicPayload {
            gender: Some("female".into()),
            ..Default::default()
        };
        let average = fold_all(&model, &[candidate.clone()]);

        // age 1 + householdSize 1 + gender 1 - 11 missing
        let expected = (3.0 - 11.0) / 14.0;
        assert!((model.predict(&average, &candidate) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_absent_numeric_scored_as_missing_when_configured() {
        let model = DemographicModel::new(AbsentNumericPolicy::Missing);
        let candidate = DemographicPayload {
            gender: Some("female".into()),
            ..Default::default()
        };
        let average = fold_all(&model, &[candidate.clone()]);

        // gender 1 - 13 missing
        let expected = (1.0 - 13.0) / 14.0;
        assert!((model.predict(&average, &candidate) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_absent_numeric_zero_against_real_history() {
        // With age history, scoring absence as 0 pulls the age confirmation to 0
        let model = DemographicModel::new(AbsentNumericPolicy::Zero);
        let average = fold_all(&model, &[full_payload()]);
        let empty = DemographicPayload::default();

        // age: confirmation(0) vs single value 30 -> 0; householdSize vs 3 -> 0
        let expected = (0.0 + 0.0 - 12.0) / 14.0;
        assert!((model.predict(&average, &empty) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_all_absent_with_missing_policy_is_minus_one() {
        let model = DemographicModel::new(AbsentNumericPolicy::Missing);
        let average = fold_all(&model, &[full_payload()]);
        assert_eq!(model.predict(&average, &DemographicPayload::default()), -1.0);
    }

    #[test]
    fn test_parse_camel_case_payload() {
        let model = DemographicModel::default();
        let payload = model
            .parse(&json!({
                "age": 54,
                "maritalStatus": "single",
                "householdSize": 2,
                "disabilityStatus": "no"
            }))
            .unwrap();

        assert_eq!(payload.age, Some(54.0));
        assert_eq!(payload.marital_status.as_deref(), Some("single"));
        assert_eq!(payload.household_size, Some(2.0));
        assert_eq!(payload.gender, None);
    }

    #[test]
    fn test_parse_rejects_numeric_category() {
        let model = DemographicModel::default();
        assert!(model.parse(&json!({ "gender": 1 })).is_err());
        assert!(model.parse(&json!({ "age": "fifty" })).is_err());
        assert!(model.parse(&json!({ "age": -3 })).is_err());
    }

    #[test]
    fn test_empty_payload_is_valid() {
        let model = DemographicModel::default();
        assert_eq!(model.parse(&json!({})).unwrap(), DemographicPayload::default());
    }
}
