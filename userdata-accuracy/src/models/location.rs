//! Location model
//!
//! Scores a position by its great-circle distance from the centroid of the
//! comparison group: 1 at the centroid, falling linearly to 0 at
//! [`MAX_DISTANCE_KM`] and beyond. Only latitude and longitude participate;
//! the remaining sensor fields are accepted and ignored.

use super::CategoryModel;
use crate::accumulator::NumericAccumulator;
use crate::math::{haversine_km, normalize};
use crate::normalizer::{normalize_weighted, FieldScores, WeightMap};
use crate::schema::{FieldKind, FieldSpec, PayloadSchema};
use serde::Deserialize;

/// Distance at which a location stops confirming the group (km)
pub const MAX_DISTANCE_KM: f64 = 400.0;

/// Location payload schema
pub const LOCATION_SCHEMA: PayloadSchema = PayloadSchema {
    fields: &[
        FieldSpec::required("latitude", FieldKind::Number).bounded(-90.0, 90.0),
        FieldSpec::required("longitude", FieldKind::Number).bounded(-180.0, 180.0),
        FieldSpec::optional("accuracy", FieldKind::Number),
        FieldSpec::optional("altitude", FieldKind::Number),
        FieldSpec::optional("altitudeAccuracy", FieldKind::Number),
        FieldSpec::optional("heading", FieldKind::Number),
        FieldSpec::optional("speed", FieldKind::Number),
    ],
};

/// Weighted field name for the distance confirmation
pub const DISTANCE_FIELD: &str = "distance";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub altitude_accuracy: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
}

/// Running latitude/longitude sums
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocationState {
    pub latitude: NumericAccumulator,
    pub longitude: NumericAccumulator,
}

/// Mean position of the comparison group (degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

/// Distance-from-centroid model
#[derive(Debug, Clone)]
pub struct LocationModel {
    weights: WeightMap,
}

impl LocationModel {
    pub fn new() -> Self {
        Self {
            weights: WeightMap::uniform(&[DISTANCE_FIELD]),
        }
    }
}

impl Default for LocationModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance score: 1 at 0 km, linear to 0 at `MAX_DISTANCE_KM`
pub fn distance_score(distance_km: f64) -> f64 {
    1.0 - normalize(distance_km.min(MAX_DISTANCE_KM), 0.0, MAX_DISTANCE_KM)
}

impl CategoryModel for LocationModel {
    type Payload = LocationPayload;
    type State = LocationState;
    type Average = Centroid;

    fn schema(&self) -> &'static PayloadSchema {
        &LOCATION_SCHEMA
    }

    fn weights(&self) -> &WeightMap {
        &self.weights
    }

    fn base_state(&self) -> LocationState {
        LocationState::default()
    }

    fn fold(&self, state: LocationState, payload: &LocationPayload) -> LocationState {
        LocationState {
            latitude: state.latitude.accumulate(Some(payload.latitude)),
            longitude: state.longitude.accumulate(Some(payload.longitude)),
        }
    }

    fn average(&self, state: LocationState) -> Centroid {
        Centroid {
            latitude: state.latitude.average(),
            longitude: state.longitude.average(),
        }
    }

    fn predict(&self, centroid: &Centroid, payload: &LocationPayload) -> f64 {
        let distance = haversine_km(
            payload.latitude,
            payload.longitude,
            centroid.latitude,
            centroid.longitude,
        );

        let mut scores = FieldScores::new();
        scores.insert(DISTANCE_FIELD, distance_score(distance));
        normalize_weighted(&scores, &self.weights)
    }
}
