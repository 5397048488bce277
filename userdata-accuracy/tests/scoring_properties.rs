//! Property tests for the scoring primitives

use proptest::prelude::*;
use userdata_accuracy::accumulator::{CategoricalAccumulator, NumericAccumulator};
use userdata_accuracy::math::haversine_km;
use userdata_accuracy::models::location::{distance_score, MAX_DISTANCE_KM};
use userdata_accuracy::normalizer::{normalize_weighted, FieldScores, WeightMap};

const FIELDS: [&str; 6] = ["f0", "f1", "f2", "f3", "f4", "f5"];

proptest! {
    #[test]
    fn coincident_points_have_zero_distance(
        lat in -90.0f64..=90.0,
        lon in -180.0f64..=180.0,
    ) {
        prop_assert_eq!(haversine_km(lat, lon, lat, lon), 0.0);
    }

    #[test]
    fn distance_score_monotonically_non_increasing(
        a in 0.0f64..2_000.0,
        b in 0.0f64..2_000.0,
    ) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(distance_score(near) >= distance_score(far));
    }

    #[test]
    fn distance_score_zero_beyond_range(distance in MAX_DISTANCE_KM..20_100.0) {
        prop_assert_eq!(distance_score(distance), 0.0);
    }

    #[test]
    fn distance_score_in_unit_interval(distance in 0.0f64..20_100.0) {
        let score = distance_score(distance);
        prop_assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn normalizer_bounded_by_minus_one_and_one(
        confirmations in prop::collection::vec(prop::option::of(0.0f64..=1.0), FIELDS.len()),
        weights in prop::collection::vec(0.1f64..10.0, FIELDS.len()),
    ) {
        let weight_map = WeightMap::new(FIELDS.iter().copied().zip(weights).collect()).unwrap();
        let data: FieldScores = FIELDS
            .iter()
            .copied()
            .zip(confirmations)
            .filter_map(|(field, c)| c.map(|c| (field, c)))
            .collect();

        let score = normalize_weighted(&data, &weight_map);
        prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&score), "score {}", score);
    }

    #[test]
    fn numeric_confirmation_in_unit_interval(
        values in prop::collection::vec(prop::option::of(-1_000.0f64..1_000.0), 0..20),
        candidate in -5_000.0f64..5_000.0,
    ) {
        let acc: NumericAccumulator = values.into_iter().collect();
        let c = acc.confirmation(candidate);
        prop_assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn numeric_average_ignores_absent(
        values in prop::collection::vec(-1_000.0f64..1_000.0, 1..20),
    ) {
        let with_gaps: NumericAccumulator = values
            .iter()
            .flat_map(|v| [Some(*v), None])
            .collect();
        let dense: NumericAccumulator = values.iter().map(|v| Some(*v)).collect();

        prop_assert_eq!(with_gaps.count(), values.len());
        prop_assert_eq!(with_gaps, dense);
    }

    #[test]
    fn categorical_confirmations_sum_to_one(
        values in prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d"]), 1..30),
    ) {
        let acc = values
            .iter()
            .fold(CategoricalAccumulator::new(), |acc, v| acc.accumulate(Some(*v)));
        let total: f64 = acc.iter().map(|(value, _)| acc.confirmation(value)).sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
    }
}
