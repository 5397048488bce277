//! End-to-end classification scenarios over in-memory comparison groups

use serde_json::{json, Value};
use userdata_accuracy::{Classification, Classifier, SchemaViolation};
use userdata_common::config::{AbsentNumericPolicy, ScoringConfig};
use userdata_common::db::Record;
use userdata_common::Category;
use uuid::Uuid;

fn record(owner: Uuid, category: Category, payload: Value) -> Record {
    Record::new(owner, category, payload)
}

fn location(owner: Uuid, latitude: f64, longitude: f64) -> Record {
    record(
        owner,
        Category::Location,
        json!({ "latitude": latitude, "longitude": longitude }),
    )
}

fn scores_of(result: &Classification) -> Vec<f64> {
    result
        .scores()
        .expect("category should be scored")
        .iter()
        .map(|entry| entry.score)
        .collect()
}

// =============================================================================
// Location
// =============================================================================

#[test]
fn test_coincident_locations_all_score_one() {
    let owner = Uuid::new_v4();
    let priors = vec![location(owner, 53.0, 10.0), location(owner, 53.0, 10.0)];
    let new_record = location(owner, 53.0, 10.0);

    let result = Classifier::default()
        .classify(Category::Location, &new_record, &priors)
        .unwrap();

    let scores = scores_of(&result);
    assert_eq!(scores.len(), 3);
    for score in scores {
        assert!((score - 1.0).abs() < 1e-9, "expected ~1.0, got {}", score);
    }
}

#[test]
fn test_one_degree_from_centroid() {
    // Group centroid is (0, 0); the new point sits one degree north of it
    let owner = Uuid::new_v4();
    let priors = vec![location(owner, -0.5, 0.0), location(owner, -0.5, 0.0)];
    let new_record = location(owner, 1.0, 0.0);

    let result = Classifier::default()
        .classify(Category::Location, &new_record, &priors)
        .unwrap();

    let score = result.score_for(new_record.id).unwrap();
    // ~111.2 km -> 1 - 111.2 / 400
    assert!((score - 0.722).abs() < 0.001, "got {}", score);

    // Priors are half a degree away: ~55.6 km
    let prior_score = result.score_for(priors[0].id).unwrap();
    assert!((prior_score - 0.861).abs() < 0.001, "got {}", prior_score);
}

#[test]
fn test_outlier_beyond_range_scores_zero() {
    let owner = Uuid::new_v4();
    let priors = vec![location(owner, 48.8566, 2.3522), location(owner, 48.8566, 2.3522)];
    // Sydney is far beyond 400 km from the centroid
    let new_record = location(owner, -33.8688, 151.2093);

    let result = Classifier::default()
        .classify(Category::Location, &new_record, &priors)
        .unwrap();

    assert_eq!(result.score_for(new_record.id), Some(0.0));
}

#[test]
fn test_group_order_does_not_change_scores() {
    let owner = Uuid::new_v4();
    let a = location(owner, 50.0, 8.0);
    let b = location(owner, 50.5, 8.4);
    let c = location(owner, 49.8, 7.9);
    let classifier = Classifier::default();

    let forward = classifier
        .classify(Category::Location, &c, &[a.clone(), b.clone()])
        .unwrap();
    let shuffled = classifier
        .classify(Category::Location, &c, &[b.clone(), a.clone()])
        .unwrap();

    for id in [a.id, b.id, c.id] {
        let x = forward.score_for(id).unwrap();
        let y = shuffled.score_for(id).unwrap();
        assert!((x - y).abs() < 1e-9, "{} vs {}", x, y);
    }
}

// =============================================================================
// Demographic
// =============================================================================

fn rich_demographic(owner: Uuid, age: f64, household_size: f64) -> Record {
    record(
        owner,
        Category::Demographic,
        json!({
            "age": age,
            "gender": "male",
            "ethnicity": "white",
            "maritalStatus": "married",
            "educationLevel": "bachelors",
            "occupation": "teacher",
            "incomeRange": "50k-75k",
            "residenceType": "suburban",
            "language": "en",
            "nationality": "us",
            "religion": "none",
            "householdSize": household_size,
            "housingStatus": "owner",
            "disabilityStatus": "no"
        }),
    )
}

#[test]
fn test_sparse_demographic_between_bounds() {
    let owner = Uuid::new_v4();
    let priors = vec![rich_demographic(owner, 52.0, 3.0), rich_demographic(owner, 56.0, 4.0)];
    let new_record = record(
        owner,
        Category::Demographic,
        json!({ "age": 54, "disabilityStatus": "no" }),
    );

    let result = Classifier::default()
        .classify(Category::Demographic, &new_record, &priors)
        .unwrap();

    let score = result.score_for(new_record.id).unwrap();
    assert!(score > -1.0 && score < 1.0, "got {}", score);
    // Rich priors agree with each other on every categorical field
    let prior_score = result.score_for(priors[0].id).unwrap();
    assert!(prior_score > score, "rich record {} should beat sparse {}", prior_score, score);
}

#[test]
fn test_absent_numeric_policy_changes_sparse_score() {
    // Flags the "absent numeric means zero" ambiguity: with history present,
    // scoring a missing householdSize as 0 differs from treating it as absent
    let owner = Uuid::new_v4();
    let priors = vec![rich_demographic(owner, 52.0, 3.0), rich_demographic(owner, 56.0, 4.0)];
    let new_record = record(
        owner,
        Category::Demographic,
        json!({ "age": 54, "disabilityStatus": "no" }),
    );

    let as_zero = Classifier::new(&ScoringConfig {
        absent_numeric: AbsentNumericPolicy::Zero,
        ..ScoringConfig::default()
    });
    let as_missing = Classifier::new(&ScoringConfig {
        absent_numeric: AbsentNumericPolicy::Missing,
        ..ScoringConfig::default()
    });

    let zero_score = as_zero
        .classify(Category::Demographic, &new_record, &priors)
        .unwrap()
        .score_for(new_record.id)
        .unwrap();
    let missing_score = as_missing
        .classify(Category::Demographic, &new_record, &priors)
        .unwrap()
        .score_for(new_record.id)
        .unwrap();

    // Zero policy scores the missing householdSize as 0 against history [3, 4]
    assert_ne!(zero_score, missing_score);
    assert!(missing_score > -1.0);
}

#[test]
fn test_empty_demographic_record_is_valid_but_penalized() {
    let owner = Uuid::new_v4();
    let priors = vec![rich_demographic(owner, 40.0, 2.0)];
    let new_record = record(owner, Category::Demographic, json!({}));

    let classifier = Classifier::new(&ScoringConfig {
        absent_numeric: AbsentNumericPolicy::Missing,
        ..ScoringConfig::default()
    });
    let result = classifier
        .classify(Category::Demographic, &new_record, &priors)
        .unwrap();

    assert_eq!(result.score_for(new_record.id), Some(-1.0));
}

// =============================================================================
// Dispatch and validation
// =============================================================================

#[test]
fn test_other_category_returns_unsupported() {
    let owner = Uuid::new_v4();
    let priors = vec![record(owner, Category::Other, json!({ "note": "hi" }))];
    let new_record = record(owner, Category::Other, json!(42));

    let result = Classifier::default()
        .classify(Category::Other, &new_record, &priors)
        .unwrap();

    assert_eq!(result, Classification::Unsupported);
}

#[test]
fn test_malformed_history_fails_whole_call() {
    let owner = Uuid::new_v4();
    let good = location(owner, 53.0, 10.0);
    let bad = record(owner, Category::Location, json!({ "latitude": 53.0, "lng": 10.0 }));
    let new_record = location(owner, 53.0, 10.0);

    let err = Classifier::default()
        .classify(Category::Location, &new_record, &[good, bad.clone()])
        .unwrap_err();

    assert_eq!(err.record_id, bad.id);
    assert_eq!(err.violation, SchemaViolation::MissingField("longitude"));
    assert!(err.to_string().contains(&bad.id.to_string()));
}

#[test]
fn test_malformed_new_record_fails_whole_call() {
    let owner = Uuid::new_v4();
    let priors = vec![location(owner, 53.0, 10.0)];
    let new_record = record(owner, Category::Location, json!({ "latitude": 53.0, "longitude": 200.0 }));

    let err = Classifier::default()
        .classify(Category::Location, &new_record, &priors)
        .unwrap_err();

    assert_eq!(err.record_id, new_record.id);
    assert!(matches!(err.violation, SchemaViolation::OutOfRange { field: "longitude", .. }));
}
