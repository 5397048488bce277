//! # User Data Accuracy Classification
//!
//! Scores how consistent a newly submitted user data record is with the
//! owner's earlier records of the same category, and rescores the whole
//! comparison group against the shared aggregate.
//!
//! Layers, leaves first:
//! - [`math`]: scalar normalize/deviation/confirmation and haversine distance
//! - [`accumulator`]: numeric and categorical running statistics
//! - [`normalizer`]: weighted combination of per-field confirmations
//! - [`models`]: per-category schema, fold, average and predict steps
//! - [`classifier`]: batch orchestration and category dispatch
//! - [`service`]: fetch, classify and atomic write-back against the repository

pub mod accumulator;
pub mod classifier;
pub mod error;
pub mod math;
pub mod models;
pub mod normalizer;
pub mod schema;
pub mod service;

pub use classifier::{Classification, Classifier};
pub use error::{SchemaViolation, ValidationError};
pub use service::{ScoringOutcome, ScoringService, ScoringStatus};
