//! Database models

use crate::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder score a record carries until it is first classified
pub const NEUTRAL_SCORE: f64 = 0.0;

/// A single category-tagged user data submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: Category,
    /// Raw JSON object; its shape is determined by `category`
    pub payload: serde_json::Value,
    pub score: f64,
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Create a new record with a fresh id and the neutral score
    pub fn new(owner_id: Uuid, category: Category, payload: serde_json::Value) -> Self {
        Self {
            id: crate::uuid_utils::generate(),
            owner_id,
            category,
            payload,
            score: NEUTRAL_SCORE,
            created_at: crate::time::now(),
        }
    }
}

/// Recomputed score for one record, ready to be written back
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordScore {
    pub id: Uuid,
    pub score: f64,
}
