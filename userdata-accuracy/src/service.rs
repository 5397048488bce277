//! Scoring service
//!
//! Wraps the classifier with the record repository. Insert, group fetch,
//! classification and score write-back all happen inside one group
//! transaction. Classification failures never fail the submission; the new
//! record simply keeps the neutral score.

use crate::classifier::{Classification, Classifier};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use userdata_common::config::ScoringConfig;
use userdata_common::db::{GroupTransaction, Record, RecordRepository, RecordScore, NEUTRAL_SCORE};
use userdata_common::{Category, Error, Result};
use uuid::Uuid;

/// How a scoring pass ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoringStatus {
    /// Every record of the group was rescored and persisted
    Scored,

    /// The category has no accuracy model; scores left untouched
    Unsupported,

    /// A record in the group failed its schema; scores left untouched
    Failed { reason: String },

    /// Nothing to score
    Empty,
}

/// Outcome of `submit` or `rescore`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringOutcome {
    /// The record treated as "new" (the submission, or the latest record)
    pub record_id: Option<Uuid>,

    #[serde(flatten)]
    pub status: ScoringStatus,

    /// Scores written back, in group order
    pub scores: Vec<RecordScore>,
}

impl ScoringOutcome {
    fn new(record_id: Option<Uuid>, status: ScoringStatus) -> Self {
        Self {
            record_id,
            status,
            scores: Vec::new(),
        }
    }

    /// Score of the new record, neutral when nothing was written
    pub fn score(&self) -> f64 {
        self.record_id
            .and_then(|id| self.scores.iter().find(|entry| entry.id == id))
            .map(|entry| entry.score)
            .unwrap_or(NEUTRAL_SCORE)
    }
}

/// Fetch, classify and persist scores for one owner's comparison groups
///
/// Every call runs on a single [`GroupTransaction`], so concurrent calls for
/// the same group are serialized and each persists scores computed from the
/// group as it stands at commit.
pub struct ScoringService {
    repository: RecordRepository,
    classifier: Classifier,
    clamp_scores: bool,
}

impl ScoringService {
    pub fn new(repository: RecordRepository, config: &ScoringConfig) -> Self {
        Self {
            repository,
            classifier: Classifier::new(config),
            clamp_scores: config.clamp_scores,
        }
    }

    pub fn repository(&self) -> &RecordRepository {
        &self.repository
    }

    /// Store a new submission and rescore its comparison group
    ///
    /// The payload is checked against the category schema first; an invalid
    /// submission is rejected with `InvalidInput` and nothing is stored.
    pub async fn submit(
        &self,
        owner_id: Uuid,
        category: Category,
        payload: Value,
    ) -> Result<ScoringOutcome> {
        let record = Record::new(owner_id, category, payload);

        self.classifier
            .validate_payload(category, record.id, &record.payload)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;

        let mut group = self.repository.begin_group(category, owner_id).await?;
        group.insert(&record).await?;
        info!(record_id = %record.id, category = %category, "Stored new record");

        let outcome = match group.fetch().await {
            Ok(members) => {
                let priors: Vec<Record> = members
                    .into_iter()
                    .filter(|prior| prior.id != record.id)
                    .collect();
                self.score_group(&mut group, &record, &priors).await?
            }
            Err(e @ Error::CorruptRecord { .. }) => corrupt_group(Some(record.id), e),
            Err(e) => return Err(e),
        };

        group.commit().await?;
        Ok(outcome)
    }

    /// Recompute every score of an existing comparison group
    ///
    /// The most recent record plays the role of the new one.
    pub async fn rescore(&self, owner_id: Uuid, category: Category) -> Result<ScoringOutcome> {
        let mut group = self.repository.begin_group(category, owner_id).await?;

        let outcome = match group.fetch().await {
            Ok(mut members) => match members.pop() {
                Some(latest) => self.score_group(&mut group, &latest, &members).await?,
                None => ScoringOutcome::new(None, ScoringStatus::Empty),
            },
            Err(e @ Error::CorruptRecord { .. }) => corrupt_group(None, e),
            Err(e) => return Err(e),
        };

        group.commit().await?;
        Ok(outcome)
    }

    async fn score_group(
        &self,
        group: &mut GroupTransaction,
        new_record: &Record,
        priors: &[Record],
    ) -> Result<ScoringOutcome> {
        let category = new_record.category;

        let mut scores = match self.classifier.classify(category, new_record, priors) {
            Ok(Classification::Scored(scores)) => scores,
            Ok(Classification::Unsupported) => {
                info!(category = %category, "Category not scored, keeping neutral score");
                return Ok(ScoringOutcome::new(
                    Some(new_record.id),
                    ScoringStatus::Unsupported,
                ));
            }
            Err(e) => {
                warn!("Classification failed, keeping neutral score: {}", e);
                return Ok(ScoringOutcome::new(
                    Some(new_record.id),
                    ScoringStatus::Failed {
                        reason: e.to_string(),
                    },
                ));
            }
        };

        if self.clamp_scores {
            for entry in &mut scores {
                entry.score = entry.score.clamp(0.0, 1.0);
            }
        }

        group.update_scores(&scores).await?;
        info!(
            category = %category,
            record_count = scores.len(),
            "Updated comparison group scores"
        );

        Ok(ScoringOutcome {
            record_id: Some(new_record.id),
            status: ScoringStatus::Scored,
            scores,
        })
    }
}

/// A stored row of the group could not be decoded; nothing is rescored
fn corrupt_group(record_id: Option<Uuid>, error: Error) -> ScoringOutcome {
    warn!("Comparison group unreadable, keeping existing scores: {}", error);
    ScoringOutcome::new(
        record_id,
        ScoringStatus::Failed {
            reason: error.to_string(),
        },
    )
}
