//! Record repository
//!
//! Persistence collaborator for the accuracy engine. Scoring a comparison
//! group is a read-compute-write cycle, so it runs on a [`GroupTransaction`]
//! that holds the database write lock from the first statement to commit:
//! overlapping submissions for the same group are serialized and each one
//! sees every record committed before it.

use crate::db::models::{Record, RecordScore};
use crate::{Category, Error, Result};
use chrono::SecondsFormat;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

/// Database repository for user data records
#[derive(Clone)]
pub struct RecordRepository {
    pool: SqlitePool,
}

impl RecordRepository {
    /// Create new repository with database pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new record
    pub async fn insert(&self, record: &Record) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        insert_record(&mut conn, record).await
    }

    /// Load a single record by id
    pub async fn get(&self, id: Uuid) -> Result<Record> {
        let row = sqlx::query(
            "SELECT id, owner_id, category, payload, score, created_at FROM records WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("record {}", id)))?;

        row_to_record(&row)
    }

    /// Fetch the comparison group for an owner and category, oldest first
    ///
    /// Fails with `CorruptRecord` if any row of the group cannot be decoded.
    pub async fn fetch_by_category_and_owner(
        &self,
        category: Category,
        owner_id: Uuid,
    ) -> Result<Vec<Record>> {
        let mut conn = self.pool.acquire().await?;
        fetch_group(&mut conn, category, owner_id).await
    }

    /// Write back recomputed scores atomically
    ///
    /// Either every score is updated or none is: an unknown id aborts the
    /// transaction with `NotFound` and all earlier updates roll back.
    pub async fn update_scores(&self, scores: &[RecordScore]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        write_scores(&mut tx, scores).await?;
        tx.commit().await?;

        info!("Updated scores for {} records", scores.len());
        Ok(())
    }

    /// Open a write transaction for one comparison group
    ///
    /// The write lock is taken before anything is read, so concurrent callers
    /// queue here (up to the connection busy timeout) rather than computing
    /// scores from a group that another transaction is about to change.
    /// Dropping the returned transaction without [`GroupTransaction::commit`]
    /// rolls back everything done through it.
    pub async fn begin_group(&self, category: Category, owner_id: Uuid) -> Result<GroupTransaction> {
        let mut tx = self.pool.begin().await?;

        // A write statement as the first statement of a deferred transaction
        // acquires the write lock, waiting out other writers
        sqlx::query("UPDATE records SET score = score WHERE owner_id = ? AND category = ?")
            .bind(owner_id.to_string())
            .bind(category.to_db_string())
            .execute(&mut *tx)
            .await?;

        debug!(owner_id = %owner_id, category = %category, "Opened group transaction");
        Ok(GroupTransaction {
            tx,
            category,
            owner_id,
        })
    }
}

/// Comparison group held under the database write lock
pub struct GroupTransaction {
    tx: Transaction<'static, Sqlite>,
    category: Category,
    owner_id: Uuid,
}

impl GroupTransaction {
    /// Insert a record belonging to this group
    pub async fn insert(&mut self, record: &Record) -> Result<()> {
        if record.category != self.category || record.owner_id != self.owner_id {
            return Err(Error::InvalidInput(format!(
                "record {} does not belong to group {}/{}",
                record.id, self.owner_id, self.category
            )));
        }
        insert_record(&mut self.tx, record).await
    }

    /// Current members of the group, oldest first, including uncommitted inserts
    pub async fn fetch(&mut self) -> Result<Vec<Record>> {
        fetch_group(&mut self.tx, self.category, self.owner_id).await
    }

    /// Write back scores; an unknown id fails with `NotFound`
    pub async fn update_scores(&mut self, scores: &[RecordScore]) -> Result<()> {
        write_scores(&mut self.tx, scores).await
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        debug!(owner_id = %self.owner_id, category = %self.category, "Committed group transaction");
        Ok(())
    }
}

async fn insert_record(conn: &mut SqliteConnection, record: &Record) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO records (id, owner_id, category, payload, score, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(record.owner_id.to_string())
    .bind(record.category.to_db_string())
    .bind(serde_json::to_string(&record.payload)?)
    .bind(record.score)
    .bind(record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
    .execute(&mut *conn)
    .await?;

    debug!(record_id = %record.id, category = %record.category, "Inserted record");
    Ok(())
}

async fn fetch_group(
    conn: &mut SqliteConnection,
    category: Category,
    owner_id: Uuid,
) -> Result<Vec<Record>> {
    let rows = sqlx::query(
        r#"
        SELECT id, owner_id, category, payload, score, created_at
        FROM records
        WHERE owner_id = ? AND category = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(owner_id.to_string())
    .bind(category.to_db_string())
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(row_to_record).collect()
}

async fn write_scores(conn: &mut SqliteConnection, scores: &[RecordScore]) -> Result<()> {
    for entry in scores {
        let result = sqlx::query("UPDATE records SET score = ? WHERE id = ?")
            .bind(entry.score)
            .bind(entry.id.to_string())
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            // Caller drops the transaction without commit, which rolls back
            return Err(Error::NotFound(format!("record {}", entry.id)));
        }
    }
    Ok(())
}

fn row_to_record(row: &SqliteRow) -> Result<Record> {
    let id: String = row.try_get("id")?;
    let corrupt = |reason: String| Error::CorruptRecord {
        id: id.clone(),
        reason,
    };

    let owner_id: String = row.try_get("owner_id")?;
    let category: String = row.try_get("category")?;
    let payload: String = row.try_get("payload")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Record {
        id: Uuid::parse_str(&id).map_err(|e| corrupt(format!("invalid id: {}", e)))?,
        owner_id: Uuid::parse_str(&owner_id)
            .map_err(|e| corrupt(format!("invalid owner id '{}': {}", owner_id, e)))?,
        category: Category::from_str(&category)
            .ok_or_else(|| corrupt(format!("unknown category '{}'", category)))?,
        payload: serde_json::from_str(&payload)
            .map_err(|e| corrupt(format!("payload is not JSON: {}", e)))?,
        score: row
            .try_get::<f64, _>("score")
            .map_err(|e| corrupt(format!("invalid score: {}", e)))?,
        created_at: crate::time::parse_stored(&created_at),
    })
}
