//! Durable audit log of accepted submissions.
//!
//! # Overview
//!
//! - [`SubmissionRecord`] - one accepted batch: tracking id, timestamp, URLs
//! - [`OutcomeRecorder`] - persistence seam used by the pipeline
//! - [`SubmissionLog`] - `SQLite` implementation with history queries
//!
//! Only real [`TrackingId`]s can be recorded, so the legacy `"0000"` sentinel
//! never reaches storage.
//!
//! # Example
//!
//! ```no_run
//! use reporter_core::Database;
//! use reporter_core::record::SubmissionLog;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let log = SubmissionLog::new(Database::new(Path::new("submissions.db")).await?);
//! for record in log.recent(10).await? {
//!     println!("{} {} urls", record.tracking_id, record.urls.len());
//! }
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::RecordError;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::FromRow;
use tracing::{debug, instrument};

use crate::db::Database;
use crate::submit::{FinalResult, TrackingId};

/// Result type for record operations.
pub type Result<T> = std::result::Result<T, RecordError>;

/// Audit entry for one accepted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    /// Identifier issued by the report service.
    pub tracking_id: TrackingId,
    /// When the batch was accepted.
    pub recorded_at: DateTime<Utc>,
    /// URLs carried by the accepted request.
    pub urls: Vec<String>,
    /// Tracking ids of every batch accepted in the same invocation, this one included.
    pub associated_ids: Vec<TrackingId>,
}

impl SubmissionRecord {
    /// Builds one record per accepted batch of `result`.
    ///
    /// Returns an empty list for [`FinalResult::NothingAccepted`].
    #[must_use]
    pub fn from_final_result(result: &FinalResult<'_>, recorded_at: DateTime<Utc>) -> Vec<Self> {
        let FinalResult::Accepted(batches) = result else {
            return Vec::new();
        };
        let associated: Vec<TrackingId> =
            batches.iter().map(|b| b.tracking_id.clone()).collect();

        batches
            .iter()
            .map(|batch| Self {
                tracking_id: batch.tracking_id.clone(),
                recorded_at,
                urls: batch.urls.to_vec(),
                associated_ids: associated.clone(),
            })
            .collect()
    }

    /// Number of URLs in the batch.
    #[must_use]
    pub fn url_count(&self) -> usize {
        self.urls.len()
    }

    fn joined_urls(&self) -> String {
        self.urls.join(" ")
    }

    fn joined_associated_ids(&self) -> String {
        self.associated_ids
            .iter()
            .map(TrackingId::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Persistence seam for accepted submissions.
#[async_trait]
pub trait OutcomeRecorder: Send + Sync {
    /// Persists `record`. Recording the same tracking id again overwrites it.
    async fn record(&self, record: &SubmissionRecord) -> Result<()>;
}

#[derive(Debug, FromRow)]
struct SubmissionRow {
    id: i64,
    tracking_id: String,
    recorded_at: String,
    urls: String,
    associated_ids: String,
}

impl TryFrom<SubmissionRow> for SubmissionRecord {
    type Error = RecordError;

    fn try_from(row: SubmissionRow) -> Result<Self> {
        let tracking_id = TrackingId::parse(&row.tracking_id)
            .ok_or_else(|| RecordError::corrupt(row.id, "unusable tracking id"))?;
        let recorded_at = DateTime::parse_from_rfc3339(&row.recorded_at)
            .map_err(|e| RecordError::corrupt(row.id, format!("bad timestamp: {e}")))?
            .with_timezone(&Utc);
        let urls = row.urls.split_whitespace().map(str::to_string).collect();
        let associated_ids = row
            .associated_ids
            .split_whitespace()
            .filter_map(TrackingId::parse)
            .collect();

        Ok(Self {
            tracking_id,
            recorded_at,
            urls,
            associated_ids,
        })
    }
}

/// `SQLite`-backed submission history.
#[derive(Debug, Clone)]
pub struct SubmissionLog {
    db: Database,
}

impl SubmissionLog {
    /// Creates a log over the given database connection.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts or replaces the row for `record.tracking_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Database`] if the upsert fails.
    #[instrument(skip(self, record), fields(tracking_id = %record.tracking_id, urls = record.url_count()))]
    pub async fn upsert(&self, record: &SubmissionRecord) -> Result<()> {
        let url_count = i64::try_from(record.url_count()).unwrap_or(i64::MAX);

        sqlx::query(
            r"INSERT INTO submissions (tracking_id, recorded_at, url_count, urls, associated_ids)
              VALUES (?, ?, ?, ?, ?)
              ON CONFLICT(tracking_id) DO UPDATE SET
                recorded_at = excluded.recorded_at,
                url_count = excluded.url_count,
                urls = excluded.urls,
                associated_ids = excluded.associated_ids",
        )
        .bind(record.tracking_id.as_str())
        .bind(record.recorded_at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .bind(url_count)
        .bind(record.joined_urls())
        .bind(record.joined_associated_ids())
        .execute(self.db.pool())
        .await?;

        debug!("Recorded submission");
        Ok(())
    }

    /// Returns up to `limit` records, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Database`] if the query fails, or
    /// [`RecordError::CorruptRow`] if a stored row cannot be decoded.
    #[instrument(skip(self))]
    pub async fn recent(&self, limit: u32) -> Result<Vec<SubmissionRecord>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r"SELECT id, tracking_id, recorded_at, urls, associated_ids
              FROM submissions
              ORDER BY recorded_at DESC, id DESC
              LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter().map(SubmissionRecord::try_from).collect()
    }

    /// Looks up the record for one tracking id.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Database`] if the query fails, or
    /// [`RecordError::CorruptRow`] if the row cannot be decoded.
    #[instrument(skip(self), fields(tracking_id = %tracking_id))]
    pub async fn find(&self, tracking_id: &TrackingId) -> Result<Option<SubmissionRecord>> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r"SELECT id, tracking_id, recorded_at, urls, associated_ids
              FROM submissions
              WHERE tracking_id = ?",
        )
        .bind(tracking_id.as_str())
        .fetch_optional(self.db.pool())
        .await?;

        row.map(SubmissionRecord::try_from).transpose()
    }

    /// Total number of recorded submissions.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM submissions")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl OutcomeRecorder for SubmissionLog {
    async fn record(&self, record: &SubmissionRecord) -> Result<()> {
        self.upsert(record).await
    }
}
