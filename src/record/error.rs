//! Error types for submission record persistence.

use thiserror::Error;

/// Errors that can occur while persisting or reading submission records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be turned back into a record.
    #[error("corrupt submission row {row_id}: {reason}")]
    CorruptRow {
        /// Primary key of the offending row.
        row_id: i64,
        /// What was wrong with it.
        reason: String,
    },
}

impl RecordError {
    /// Creates a corrupt-row error.
    pub fn corrupt(row_id: i64, reason: impl Into<String>) -> Self {
        Self::CorruptRow {
            row_id,
            reason: reason.into(),
        }
    }

    /// Whether the failure came from `SQLite` busy/locked contention.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db)) => matches!(
                db.code().as_deref(),
                Some("SQLITE_BUSY" | "SQLITE_LOCKED" | "5" | "6")
            ),
            _ => false,
        }
    }
}
