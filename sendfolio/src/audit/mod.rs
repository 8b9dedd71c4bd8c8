//! Batch audit records
//!
//! Persists one summary row per dispatched batch and serves the caller's
//! email history. The recipients column is stored as a canonical JSON array
//! of strings; the codec lives here at the persistence boundary, not in the
//! core data model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::email::BatchOutcome;

/// Errors raised at the audit persistence boundary
#[derive(Debug, Error)]
pub enum AuditError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Recipients column could not be encoded or decoded
    #[error("recipients codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// A stored row contained an unknown status tag
    #[error("invalid stored status: {0}")]
    InvalidStatus(String),
}

/// Aggregate delivery status of one batch
///
/// `Failed` as soon as any recipient failed; `Sent` only when every
/// recipient's message was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Every recipient's message was accepted
    Sent,
    /// At least one recipient failed
    Failed,
}

impl DeliveryStatus {
    /// The column value for this status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    fn from_column(value: &str) -> Result<Self, AuditError> {
        match value {
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            other => Err(AuditError::InvalidStatus(other.to_string())),
        }
    }
}

/// One persisted batch summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLog {
    /// Row id
    pub id: i64,

    /// Owner of the batch
    pub user_id: i64,

    /// Template the content was resolved from, if any
    pub template_id: Option<i64>,

    /// Résumé attached to the batch, if any
    pub resume_id: Option<i64>,

    /// Recipient list in original input order
    pub recipients: Vec<String>,

    /// Subject the batch was sent with
    pub subject: String,

    /// Aggregate delivery status
    pub status: DeliveryStatus,

    /// Human-readable failure summary, present iff any recipient failed
    pub error_message: Option<String>,

    /// Row creation time
    pub created_at: DateTime<Utc>,
}

/// Insert payload for one batch summary
#[derive(Debug, Clone)]
pub struct NewEmailLog {
    /// Owner of the batch
    pub user_id: i64,

    /// Template the content was resolved from, if any
    pub template_id: Option<i64>,

    /// Résumé attached to the batch, if any
    pub resume_id: Option<i64>,

    /// Recipient list in original input order
    pub recipients: Vec<String>,

    /// Subject the batch was sent with
    pub subject: String,

    /// Aggregate delivery status
    pub status: DeliveryStatus,

    /// Human-readable failure summary, present iff any recipient failed
    pub error_message: Option<String>,
}

impl NewEmailLog {
    /// Build the summary row for a completed batch
    ///
    /// Status is `failed` iff any recipient failed; the error message is a
    /// failure count, never per-recipient detail (that lives in the
    /// response body, not the audit row).
    #[must_use]
    pub fn for_batch(
        user_id: i64,
        template_id: Option<i64>,
        resume_id: Option<i64>,
        recipients: Vec<String>,
        subject: impl Into<String>,
        outcome: &BatchOutcome,
    ) -> Self {
        Self {
            user_id,
            template_id,
            resume_id,
            recipients,
            subject: subject.into(),
            status: if outcome.all_sent() {
                DeliveryStatus::Sent
            } else {
                DeliveryStatus::Failed
            },
            error_message: (outcome.failed > 0).then(|| format!("{} emails failed", outcome.failed)),
        }
    }
}

/// Encode an ordered recipient list as a canonical JSON array
///
/// # Errors
///
/// Returns a codec error if serialization fails (practically unreachable
/// for a list of strings).
pub fn encode_recipients(recipients: &[String]) -> Result<String, AuditError> {
    Ok(serde_json::to_string(recipients)?)
}

/// Decode a stored recipients column back into the ordered list
///
/// # Errors
///
/// Returns a codec error if the column does not hold a JSON array of
/// strings.
pub fn decode_recipients(column: &str) -> Result<Vec<String>, AuditError> {
    Ok(serde_json::from_str(column)?)
}

/// A page of email logs plus the total row count for the user
#[derive(Debug, Clone)]
pub struct EmailLogPage {
    /// The requested page of logs, newest first
    pub logs: Vec<EmailLog>,

    /// Total number of logs for the user across all pages
    pub total: i64,
}

/// Persistence boundary for batch summaries
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist one batch summary and return the stored row
    ///
    /// This write is not retried; a failure here surfaces to the caller
    /// even though the batch's messages were already submitted.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the insert fails.
    async fn record(&self, entry: NewEmailLog) -> Result<EmailLog, AuditError>;

    /// List the user's logs, newest first, one page at a time
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the query fails or a row is malformed.
    async fn list_for_user(
        &self,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> Result<EmailLogPage, AuditError>;

    /// Fetch one log by id, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the query fails or the row is malformed.
    async fn find_for_user(&self, id: i64, user_id: i64)
        -> Result<Option<EmailLog>, AuditError>;
}

/// Postgres-backed audit store
#[derive(Debug, Clone)]
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    /// Create a store over an existing connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row as stored; recipients and status decode on the way out
#[derive(Debug, sqlx::FromRow)]
struct EmailLogRow {
    id: i64,
    user_id: i64,
    template_id: Option<i64>,
    resume_id: Option<i64>,
    recipients: String,
    subject: String,
    status: String,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl EmailLogRow {
    fn into_log(self) -> Result<EmailLog, AuditError> {
        Ok(EmailLog {
            id: self.id,
            user_id: self.user_id,
            template_id: self.template_id,
            resume_id: self.resume_id,
            recipients: decode_recipients(&self.recipients)?,
            subject: self.subject,
            status: DeliveryStatus::from_column(&self.status)?,
            error_message: self.error_message,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn record(&self, entry: NewEmailLog) -> Result<EmailLog, AuditError> {
        let recipients = encode_recipients(&entry.recipients)?;

        let row: EmailLogRow = sqlx::query_as(
            r"
            INSERT INTO email_logs
                (user_id, template_id, resume_id, recipients, subject, status, error_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, template_id, resume_id, recipients, subject, status,
                      error_message, created_at
            ",
        )
        .bind(entry.user_id)
        .bind(entry.template_id)
        .bind(entry.resume_id)
        .bind(&recipients)
        .bind(&entry.subject)
        .bind(entry.status.as_str())
        .bind(&entry.error_message)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = row.id, user_id = row.user_id, "Email log recorded");
        row.into_log()
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> Result<EmailLogPage, AuditError> {
        let page = page.max(1);
        let offset = i64::from(page - 1) * i64::from(limit);

        let rows: Vec<EmailLogRow> = sqlx::query_as(
            r"
            SELECT id, user_id, template_id, resume_id, recipients, subject, status,
                   error_message, created_at
            FROM email_logs
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM email_logs WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let logs = rows
            .into_iter()
            .map(EmailLogRow::into_log)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EmailLogPage { logs, total })
    }

    async fn find_for_user(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<EmailLog>, AuditError> {
        let row: Option<EmailLogRow> = sqlx::query_as(
            r"
            SELECT id, user_id, template_id, resume_id, recipients, subject, status,
                   error_message, created_at
            FROM email_logs
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(EmailLogRow::into_log).transpose()
    }
}
