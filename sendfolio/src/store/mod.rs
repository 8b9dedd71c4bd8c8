//! Stored template and résumé lookups
//!
//! The CRUD surface for templates and résumés lives outside this service's
//! core; these traits are the interfaces the dispatch orchestration needs:
//! ownership-scoped lookups by id, nothing more.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

/// Errors raised by the lookup stores
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A stored reusable email template
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Template {
    /// Row id
    pub id: i64,

    /// Display name
    pub name: String,

    /// Subject line the template resolves to
    pub subject: String,

    /// HTML body the template resolves to
    pub body: String,
}

/// A stored résumé upload
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Resume {
    /// Row id
    pub id: i64,

    /// Display title
    pub title: String,

    /// Local filesystem path of the uploaded file
    pub file_path: String,
}

/// Ownership-scoped template lookup
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Find a template by id, only if it belongs to the user
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    async fn find_for_user(&self, id: i64, user_id: i64) -> Result<Option<Template>, StoreError>;
}

/// Ownership-scoped résumé lookup
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Find a résumé by id, only if it belongs to the user
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    async fn find_for_user(&self, id: i64, user_id: i64) -> Result<Option<Resume>, StoreError>;
}

/// Postgres-backed template lookup
#[derive(Debug, Clone)]
pub struct PgTemplateStore {
    pool: PgPool,
}

impl PgTemplateStore {
    /// Create a store over an existing connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for PgTemplateStore {
    async fn find_for_user(&self, id: i64, user_id: i64) -> Result<Option<Template>, StoreError> {
        let template = sqlx::query_as(
            "SELECT id, name, subject, body FROM templates WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }
}

/// Postgres-backed résumé lookup
#[derive(Debug, Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    /// Create a store over an existing connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn find_for_user(&self, id: i64, user_id: i64) -> Result<Option<Resume>, StoreError> {
        let resume = sqlx::query_as(
            "SELECT id, title, file_path FROM resumes WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(resume)
    }
}
