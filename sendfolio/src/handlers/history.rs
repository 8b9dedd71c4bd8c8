//! Email history reads
//!
//! Serves the caller's past batch summaries from the audit store.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::audit::EmailLog;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Query parameters for `GET /api/emails/history`
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    pub page: u32,

    /// Page size
    #[serde(default = "default_limit")]
    pub limit: u32,
}

const fn default_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    10
}

/// Response envelope for the history listing
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Always true for a served page
    pub success: bool,

    /// The page of logs plus pagination metadata
    pub data: HistoryData,
}

/// One page of logs plus pagination metadata
#[derive(Debug, Serialize)]
pub struct HistoryData {
    /// Logs, newest first
    pub logs: Vec<EmailLog>,

    /// Pagination metadata
    pub pagination: Pagination,
}

/// Pagination metadata
#[derive(Debug, Serialize)]
pub struct Pagination {
    /// Total logs for the caller across all pages
    pub total: i64,

    /// The served page number
    pub page: u32,

    /// The served page size
    pub limit: u32,

    /// Total number of pages
    pub pages: i64,
}

/// Response envelope for a single log
#[derive(Debug, Serialize)]
pub struct LogResponse {
    /// Always true when the log was found
    pub success: bool,

    /// The requested log
    pub data: EmailLog,
}

/// List the caller's batch summaries, newest first
///
/// # Errors
///
/// Returns a 500 if the audit store query fails.
pub async fn email_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let limit = query.limit.max(1);
    let page = query.page.max(1);

    let result = state.audit().list_for_user(user.id, page, limit).await?;
    let pages = (result.total + i64::from(limit) - 1) / i64::from(limit);

    Ok(Json(HistoryResponse {
        success: true,
        data: HistoryData {
            logs: result.logs,
            pagination: Pagination {
                total: result.total,
                page,
                limit,
                pages,
            },
        },
    }))
}

/// Fetch one batch summary by id, scoped to the caller
///
/// # Errors
///
/// Returns a 404 when the log does not exist or belongs to someone else,
/// and a 500 if the audit store query fails.
pub async fn email_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<LogResponse>, AppError> {
    let log = state
        .audit()
        .find_for_user(id, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Email log not found"))?;

    Ok(Json(LogResponse {
        success: true,
        data: log,
    }))
}
