//! Batch send orchestration
//!
//! Resolves content and attachment once per batch, fans the batch out
//! through the per-sender mailer, records the audit row, and reports the
//! per-recipient results. Requests that fail validation or resolution never
//! reach the dispatch loop; once the loop has run, the caller always gets a
//! 200 with a sent/failed summary.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audit::NewEmailLog;
use crate::auth::CurrentUser;
use crate::email::{Attachment, DispatchResult, EmailContent};
use crate::error::AppError;
use crate::state::AppState;

/// Body of `POST /api/emails/send`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    /// Recipient addresses, dispatched in this order
    #[serde(default)]
    pub recipients: Vec<String>,

    /// Resolve subject and body from this stored template
    pub template_id: Option<i64>,

    /// Attach this stored résumé's file
    pub resume_id: Option<i64>,

    /// Inline subject, ignored when a template is given
    pub subject: Option<String>,

    /// Inline HTML body, ignored when a template is given
    pub body: Option<String>,
}

/// Response envelope for a dispatched batch
#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    /// Always true once the dispatch loop has run
    pub success: bool,

    /// Human-readable sent/failed summary
    pub message: String,

    /// Per-recipient results plus derived counts
    pub data: SendEmailData,
}

/// Per-recipient results plus derived counts
#[derive(Debug, Serialize)]
pub struct SendEmailData {
    /// One result per recipient, in request order
    pub results: Vec<DispatchResult>,

    /// Derived counts for the batch
    pub summary: BatchSummary,
}

/// Derived counts for one batch
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    /// Number of recipients in the request
    pub total: usize,

    /// Recipients whose message was accepted
    pub sent: usize,

    /// Recipients whose message failed
    pub failed: usize,
}

/// Send one batch of emails
///
/// # Errors
///
/// - 400 when the request has no recipients, or no subject/body after
///   template resolution
/// - 404 when the referenced template or résumé does not belong to the
///   caller
/// - 500 when the attachment file is missing at send time or the audit
///   write fails (messages already submitted are not rolled back)
pub async fn send_email(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, AppError> {
    if request.recipients.is_empty() {
        return Err(AppError::validation("At least one recipient is required"));
    }

    // Content resolution happens once per batch; a template overrides any
    // inline subject/body.
    let mut subject = request.subject.filter(|s| !s.is_empty());
    let mut body = request.body.filter(|b| !b.is_empty());

    if let Some(template_id) = request.template_id {
        let template = state
            .templates()
            .find_for_user(template_id, user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Template not found"))?;
        subject = Some(template.subject);
        body = Some(template.body);
    }

    let (Some(subject), Some(body)) = (subject, body) else {
        return Err(AppError::validation("Subject and body are required"));
    };
    let content = EmailContent::new(subject, body);

    let mut resume_path = None;
    if let Some(resume_id) = request.resume_id {
        let resume = state
            .resumes()
            .find_for_user(resume_id, user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Resume not found"))?;
        resume_path = Some(resume.file_path);
    }

    // Loaded at most once per batch and shared across recipients. A file
    // that went missing since upload fails the whole request here, before
    // any provider call.
    let attachment = match &resume_path {
        Some(path) => Some(Attachment::load(path).await?),
        None => None,
    };

    let mailer = state.mailers().mailer_for(user.credentials());
    let outcome = state
        .dispatcher()
        .dispatch_batch(
            mailer.as_ref(),
            &request.recipients,
            &content,
            attachment.as_ref(),
        )
        .await;

    let entry = NewEmailLog::for_batch(
        user.id,
        request.template_id,
        request.resume_id,
        request.recipients.clone(),
        content.subject.clone(),
        &outcome,
    );
    state.audit().record(entry).await?;

    info!(
        user_id = user.id,
        total = outcome.total(),
        sent = outcome.sent,
        failed = outcome.failed,
        "Batch send complete"
    );

    Ok(Json(SendEmailResponse {
        success: true,
        message: format!("Emails sent: {}, Failed: {}", outcome.sent, outcome.failed),
        data: SendEmailData {
            summary: BatchSummary {
                total: outcome.total(),
                sent: outcome.sent,
                failed: outcome.failed,
            },
            results: outcome.results,
        },
    }))
}
