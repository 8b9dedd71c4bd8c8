//! HTTP handlers and router assembly
//!
//! Only the dispatch surface lives here: sending a batch and reading its
//! audit trail. User, template, and résumé CRUD are separate services; the
//! upstream auth layer is expected to populate the request with a
//! [`crate::auth::CurrentUser`] before these routes run.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod history;
pub mod send;

pub use history::{email_by_id, email_history};
pub use send::send_email;

/// Build the service router
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/emails/send", post(send::send_email))
        .route("/api/emails/history", get(history::email_history))
        .route("/api/emails/{id}", get(history::email_by_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
