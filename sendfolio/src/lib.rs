//! sendfolio: backend service for sending résumés to recipient batches
//!
//! An authenticated user uploads résumé files, authors reusable email
//! templates, and sends a résumé to a batch of recipients through the Gmail
//! API. This crate implements the dispatch surface of that product:
//!
//! - **Composition**: typed MIME assembly with an optional attachment part
//!   and the base64url envelope the provider's submit API requires
//! - **Dispatch**: a per-batch Gmail client bound to one sender's OAuth2
//!   credential pair, with transparent token refresh
//! - **Batching**: ordered fan-out with per-recipient failure isolation;
//!   one bad address never aborts the rest of the batch
//! - **Audit**: one summary row per batch, plus the caller's send history
//!
//! User, template, and résumé CRUD, and session authentication, are
//! collaborating services consumed through the interfaces in [`store`] and
//! [`auth`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sendfolio::config::SendfolioConfig;
//! use sendfolio::handlers;
//! use sendfolio::state::AppState;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     sendfolio::observability::init()?;
//!
//!     let config = SendfolioConfig::load()?;
//!     let addr = format!("{}:{}", config.service.host, config.service.port);
//!     let state = AppState::from_config(config).await?;
//!
//!     let app = handlers::router(state);
//!     let listener = tokio::net::TcpListener::bind(&addr).await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```

// Lint configuration is handled at the workspace level in Cargo.toml

pub mod audit;
pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod state;
pub mod store;

#[cfg(test)]
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use sendfolio::prelude::*;
    //! ```

    // Dispatch pipeline
    pub use crate::email::{
        Attachment, BatchDispatcher, BatchOutcome, DispatchResult, DispatchStatus, EmailContent,
        EmailError, GmailMailerFactory, Mailer, MailerFactory, MimeMessage, SenderCredentials,
    };

    // Audit trail
    pub use crate::audit::{AuditStore, DeliveryStatus, EmailLog, NewEmailLog};

    // Caller identity
    pub use crate::auth::CurrentUser;

    // Collaborator interfaces
    pub use crate::store::{Resume, ResumeStore, Template, TemplateStore};

    // Error type
    pub use crate::error::AppError;

    // Application state
    pub use crate::state::AppState;

    // Configuration
    pub use crate::config::SendfolioConfig;

    // Re-export key dependencies
    pub use axum;

    // Convenience for JSON responses
    pub use serde_json::json;
}
