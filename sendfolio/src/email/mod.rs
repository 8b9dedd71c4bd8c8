//! Bulk email dispatch pipeline
//!
//! This module is the core of the service:
//! - Typed MIME composition with an optional attachment part and the
//!   base64url transport envelope ([`MimeMessage`])
//! - Attachment loading with extension-based media-type inference
//!   ([`Attachment`])
//! - A per-batch Gmail client behind the [`Mailer`] seam
//!   ([`GmailMailerFactory`])
//! - Ordered, failure-isolated batch dispatch ([`BatchDispatcher`])
//!
//! # Examples
//!
//! ```rust,no_run
//! use sendfolio::email::{BatchDispatcher, EmailContent, Mailer};
//!
//! # async fn example(mailer: &dyn Mailer) {
//! let content = EmailContent::new("Hello", "<p>Please find my résumé attached.</p>");
//! let recipients = vec!["recruiter@example.com".to_string()];
//!
//! let outcome = BatchDispatcher::sequential()
//!     .dispatch_batch(mailer, &recipients, &content, None)
//!     .await;
//!
//! assert_eq!(outcome.total(), recipients.len());
//! # }
//! ```

mod attachment;
mod batch;
mod error;
mod gmail;
mod mailer;
mod message;

pub use attachment::{media_type_for, Attachment};
pub use batch::{BatchDispatcher, BatchOutcome, DispatchResult, DispatchStatus};
pub use error::EmailError;
pub use gmail::{GmailMailer, GmailMailerFactory};
pub use mailer::{Mailer, MailerFactory, SenderCredentials};
pub use message::{EmailContent, MimeMessage};
