//! Mailer trait abstraction
//!
//! This module defines the `Mailer` seam between the batch dispatcher and
//! the concrete provider client, plus the per-batch factory that binds a
//! mailer to one sender's credentials.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Attachment, EmailContent, EmailError};

/// One sender's OAuth2 credential pair
///
/// Supplied per batch by the upstream authentication layer. Both tokens are
/// handed to the mailer so the transport can refresh transparently; the
/// refreshed token is never observed or persisted by callers.
#[derive(Debug, Clone)]
pub struct SenderCredentials {
    /// Current access token (possibly expired)
    pub access_token: String,

    /// Long-lived refresh token
    pub refresh_token: String,
}

/// Trait for submitting one composed message to the mail provider
///
/// An implementation is bound to a single sender for the lifetime of one
/// batch; it is not safe to share a bound instance across concurrently
/// dispatching batches for different senders.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Submit one message and return the provider's message id
    ///
    /// Exactly one submit attempt per call. Recipient-address validity is
    /// the provider's concern, not this layer's: a malformed address comes
    /// back as a dispatch failure, never a panic or an early return.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Dispatch`] carrying the provider's message text
    /// when the submission fails for any reason.
    async fn dispatch(
        &self,
        to: &str,
        content: &EmailContent,
        attachment: Option<&Attachment>,
    ) -> Result<String, EmailError>;
}

/// Factory constructing a mailer bound to one sender's credentials
///
/// Constructed once per process from provider configuration; invoked once
/// per batch so that no provider client outlives the request it serves.
pub trait MailerFactory: Send + Sync {
    /// Build a mailer for the given sender
    fn mailer_for(&self, credentials: SenderCredentials) -> Arc<dyn Mailer>;
}
