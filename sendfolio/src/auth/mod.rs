//! Authenticated caller identity
//!
//! Session/JWT authentication is an upstream concern; by the time a request
//! reaches these handlers, the auth middleware has inserted a [`CurrentUser`]
//! into the request extensions. This module is that interface.

use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::email::SenderCredentials;
use crate::error::AppError;

/// The authenticated caller, including their Gmail credential pair
///
/// Extracted from request extensions; rejects with 401 when the upstream
/// auth layer did not run.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User row id
    pub id: i64,

    /// Account email address (the sender identity at the provider)
    pub email: String,

    /// Current Gmail access token (possibly expired)
    pub access_token: String,

    /// Long-lived Gmail refresh token
    pub refresh_token: String,
}

impl CurrentUser {
    /// The credential pair handed to the per-batch mailer
    #[must_use]
    pub fn credentials(&self) -> SenderCredentials {
        SenderCredentials {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_string()))
    }
}
