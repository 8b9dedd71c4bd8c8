//! Email error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when composing or dispatching emails
#[derive(Debug, Error)]
pub enum EmailError {
    /// The attachment file no longer exists at its recorded path
    #[error("attachment unavailable: {}", .0.display())]
    AttachmentUnavailable(PathBuf),

    /// The mail provider rejected or failed the submission
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    /// The access token could not be refreshed
    #[error("token refresh failed: {0}")]
    TokenRefresh(String),

    /// Mailer configuration error
    #[error("mailer configuration error: {0}")]
    Config(String),

    /// I/O error while reading an attachment
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error on the provider wire format
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EmailError {
    /// Create a dispatch error from a provider message
    #[must_use]
    pub fn dispatch<T: Into<String>>(msg: T) -> Self {
        Self::Dispatch(msg.into())
    }

    /// Create a token refresh error from a string message
    #[must_use]
    pub fn token_refresh<T: Into<String>>(msg: T) -> Self {
        Self::TokenRefresh(msg.into())
    }

    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}
