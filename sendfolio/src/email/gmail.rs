//! Gmail API dispatch client
//!
//! Submits composed messages through the Gmail `users.messages.send`
//! endpoint, one authenticated call per recipient. A client instance is
//! bound to one sender's credential pair for the lifetime of a batch.

use std::sync::Arc;
use std::time::Duration;

use oauth2::basic::BasicClient;
use oauth2::{ClientId, ClientSecret, RefreshToken, TokenResponse, TokenUrl};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::GoogleSettings;

use super::{
    Attachment, EmailContent, EmailError, Mailer, MailerFactory, MimeMessage, SenderCredentials,
};

/// Gmail raw-message submit endpoint
const GMAIL_SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

/// Google OAuth2 token endpoint, used only for refresh grants
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Factory producing per-batch Gmail mailers
///
/// Holds the application's Google OAuth2 client configuration and a shared
/// HTTP client; each batch gets its own [`GmailMailer`] bound to the
/// sender's tokens.
pub struct GmailMailerFactory {
    google: GoogleSettings,
    http: reqwest::Client,
}

impl GmailMailerFactory {
    /// Create a factory from Google OAuth2 client settings
    ///
    /// The timeout applies per provider call; nothing wraps a whole batch.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Config`] if the HTTP client cannot be built.
    pub fn new(google: GoogleSettings, request_timeout: Duration) -> Result<Self, EmailError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| EmailError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { google, http })
    }
}

impl MailerFactory for GmailMailerFactory {
    fn mailer_for(&self, credentials: SenderCredentials) -> Arc<dyn Mailer> {
        Arc::new(GmailMailer {
            google: self.google.clone(),
            http: self.http.clone(),
            access_token: Mutex::new(credentials.access_token),
            refresh_token: credentials.refresh_token,
        })
    }
}

/// Gmail mailer bound to one sender for one batch
///
/// Token refresh is handled transparently: when the provider rejects the
/// access token, the client exchanges the refresh token once and resubmits.
/// The refreshed token lives only as long as this instance; it is never
/// persisted or reported back.
pub struct GmailMailer {
    google: GoogleSettings,
    http: reqwest::Client,
    access_token: Mutex<String>,
    refresh_token: String,
}

/// Successful submit response: the provider-assigned message id
#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

/// Provider error payload, `{"error": {"message": ...}}`
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

impl GmailMailer {
    async fn submit(&self, raw: &str, access_token: &str) -> Result<reqwest::Response, EmailError> {
        self.http
            .post(GMAIL_SEND_URL)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "raw": raw }))
            .send()
            .await
            .map_err(|e| EmailError::dispatch(format!("submit request failed: {e}")))
    }

    /// Exchange the refresh token for a new access token
    async fn refresh_access_token(&self) -> Result<String, EmailError> {
        let client = BasicClient::new(ClientId::new(self.google.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.google.client_secret.clone()))
            .set_token_uri(
                TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
                    .map_err(|e| EmailError::config(format!("invalid token URL: {e}")))?,
            );

        // Redirects are disabled per the OAuth2 specification.
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| EmailError::config(format!("failed to build HTTP client: {e}")))?;

        let token = client
            .exchange_refresh_token(&RefreshToken::new(self.refresh_token.clone()))
            .request_async(&http)
            .await
            .map_err(|e| EmailError::token_refresh(e.to_string()))?;

        info!("Access token refreshed for the current batch");
        Ok(token.access_token().secret().clone())
    }
}

#[async_trait::async_trait]
impl Mailer for GmailMailer {
    async fn dispatch(
        &self,
        to: &str,
        content: &EmailContent,
        attachment: Option<&Attachment>,
    ) -> Result<String, EmailError> {
        let raw = MimeMessage::new(to, content, attachment).encode();

        let token = self.access_token.lock().await.clone();
        let mut response = self.submit(&raw, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!(to = %to, "Access token rejected, refreshing");
            let fresh = self.refresh_access_token().await?;
            *self.access_token.lock().await = fresh.clone();
            response = self.submit(&raw, &fresh).await?;
        }

        let status = response.status();
        if status.is_success() {
            let body: SendResponse = response
                .json()
                .await
                .map_err(|e| EmailError::dispatch(format!("invalid provider response: {e}")))?;
            debug!(to = %to, message_id = %body.id, "Message accepted by provider");
            return Ok(body.id);
        }

        let body = response.text().await.unwrap_or_default();
        Err(EmailError::dispatch(provider_error_detail(status, &body)))
    }
}

/// Extract the provider's message text from an error response
///
/// Falls back to the raw body, then to the bare status, when the payload is
/// not the expected JSON shape.
fn provider_error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ProviderError>(body) {
        return parsed.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("provider returned HTTP {status}")
    } else {
        trimmed.to_string()
    }
}
