//! Typed MIME message composition
//!
//! Builds the transport-ready representation of one outbound email: headers,
//! an HTML body part, an optional base64-encoded attachment part, and the
//! base64url envelope the Gmail submit API expects in its `raw` field.
//!
//! Composition is a pure transformation: given the same boundary token, the
//! same inputs always produce the same bytes.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::Utc;

use super::attachment::Attachment;

/// Resolved content for one batch: subject plus HTML body
///
/// Resolution (inline caller input vs. a stored template) happens once per
/// batch, before composition; the composer treats the content as opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    /// Subject line
    pub subject: String,

    /// HTML body, carried verbatim into the `text/html` part
    pub html_body: String,
}

impl EmailContent {
    /// Create content from a subject and an HTML body
    #[must_use]
    pub fn new(subject: impl Into<String>, html_body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            html_body: html_body.into(),
        }
    }
}

/// One composed multipart message
///
/// Borrows the batch-wide content and attachment so that composing for every
/// recipient reuses the same bytes; only the `To:` header varies.
///
/// # Examples
///
/// ```rust
/// use sendfolio::email::{EmailContent, MimeMessage};
///
/// let content = EmailContent::new("Hello", "<p>Hi there</p>");
/// let message = MimeMessage::new("user@example.com", &content, None);
///
/// let envelope = message.encode();
/// assert!(!envelope.contains('+'));
/// assert!(!envelope.contains('/'));
/// assert!(!envelope.ends_with('='));
/// ```
#[derive(Debug, Clone)]
pub struct MimeMessage<'a> {
    to: &'a str,
    content: &'a EmailContent,
    attachment: Option<&'a Attachment>,
    boundary: String,
}

impl<'a> MimeMessage<'a> {
    /// Compose a message for one recipient
    ///
    /// The boundary token is time-derived and unique enough within a batch;
    /// collisions are irrelevant because messages are serialized one at a
    /// time. Use [`MimeMessage::with_boundary`] for deterministic output in
    /// tests.
    #[must_use]
    pub fn new(
        to: &'a str,
        content: &'a EmailContent,
        attachment: Option<&'a Attachment>,
    ) -> Self {
        Self {
            to,
            content,
            attachment,
            boundary: generate_boundary(),
        }
    }

    /// Replace the generated boundary token
    #[must_use]
    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    /// The boundary token separating MIME parts
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    fn parts(&self) -> Vec<MimePart<'_>> {
        let mut parts = vec![MimePart::Html(&self.content.html_body)];
        if let Some(attachment) = self.attachment {
            parts.push(MimePart::Attachment(attachment));
        }
        parts
    }

    /// Serialize headers and parts into the raw message text
    ///
    /// Lines are LF-separated; the HTML part is always present, the
    /// attachment part only when an attachment was supplied.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("To: {}\n", self.to));
        out.push_str(&format!("Subject: {}\n", self.content.subject));
        out.push_str("MIME-Version: 1.0\n");
        out.push_str(&format!(
            "Content-Type: multipart/mixed; boundary=\"{}\"\n\n",
            self.boundary
        ));

        for part in self.parts() {
            out.push_str(&format!("--{}\n", self.boundary));
            part.write_into(&mut out);
            out.push('\n');
        }

        out.push_str(&format!("--{}--", self.boundary));
        out
    }

    /// Encode the serialized message as the base64url transport envelope
    ///
    /// This is the format the provider's submit API requires: the standard
    /// base64 alphabet with `+` replaced by `-`, `/` by `_`, and trailing
    /// padding stripped.
    #[must_use]
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.serialize())
    }
}

/// A typed MIME part
enum MimePart<'a> {
    /// The HTML body, carried verbatim
    Html(&'a str),
    /// A binary attachment, base64-encoded inline
    Attachment(&'a Attachment),
}

impl MimePart<'_> {
    fn write_into(&self, out: &mut String) {
        match self {
            Self::Html(body) => {
                out.push_str("Content-Type: text/html; charset=UTF-8\n\n");
                out.push_str(body);
                out.push('\n');
            }
            Self::Attachment(attachment) => {
                out.push_str(&format!(
                    "Content-Type: {}; name=\"{}\"\n",
                    attachment.media_type, attachment.file_name
                ));
                out.push_str("Content-Transfer-Encoding: base64\n");
                out.push_str(&format!(
                    "Content-Disposition: attachment; filename=\"{}\"\n\n",
                    attachment.file_name
                ));
                out.push_str(&STANDARD.encode(&attachment.data));
                out.push('\n');
            }
        }
    }
}

/// Generate a time-derived boundary token
fn generate_boundary() -> String {
    format!("boundary_{}", Utc::now().timestamp_millis())
}
