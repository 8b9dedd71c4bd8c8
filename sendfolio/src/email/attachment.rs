//! Attachment loading and media-type inference
//!
//! Reads a résumé file from disk once per batch and holds its bytes for
//! reuse across every composed message in that batch.

use std::io;
use std::path::Path;

use tracing::debug;

use super::error::EmailError;

/// A loaded attachment: file name, inferred media type, and raw bytes
///
/// The whole file is read into memory up front. That is acceptable because
/// résumé files are small; streaming would be needed before supporting
/// larger attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name presented to recipients
    pub file_name: String,

    /// Media type inferred from the file extension
    pub media_type: String,

    /// Raw file bytes
    pub data: Vec<u8>,
}

impl Attachment {
    /// Load an attachment from a file path
    ///
    /// The media type is inferred from the extension; the content itself is
    /// never inspected. Call this at most once per batch and share the
    /// result across recipients.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::AttachmentUnavailable`] if the path does not
    /// exist (for example, the file was deleted after upload), or
    /// [`EmailError::Io`] for any other read failure.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, EmailError> {
        let path = path.as_ref();

        let data = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                EmailError::AttachmentUnavailable(path.to_path_buf())
            } else {
                EmailError::Io(e)
            }
        })?;

        let file_name = path
            .file_name()
            .map_or_else(String::new, |name| name.to_string_lossy().into_owned());
        let media_type = media_type_for(path);

        debug!(
            file = %file_name,
            media_type = %media_type,
            size = data.len(),
            "Attachment loaded"
        );

        Ok(Self {
            file_name,
            media_type,
            data,
        })
    }
}

/// Infer a media type from a file extension
///
/// Recognizes the résumé formats the service accepts; anything else falls
/// back to a generic octet-stream type. This is intentionally permissive:
/// it labels content for transport, it does not validate it.
#[must_use]
pub fn media_type_for(path: &Path) -> String {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());

    match extension.as_deref() {
        Some("pdf") => mime::APPLICATION_PDF.to_string(),
        Some("doc") => "application/msword".to_string(),
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string()
        }
        _ => mime::APPLICATION_OCTET_STREAM.to_string(),
    }
}
