use std::fs;
use std::path::Path;

/// A single outgoing email, built fresh per send and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from: String,
    pub reply_to: Option<String>,
    pub to: String,
    pub subject: String,
    pub body: EmailBody,
    pub attachment: Option<EmailAttachment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmailBody {
    Text(String),
    Html(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

impl EmailAttachment {
    /// Read a file from disk, taking its base name as the display filename
    /// and guessing the MIME type from the extension.
    pub fn from_path(path: &str) -> Result<EmailAttachment, String> {
        let content =
            fs::read(path).map_err(|e| format!("Cannot read attachment {}: {}", path, e))?;

        let filename = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
            .to_string();

        let content_type = content_type_for(&filename).to_string();

        Ok(EmailAttachment {
            filename,
            content,
            content_type,
        })
    }
}

pub(crate) fn content_type_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "html" => "text/html",
        "csv" => "text/csv",
        "zip" => "application/zip",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}
