//! Send requests accepted by [`MailTemplate`](crate::MailTemplate).

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

time::serde::format_description!(
    sent_date_format,
    PrimitiveDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second]"
);

/// A plain text message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleMessageRequest {
    /// Recipient address.
    pub to: String,
    /// Carbon copy recipients.
    #[serde(default)]
    pub cc: Vec<String>,
    /// Date header, `yyyy-MM-dd HH:mm:ss` in UTC. Defaults to the time of sending.
    #[serde(default, with = "sent_date_format::option")]
    pub sent_date: Option<PrimitiveDateTime>,
    pub subject: String,
    pub text: String,
}

impl SimpleMessageRequest {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    pub fn sent_date(mut self, date: PrimitiveDateTime) -> Self {
        self.sent_date = Some(date);
        self
    }
}

/// An HTML message with optional attachments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MimeMessageRequest {
    /// Recipient address.
    pub to: String,
    /// Carbon copy recipients.
    #[serde(default)]
    pub cc: Vec<String>,
    /// Date header, `yyyy-MM-dd HH:mm:ss` in UTC. Defaults to the time of sending.
    #[serde(default, with = "sent_date_format::option")]
    pub sent_date: Option<PrimitiveDateTime>,
    pub subject: String,
    /// HTML body.
    pub text: String,
    /// Path of a file to attach. Blank means no file.
    #[serde(default)]
    pub filepath: Option<String>,
}

impl MimeMessageRequest {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text: html.into(),
            ..Default::default()
        }
    }

    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    pub fn sent_date(mut self, date: PrimitiveDateTime) -> Self {
        self.sent_date = Some(date);
        self
    }

    pub fn filepath(mut self, path: impl Into<String>) -> Self {
        self.filepath = Some(path.into());
        self
    }
}

/// A file received with the request, attached as-is.
#[derive(Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    /// Explicit content type. Guessed from the file name when unset.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: Some(filename.into()),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
