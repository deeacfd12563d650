//! Request body encoding.
//!
//! A body with no files goes out as JSON; as soon as one attachment is
//! present the whole body switches to `multipart/form-data`, with scalar
//! fields sent as text parts.

use changedesk_core::attachment::AttachmentRef;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ClientError;

/// A file part: form field name plus the local attachment to read.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub attachment: AttachmentRef,
}

/// Body builder that decides between JSON and multipart on completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormBody {
    fields: Map<String, Value>,
    files: Vec<FilePart>,
}

/// The encoding chosen for a body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(Value),
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    },
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar field. `null` values are left out.
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_null() {
            self.fields.insert(name.to_string(), value);
        }
        self
    }

    pub fn file(mut self, name: &str, attachment: Option<&AttachmentRef>) -> Self {
        if let Some(attachment) = attachment {
            self.files.push(FilePart {
                field: name.to_string(),
                attachment: attachment.clone(),
            });
        }
        self
    }

    /// Add several files under an array field name (`name[]`).
    pub fn files<'a>(mut self, name: &str, attachments: impl IntoIterator<Item = &'a AttachmentRef>) -> Self {
        let field = format!("{name}[]");
        for attachment in attachments {
            self.files.push(FilePart {
                field: field.clone(),
                attachment: attachment.clone(),
            });
        }
        self
    }

    pub fn into_payload(self) -> Payload {
        if !self.files.is_empty() {
            let fields = self
                .fields
                .into_iter()
                .map(|(k, v)| (k, form_text(&v)))
                .collect();
            Payload::Multipart {
                fields,
                files: self.files,
            }
        } else if self.fields.is_empty() {
            Payload::Empty
        } else {
            Payload::Json(Value::Object(self.fields))
        }
    }
}

/// Text form of a scalar for a multipart part. Booleans become `1`/`0`.
pub fn form_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        other => other.to_string(),
    }
}

/// Local filesystem path behind an attachment URI.
pub fn local_path(uri: &str) -> &str {
    uri.strip_prefix("file://").unwrap_or(uri)
}

/// Read an attachment's bytes for upload.
pub async fn read_attachment(attachment: &AttachmentRef) -> Result<Vec<u8>, ClientError> {
    Ok(tokio::fs::read(local_path(&attachment.uri)).await?)
}

/// Build a `reqwest` multipart form, reading every file part from disk.
pub async fn multipart_form(
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
) -> Result<reqwest::multipart::Form, ClientError> {
    let mut form = reqwest::multipart::Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    for part in files {
        let bytes = read_attachment(&part.attachment).await?;
        let file = reqwest::multipart::Part::bytes(bytes)
            .file_name(part.attachment.name.clone())
            .mime_str(&part.attachment.mime_type)?;
        form = form.part(part.field, file);
    }
    Ok(form)
}

/// Standard response envelope: `{"success": true, "message": ..., "data": ...}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

fn default_success() -> bool {
    true
}
