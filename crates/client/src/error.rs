//! Transport errors and their translation into the domain taxonomy.

use changedesk_core::attachment::MAX_ATTACHMENT_BYTES;
use changedesk_core::error::CoreError;
use changedesk_core::types::DbId;
use serde::Deserialize;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A 2xx response whose envelope reported `success: false`.
    #[error("API rejected the call: {0}")]
    Rejected(String),

    /// A 2xx response without the `data` the call needs.
    #[error("API response carried no data: {0}")]
    MissingData(String),

    /// A local attachment file could not be read for upload.
    #[error("Attachment I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What a failed call was acting on, for `404`/`409` translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub entity: &'static str,
    pub id: DbId,
    /// A `409` on this call means the turn already carries a verdict.
    pub turn_response: bool,
}

impl Target {
    pub fn new(entity: &'static str, id: DbId) -> Self {
        Self {
            entity,
            id,
            turn_response: false,
        }
    }

    pub fn turn_response(turn_id: DbId) -> Self {
        Self {
            entity: "turn",
            id: turn_id,
            turn_response: true,
        }
    }
}

/// Laravel-style `422` body: `{"message": ..., "errors": {"field": ["code"]}}`.
#[derive(Debug, Deserialize)]
struct ValidationBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: serde_json::Map<String, serde_json::Value>,
}

/// Best-effort `message` extraction from a JSON error body.
fn message_of(body: &str) -> String {
    serde_json::from_str::<ValidationBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Translate a `422` body into a field-level validation error.
fn validation_from(body: &str) -> CoreError {
    let parsed = serde_json::from_str::<ValidationBody>(body).ok();
    let first = parsed
        .as_ref()
        .and_then(|b| b.errors.iter().next())
        .map(|(field, value)| {
            let code = match value {
                serde_json::Value::Array(items) => items
                    .first()
                    .and_then(|v| v.as_str())
                    .unwrap_or("invalid")
                    .to_string(),
                serde_json::Value::String(s) => s.clone(),
                _ => "invalid".to_string(),
            };
            CoreError::Validation {
                field: field.clone(),
                code,
            }
        });
    first.unwrap_or_else(|| {
        CoreError::validation(
            "request",
            &parsed.and_then(|b| b.message).unwrap_or_else(|| "invalid".into()),
        )
    })
}

impl ClientError {
    /// Map onto the domain taxonomy.
    pub fn into_core(self, target: Target) -> CoreError {
        match self {
            Self::Request(e) if e.is_timeout() => {
                CoreError::Transient(format!("request timed out: {e}"))
            }
            Self::Request(e) if e.is_connect() => {
                CoreError::Transient(format!("connection failed: {e}"))
            }
            Self::Request(e) if e.is_decode() => {
                CoreError::InvalidState(format!("malformed response: {e}"))
            }
            Self::Request(e) => CoreError::Transient(e.to_string()),
            Self::Api { status, body } => match status {
                401 | 403 => CoreError::Unauthorized(message_of(&body)),
                404 => CoreError::NotFound {
                    entity: target.entity,
                    id: target.id,
                },
                409 if target.turn_response => CoreError::AlreadyResponded { turn_id: target.id },
                409 => CoreError::InvalidState(message_of(&body)),
                413 => CoreError::TooLarge {
                    size_bytes: 0,
                    limit_bytes: MAX_ATTACHMENT_BYTES,
                },
                415 => CoreError::UnsupportedType {
                    mime_type: message_of(&body),
                    context: "upload",
                },
                422 => validation_from(&body),
                429 | 500..=599 => CoreError::Transient(format!("server returned {status}")),
                _ => CoreError::InvalidState(format!("unexpected status {status}: {}", message_of(&body))),
            },
            Self::Rejected(message) if message.trim().is_empty() => {
                CoreError::InvalidState(format!("{} {} was rejected", target.entity, target.id))
            }
            Self::Rejected(message) => CoreError::InvalidState(message),
            Self::MissingData(what) => CoreError::InvalidState(format!("{what} carried no data")),
            Self::Io(e) => CoreError::validation("attachment", &format!("unreadable: {e}")),
            Self::Config(e) => CoreError::InvalidState(e.to_string()),
        }
    }
}
