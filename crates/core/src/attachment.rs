//! Attachment reference type and the per-flow size/type policy.
//!
//! Attachments are opaque handles produced by device pickers (camera, file
//! picker, audio recorder). This module only gates them; it never reads,
//! transforms or stores the underlying content.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum size of any single attachment (10 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Document MIME types accepted on requests and thread turns.
pub const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/csv",
];

/// Image MIME types accepted on requests and thread turns.
pub const IMAGE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/heic",
];

/// Archive MIME types accepted on requests and thread turns.
pub const ARCHIVE_MIME_TYPES: &[&str] = &[
    "application/zip",
    "application/x-zip-compressed",
    "application/vnd.rar",
    "application/x-rar-compressed",
    "application/x-7z-compressed",
    "application/gzip",
    "application/x-tar",
];

/// Audio MIME types accepted for voice notes.
pub const AUDIO_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/mp4",
    "audio/m4a",
    "audio/x-m4a",
    "audio/aac",
    "audio/wav",
    "audio/x-wav",
    "audio/ogg",
    "audio/webm",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Opaque handle to user-supplied binary content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// URI or identifier understood by the producer (local path, content URI).
    pub uri: String,
    pub mime_type: String,
    /// Display name, also used as the multipart file name.
    pub name: String,
    pub size_bytes: u64,
}

impl AttachmentRef {
    pub fn new(
        uri: impl Into<String>,
        mime_type: impl Into<String>,
        name: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            uri: uri.into(),
            mime_type: mime_type.into(),
            name: name.into(),
            size_bytes,
        }
    }

    /// MIME type lowercased with any parameters (`; charset=...`) removed.
    pub fn essence(&self) -> String {
        mime_essence(&self.mime_type)
    }
}

/// The flow an attachment is being attached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentContext {
    /// File attached to a new request by the submitter.
    RequestFile,
    /// Voice note recorded by the submitter.
    VoiceNote,
    /// Assigner attachment on a conversation turn.
    AssignerTurn,
    /// Department Head attachment on a turn response.
    TurnResponse,
    /// Deliverable uploaded by the assigner on a completed request.
    CompletionFile,
}

impl AttachmentContext {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequestFile => "request_file",
            Self::VoiceNote => "voice_note",
            Self::AssignerTurn => "assigner_turn",
            Self::TurnResponse => "turn_response",
            Self::CompletionFile => "completion_file",
        }
    }

    /// Size limit for this flow.
    pub fn max_bytes(self) -> u64 {
        MAX_ATTACHMENT_BYTES
    }

    /// Whether `essence` (already normalized) is on this flow's allow-list.
    pub fn allows(self, essence: &str) -> bool {
        match self {
            Self::VoiceNote => AUDIO_MIME_TYPES.contains(&essence),
            Self::RequestFile | Self::AssignerTurn | Self::TurnResponse | Self::CompletionFile => {
                DOCUMENT_MIME_TYPES.contains(&essence)
                    || IMAGE_MIME_TYPES.contains(&essence)
                    || ARCHIVE_MIME_TYPES.contains(&essence)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Policy checks
// ---------------------------------------------------------------------------

/// Normalize a MIME type: lowercase, parameters stripped, whitespace trimmed.
pub fn mime_essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Accept or reject a single attachment for the given flow.
pub fn check_attachment(attachment: &AttachmentRef, context: AttachmentContext) -> Result<(), CoreError> {
    let limit = context.max_bytes();
    if attachment.size_bytes > limit {
        return Err(CoreError::TooLarge {
            size_bytes: attachment.size_bytes,
            limit_bytes: limit,
        });
    }

    let essence = attachment.essence();
    if !context.allows(&essence) {
        return Err(CoreError::UnsupportedType {
            mime_type: attachment.mime_type.clone(),
            context: context.as_str(),
        });
    }

    Ok(())
}

/// Check every attachment, stopping at the first violation.
pub fn check_attachments<'a>(
    attachments: impl IntoIterator<Item = &'a AttachmentRef>,
    context: AttachmentContext,
) -> Result<(), CoreError> {
    attachments
        .into_iter()
        .try_for_each(|a| check_attachment(a, context))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
