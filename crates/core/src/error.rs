use crate::types::DbId;

/// Domain error taxonomy shared by every layer.
///
/// Pure validation functions return these as values. Only the session
/// boundary produces [`CoreError::Transient`] and [`CoreError::Unauthorized`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// Caller-correctable problem with a single field.
    #[error("Validation failed on '{field}': {code}")]
    Validation { field: String, code: String },

    /// The submitter already has the maximum number of pending requests.
    #[error("Pending request limit reached ({pending}/{limit})")]
    QuotaExceeded { pending: usize, limit: usize },

    /// The transition is illegal for the entity's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The conversation turn already carries a Department Head verdict.
    #[error("Conversation turn {turn_id} has already been responded to")]
    AlreadyResponded { turn_id: DbId },

    /// Attachment exceeds the size limit of its flow.
    #[error("Attachment is {size_bytes} bytes, limit is {limit_bytes} bytes")]
    TooLarge { size_bytes: u64, limit_bytes: u64 },

    /// Attachment MIME type is not on the flow's allow-list.
    #[error("Unsupported attachment type '{mime_type}' for {context}")]
    UnsupportedType {
        mime_type: String,
        context: &'static str,
    },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Remote call failed or timed out; safe to retry.
    #[error("Transient failure: {0}")]
    Transient(String),

    /// The session reports the actor lacks permission.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::Validation`] with static field and code.
    pub fn validation(field: &str, code: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            code: code.to_string(),
        }
    }

    /// The validation code, if this is a validation error.
    pub fn validation_code(&self) -> Option<&str> {
        match self {
            Self::Validation { code, .. } => Some(code),
            _ => None,
        }
    }

    /// `true` when the operation may be retried unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// `true` when the user can fix the input and resubmit.
    ///
    /// These errors are surfaced with field-level detail; everything else
    /// is shown as a generic failure with a retry affordance.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::QuotaExceeded { .. }
                | Self::TooLarge { .. }
                | Self::UnsupportedType { .. }
        )
    }

    /// `true` for [`CoreError::InvalidState`] and its specialization
    /// [`CoreError::AlreadyResponded`].
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_) | Self::AlreadyResponded { .. })
    }
}
