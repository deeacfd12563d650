//! Department Head conversation thread protocol.
//!
//! A thread is the project-scoped sequence of [`ConversationTurn`]s. The
//! Assigner opens a turn; the Department Head answers it at most once. The
//! thread is independent of the request approval gate: a project may carry a
//! conversation even when none of its requests need Department Head approval.
//!
//! Turn state machine: `unset -> accepted | rejected`, both terminal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attachment::{check_attachment, AttachmentContext, AttachmentRef};
use crate::error::CoreError;
use crate::request::non_blank;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The Department Head's verdict on a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitterStatus {
    #[default]
    Unset,
    Accepted,
    Rejected,
}

impl SubmitterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// A decision the Department Head may give. There is no way back to `unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDecision {
    Accepted,
    Rejected,
}

impl TurnDecision {
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "accepted" | "accept" => Ok(Self::Accepted),
            "rejected" | "reject" => Ok(Self::Rejected),
            _ => Err(CoreError::validation("status", "invalid_decision")),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl From<TurnDecision> for SubmitterStatus {
    fn from(decision: TurnDecision) -> Self {
        match decision {
            TurnDecision::Accepted => Self::Accepted,
            TurnDecision::Rejected => Self::Rejected,
        }
    }
}

/// One Assigner message and its at-most-one Department Head response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: DbId,
    pub project_id: DbId,
    /// Originating request, for context display only.
    pub request_id: Option<DbId>,
    pub assigner_id: DbId,
    pub assigner_name: Option<String>,
    pub assigner_remarks: Option<String>,
    pub assigner_attachment: Option<AttachmentRef>,
    pub assigner_date: Timestamp,
    pub submitter_status: SubmitterStatus,
    pub submitter_remarks: Option<String>,
    pub submitter_attachment: Option<AttachmentRef>,
    pub submitter_date: Option<Timestamp>,
    pub responder_id: Option<DbId>,
}

impl ConversationTurn {
    /// `true` while the Department Head has not answered.
    pub fn is_open(&self) -> bool {
        self.submitter_status == SubmitterStatus::Unset
    }

    /// Record the Department Head response.
    ///
    /// Fails with [`CoreError::AlreadyResponded`] if a verdict exists; the
    /// turn is left unchanged on every failure path.
    pub fn respond(
        &mut self,
        responder_id: DbId,
        response: &TurnResponse,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        if !self.is_open() {
            return Err(CoreError::AlreadyResponded { turn_id: self.id });
        }
        validate_response(response)?;

        self.submitter_status = response.decision.into();
        self.submitter_remarks = non_blank(response.remarks.as_deref());
        self.submitter_attachment = response.attachment.clone();
        self.submitter_date = Some(now);
        self.responder_id = Some(responder_id);
        Ok(())
    }
}

/// Assigner input for a new turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTurn {
    pub project_id: DbId,
    pub request_id: Option<DbId>,
    pub remarks: Option<String>,
    pub attachment: Option<AttachmentRef>,
}

/// Department Head input answering a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
    pub decision: TurnDecision,
    pub remarks: Option<String>,
    pub attachment: Option<AttachmentRef>,
}

/// Per-project summary of thread activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectActivity {
    pub project_id: DbId,
    pub project_name: Option<String>,
    pub assigner_name: Option<String>,
    pub latest_remarks: Option<String>,
    pub latest_assigner_date: Timestamp,
    pub turn_count: usize,
    pub open_turns: usize,
    pub has_response: bool,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A new turn needs remarks or an attachment.
pub fn validate_new_turn(input: &NewTurn) -> Result<(), CoreError> {
    if non_blank(input.remarks.as_deref()).is_none() && input.attachment.is_none() {
        return Err(CoreError::validation("assigner_remarks", "empty_turn"));
    }
    if let Some(attachment) = &input.attachment {
        check_attachment(attachment, AttachmentContext::AssignerTurn)?;
    }
    Ok(())
}

/// A response needs remarks or an attachment.
pub fn validate_response(response: &TurnResponse) -> Result<(), CoreError> {
    if non_blank(response.remarks.as_deref()).is_none() && response.attachment.is_none() {
        return Err(CoreError::validation("remarks", "empty_response"));
    }
    if let Some(attachment) = &response.attachment {
        check_attachment(attachment, AttachmentContext::TurnResponse)?;
    }
    Ok(())
}

/// Validate and build a new open turn. `id` is issued by the system of record.
pub fn build_turn(
    id: DbId,
    assigner_id: DbId,
    assigner_name: Option<String>,
    input: &NewTurn,
    now: Timestamp,
) -> Result<ConversationTurn, CoreError> {
    validate_new_turn(input)?;
    Ok(ConversationTurn {
        id,
        project_id: input.project_id,
        request_id: input.request_id,
        assigner_id,
        assigner_name,
        assigner_remarks: non_blank(input.remarks.as_deref()),
        assigner_attachment: input.attachment.clone(),
        assigner_date: now,
        submitter_status: SubmitterStatus::Unset,
        submitter_remarks: None,
        submitter_attachment: None,
        submitter_date: None,
        responder_id: None,
    })
}

// ---------------------------------------------------------------------------
// Thread queries
// ---------------------------------------------------------------------------

/// Ordering key: creation date, then id as a tie-breaker.
fn turn_order(turn: &ConversationTurn) -> (Timestamp, DbId) {
    (turn.assigner_date, turn.id)
}

/// The most recently created open turn of a project.
///
/// Earlier open turns are never returned while a later one exists.
pub fn latest_open_turn<'a>(
    turns: impl IntoIterator<Item = &'a ConversationTurn>,
    project_id: DbId,
) -> Option<&'a ConversationTurn> {
    turns
        .into_iter()
        .filter(|t| t.project_id == project_id && t.is_open())
        .max_by_key(|t| turn_order(t))
}

/// `true` iff the project has no open turn.
pub fn has_response<'a>(
    turns: impl IntoIterator<Item = &'a ConversationTurn>,
    project_id: DbId,
) -> bool {
    latest_open_turn(turns, project_id).is_none()
}

/// All turns of a project, oldest first.
pub fn thread_for<'a>(
    turns: impl IntoIterator<Item = &'a ConversationTurn>,
    project_id: DbId,
) -> Vec<&'a ConversationTurn> {
    let mut thread: Vec<_> = turns
        .into_iter()
        .filter(|t| t.project_id == project_id)
        .collect();
    thread.sort_by_key(|t| turn_order(t));
    thread
}

/// Summarize every project that has at least one turn, most recent first.
///
/// `project_name` resolves display names; unknown projects get `None`.
pub fn summarize_activity<'a>(
    turns: impl IntoIterator<Item = &'a ConversationTurn>,
    project_name: impl Fn(DbId) -> Option<String>,
) -> Vec<ProjectActivity> {
    let mut by_project: BTreeMap<DbId, Vec<&ConversationTurn>> = BTreeMap::new();
    for turn in turns {
        by_project.entry(turn.project_id).or_default().push(turn);
    }

    let mut activity: Vec<ProjectActivity> = by_project
        .into_iter()
        .filter_map(|(project_id, thread)| {
            let latest = thread.iter().copied().max_by_key(|t| turn_order(t))?;
            let open_turns = thread.iter().filter(|t| t.is_open()).count();
            Some(ProjectActivity {
                project_id,
                project_name: project_name(project_id),
                assigner_name: latest.assigner_name.clone(),
                latest_remarks: latest.assigner_remarks.clone(),
                latest_assigner_date: latest.assigner_date,
                turn_count: thread.len(),
                open_turns,
                has_response: open_turns == 0,
            })
        })
        .collect();

    activity.sort_by(|a, b| {
        b.latest_assigner_date
            .cmp(&a.latest_assigner_date)
            .then(a.project_id.cmp(&b.project_id))
    });
    activity
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
