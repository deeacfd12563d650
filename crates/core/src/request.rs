//! Request record, its enums, and the routing & validation engine.
//!
//! Every mutation of a [`Request`] goes through one of the `validate_*`
//! functions below. They are side-effect free on failure: the request is
//! only touched once every check has passed. The same functions run on the
//! client (against a fetched copy) and in the system of record (against the
//! authoritative copy at write time).

use serde::{Deserialize, Serialize};

use crate::attachment::{check_attachment, check_attachments, AttachmentContext, AttachmentRef};
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of concurrently pending requests per submitter.
pub const MAX_PENDING_REQUESTS: usize = 3;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            _ => Err(CoreError::validation("priority", "invalid_priority")),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
        }
    }
}

/// Work status, advanced by the Resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    #[serde(rename = "inprogress")]
    InProgress,
    Completed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Parse from the wire name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "inprogress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(CoreError::validation("status", "invalid_status")),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inprogress",
            Self::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

/// State of the Department Head approval gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeptHeadStatus {
    /// The request does not require Department Head approval.
    None,
    Pending,
    Approved,
    /// Terminal; `rejection_reason` is always set.
    Rejected,
}

impl DeptHeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// A Department Head verdict on the approval gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeptHeadDecision {
    Approved,
    Rejected,
}

// ---------------------------------------------------------------------------
// Records and inputs
// ---------------------------------------------------------------------------

/// The unit of work tracked from submission to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: DbId,
    pub project_id: DbId,
    pub project_name: Option<String>,
    pub submitter_id: DbId,
    pub submitted_by_name: String,
    pub category_id: DbId,
    pub sub_category_id: Option<DbId>,
    pub priority: Priority,
    pub priority_reason: Option<String>,
    pub request_details: String,
    pub status: RequestStatus,
    pub dept_head_required: bool,
    pub dept_head_status: DeptHeadStatus,
    pub rejection_reason: Option<String>,
    pub dept_head_decided_at: Option<Timestamp>,
    pub assigned_resolver_id: Option<DbId>,
    pub assigner_comments: Option<String>,
    pub resolver_comment: Option<String>,
    pub working_hours: f64,
    pub attachments: Vec<AttachmentRef>,
    pub voice_note: Option<AttachmentRef>,
    /// Deliverables uploaded by the assigner after completion.
    #[serde(default)]
    pub completion_attachments: Vec<AttachmentRef>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Request {
    /// `true` when the approval gate no longer blocks the request.
    pub fn is_unblocked(&self) -> bool {
        matches!(
            self.dept_head_status,
            DeptHeadStatus::None | DeptHeadStatus::Approved
        )
    }

    /// Attachments a consumer may offer for download, in display order.
    pub fn downloadable_attachments(&self) -> impl Iterator<Item = &AttachmentRef> {
        self.attachments
            .iter()
            .chain(self.completion_attachments.iter())
    }

    pub fn has_downloadable_attachments(&self) -> bool {
        self.downloadable_attachments().next().is_some()
    }
}

/// Submission form as entered by the submitter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRequest {
    pub project_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub sub_category_id: Option<DbId>,
    pub priority: Priority,
    pub priority_reason: Option<String>,
    pub request_details: String,
    pub submitted_by_name: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    pub voice_note: Option<AttachmentRef>,
    /// Decided by the remote side; carried through untouched.
    #[serde(default)]
    pub dept_head_required: bool,
}

/// Assigner input for routing a request to a resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub resolver_id: DbId,
    pub assigner_comments: Option<String>,
}

/// Resolver progress report. `status` stays a string so that out-of-enum
/// values coming off the wire are reported as `invalid_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverUpdate {
    pub status: String,
    pub hours_worked: f64,
    pub resolver_comment: Option<String>,
}

/// Department Head verdict on the approval gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeptHeadVerdict {
    pub decision: DeptHeadDecision,
    pub rejection_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Trimmed copy of an optional string, `None` when blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Count the requests of `submitter_id` that are still pending.
pub fn count_pending_for<'a>(
    requests: impl IntoIterator<Item = &'a Request>,
    submitter_id: DbId,
) -> usize {
    requests
        .into_iter()
        .filter(|r| r.submitter_id == submitter_id && r.status == RequestStatus::Pending)
        .count()
}

/// Parse the resolver's free-text hours field. Empty input means zero.
pub fn parse_hours(input: &str) -> Result<f64, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    let hours: f64 = trimmed
        .parse()
        .map_err(|_| CoreError::validation("hours_worked", "hours_invalid"))?;
    validate_hours(hours)?;
    Ok(hours)
}

fn validate_hours(hours: f64) -> Result<(), CoreError> {
    if !hours.is_finite() {
        return Err(CoreError::validation("hours_worked", "hours_invalid"));
    }
    if hours < 0.0 {
        return Err(CoreError::validation("hours_worked", "hours_negative"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Enforce the pending quota for a submitter.
pub fn check_pending_quota(pending_count: usize) -> Result<(), CoreError> {
    if pending_count >= MAX_PENDING_REQUESTS {
        return Err(CoreError::QuotaExceeded {
            pending: pending_count,
            limit: MAX_PENDING_REQUESTS,
        });
    }
    Ok(())
}

/// Run every submission check without building a record.
///
/// Field checks run in form order, then attachment policy, then the quota.
pub fn check_submission(input: &NewRequest, pending_count: usize) -> Result<(), CoreError> {
    if input.project_id.is_none() {
        return Err(CoreError::validation("project_id", "project_required"));
    }
    if input.category_id.is_none() {
        return Err(CoreError::validation("category_id", "category_required"));
    }
    if input.request_details.trim().is_empty() {
        return Err(CoreError::validation("request_details", "details_required"));
    }
    if input.submitted_by_name.trim().is_empty() {
        return Err(CoreError::validation(
            "submitted_by_name",
            "submitted_by_required",
        ));
    }
    if input.priority == Priority::High && is_blank(input.priority_reason.as_deref()) {
        return Err(CoreError::validation(
            "priority_reason",
            "priority_reason_required",
        ));
    }

    check_attachments(&input.attachments, AttachmentContext::RequestFile)?;
    if let Some(voice) = &input.voice_note {
        check_attachment(voice, AttachmentContext::VoiceNote)?;
    }

    check_pending_quota(pending_count)
}

/// Validate a submission and build the resulting request in `pending`.
///
/// `id` is issued by the system of record. No record exists unless this
/// returns `Ok`.
pub fn validate_submission(
    id: DbId,
    submitter_id: DbId,
    input: &NewRequest,
    pending_count: usize,
    now: Timestamp,
) -> Result<Request, CoreError> {
    check_submission(input, pending_count)?;

    // check_submission guarantees both are present.
    let (Some(project_id), Some(category_id)) = (input.project_id, input.category_id) else {
        return Err(CoreError::validation("project_id", "project_required"));
    };

    let priority_reason = match input.priority {
        Priority::High => non_blank(input.priority_reason.as_deref()),
        Priority::Low | Priority::Normal => None,
    };

    let dept_head_status = if input.dept_head_required {
        DeptHeadStatus::Pending
    } else {
        DeptHeadStatus::None
    };

    Ok(Request {
        id,
        project_id,
        project_name: None,
        submitter_id,
        submitted_by_name: input.submitted_by_name.trim().to_string(),
        category_id,
        sub_category_id: input.sub_category_id,
        priority: input.priority,
        priority_reason,
        request_details: input.request_details.trim().to_string(),
        status: RequestStatus::Pending,
        dept_head_required: input.dept_head_required,
        dept_head_status,
        rejection_reason: None,
        dept_head_decided_at: None,
        assigned_resolver_id: None,
        assigner_comments: None,
        resolver_comment: None,
        working_hours: 0.0,
        attachments: input.attachments.clone(),
        voice_note: input.voice_note.clone(),
        completion_attachments: Vec::new(),
        created_at: now,
        updated_at: now,
    })
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Assign (or reassign) a resolver. Does not change `status`.
pub fn validate_assignment(
    request: &mut Request,
    assignment: &Assignment,
    now: Timestamp,
) -> Result<(), CoreError> {
    if request.status == RequestStatus::Completed {
        return Err(CoreError::InvalidState(format!(
            "request {} is completed and can no longer be reassigned",
            request.id
        )));
    }

    request.assigned_resolver_id = Some(assignment.resolver_id);
    request.assigner_comments = non_blank(assignment.assigner_comments.as_deref());
    request.updated_at = now;
    Ok(())
}

/// Apply a resolver progress report.
///
/// Any of the three statuses may be selected regardless of the current one.
pub fn validate_resolver_update(
    request: &mut Request,
    update: &ResolverUpdate,
    now: Timestamp,
) -> Result<(), CoreError> {
    validate_hours(update.hours_worked)?;
    let status = RequestStatus::from_name(&update.status)?;

    if request.assigned_resolver_id.is_none() {
        return Err(CoreError::InvalidState(format!(
            "request {} has no assigned resolver",
            request.id
        )));
    }

    request.status = status;
    request.working_hours = update.hours_worked;
    request.resolver_comment = non_blank(update.resolver_comment.as_deref());
    request.updated_at = now;
    Ok(())
}

/// Resolve the Department Head approval gate.
pub fn validate_dept_head_decision(
    request: &mut Request,
    verdict: &DeptHeadVerdict,
    now: Timestamp,
) -> Result<(), CoreError> {
    if request.dept_head_status != DeptHeadStatus::Pending {
        return Err(CoreError::InvalidState(format!(
            "request {} approval is '{}', not pending",
            request.id,
            request.dept_head_status.as_str()
        )));
    }

    match verdict.decision {
        DeptHeadDecision::Approved => {
            request.dept_head_status = DeptHeadStatus::Approved;
        }
        DeptHeadDecision::Rejected => {
            let reason = non_blank(verdict.rejection_reason.as_deref())
                .ok_or_else(|| CoreError::validation("rejection_reason", "reason_required"))?;
            request.dept_head_status = DeptHeadStatus::Rejected;
            request.rejection_reason = Some(reason);
        }
    }

    request.dept_head_decided_at = Some(now);
    request.updated_at = now;
    Ok(())
}

/// Attach a deliverable to a completed request.
pub fn validate_completion_attachment(
    request: &mut Request,
    attachment: &AttachmentRef,
    now: Timestamp,
) -> Result<(), CoreError> {
    if request.status != RequestStatus::Completed {
        return Err(CoreError::InvalidState(format!(
            "request {} is '{}'; deliverables require 'completed'",
            request.id,
            request.status.as_str()
        )));
    }
    check_attachment(attachment, AttachmentContext::CompletionFile)?;

    request.completion_attachments.push(attachment.clone());
    request.updated_at = now;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;
    use crate::attachment::MAX_ATTACHMENT_BYTES;

    fn form() -> NewRequest {
        NewRequest {
            project_id: Some(10),
            category_id: Some(2),
            request_details: "Add export button to the report page".into(),
            submitted_by_name: "R. Khan".into(),
            ..Default::default()
        }
    }

    fn created(dept_head_required: bool) -> Request {
        let mut input = form();
        input.dept_head_required = dept_head_required;
        validate_submission(1, 7, &input, 0, Utc::now()).unwrap()
    }

    // -- submission ----------------------------------------------------------

    #[test]
    fn valid_submission_starts_pending() {
        let r = created(false);
        assert_eq!(r.status, RequestStatus::Pending);
        assert_eq!(r.dept_head_status, DeptHeadStatus::None);
        assert_eq!(r.working_hours, 0.0);
        assert_eq!(r.created_at, r.updated_at);
    }

    #[test]
    fn dept_head_required_starts_gate_pending() {
        assert_eq!(created(true).dept_head_status, DeptHeadStatus::Pending);
    }

    #[test]
    fn high_priority_without_reason_rejected() {
        let mut input = form();
        input.priority = Priority::High;
        input.priority_reason = Some("   ".into());
        let err = validate_submission(1, 7, &input, 0, Utc::now()).unwrap_err();
        assert_eq!(err.validation_code(), Some("priority_reason_required"));
    }

    #[test]
    fn high_priority_reason_is_kept_trimmed() {
        let mut input = form();
        input.priority = Priority::High;
        input.priority_reason = Some("  audit next week ".into());
        let r = validate_submission(1, 7, &input, 0, Utc::now()).unwrap();
        assert_eq!(r.priority_reason.as_deref(), Some("audit next week"));
    }

    #[test]
    fn reason_dropped_for_normal_priority() {
        let mut input = form();
        input.priority_reason = Some("ignored".into());
        let r = validate_submission(1, 7, &input, 0, Utc::now()).unwrap();
        assert_eq!(r.priority_reason, None);
    }

    #[test]
    fn missing_fields_reported_individually() {
        let mut input = form();
        input.project_id = None;
        assert_eq!(
            check_submission(&input, 0).unwrap_err().validation_code(),
            Some("project_required")
        );

        let mut input = form();
        input.category_id = None;
        assert_eq!(
            check_submission(&input, 0).unwrap_err().validation_code(),
            Some("category_required")
        );

        let mut input = form();
        input.request_details = "\n".into();
        assert_eq!(
            check_submission(&input, 0).unwrap_err().validation_code(),
            Some("details_required")
        );

        let mut input = form();
        input.submitted_by_name = String::new();
        assert_eq!(
            check_submission(&input, 0).unwrap_err().validation_code(),
            Some("submitted_by_required")
        );
    }

    #[test]
    fn fourth_pending_request_exceeds_quota() {
        assert_matches!(
            check_submission(&form(), 3),
            Err(CoreError::QuotaExceeded { pending: 3, limit: 3 })
        );
        assert!(check_submission(&form(), 2).is_ok());
    }

    #[test]
    fn oversized_attachment_blocks_submission() {
        let mut input = form();
        input.attachments.push(AttachmentRef::new(
            "big.zip",
            "application/zip",
            "big.zip",
            MAX_ATTACHMENT_BYTES + 1,
        ));
        assert_matches!(check_submission(&input, 0), Err(CoreError::TooLarge { .. }));
    }

    #[test]
    fn non_audio_voice_note_rejected() {
        let mut input = form();
        input.voice_note = Some(AttachmentRef::new("v.png", "image/png", "v.png", 3));
        assert_matches!(
            check_submission(&input, 0),
            Err(CoreError::UnsupportedType { context: "voice_note", .. })
        );
    }

    #[test]
    fn pending_count_only_counts_own_pending() {
        let mut a = created(false);
        let mut b = created(false);
        b.status = RequestStatus::Completed;
        let mut c = created(false);
        c.submitter_id = 99;
        a.id = 1;
        assert_eq!(count_pending_for([&a, &b, &c], 7), 1);
    }

    // -- assignment ----------------------------------------------------------

    #[test]
    fn assignment_sets_resolver_without_touching_status() {
        let mut r = created(false);
        let later = r.updated_at + Duration::seconds(5);
        let assignment = Assignment {
            resolver_id: 42,
            assigner_comments: Some("please pick up".into()),
        };
        validate_assignment(&mut r, &assignment, later).unwrap();
        assert_eq!(r.assigned_resolver_id, Some(42));
        assert_eq!(r.status, RequestStatus::Pending);
        assert_eq!(r.updated_at, later);
    }

    #[test]
    fn reassignment_overwrites() {
        let mut r = created(false);
        let now = Utc::now();
        for resolver_id in [42, 43] {
            let a = Assignment {
                resolver_id,
                assigner_comments: None,
            };
            validate_assignment(&mut r, &a, now).unwrap();
        }
        assert_eq!(r.assigned_resolver_id, Some(43));
    }

    #[test]
    fn completed_request_cannot_be_assigned() {
        let mut r = created(false);
        r.status = RequestStatus::Completed;
        let before = r.clone();
        let a = Assignment {
            resolver_id: 5,
            assigner_comments: None,
        };
        assert_matches!(
            validate_assignment(&mut r, &a, Utc::now()),
            Err(CoreError::InvalidState(_))
        );
        assert_eq!(r, before);
    }

    // -- resolver update -----------------------------------------------------

    fn assigned() -> Request {
        let mut r = created(false);
        r.assigned_resolver_id = Some(42);
        r
    }

    #[test]
    fn resolver_update_applies_fields() {
        let mut r = assigned();
        let update = ResolverUpdate {
            status: "completed".into(),
            hours_worked: 5.5,
            resolver_comment: Some("done".into()),
        };
        validate_resolver_update(&mut r, &update, Utc::now()).unwrap();
        assert_eq!(r.status, RequestStatus::Completed);
        assert_eq!(r.working_hours, 5.5);
        assert_eq!(r.resolver_comment.as_deref(), Some("done"));
    }

    #[test]
    fn status_regression_is_not_forbidden() {
        let mut r = assigned();
        r.status = RequestStatus::Completed;
        let update = ResolverUpdate {
            status: "pending".into(),
            hours_worked: 0.0,
            resolver_comment: None,
        };
        assert!(validate_resolver_update(&mut r, &update, Utc::now()).is_ok());
        assert_eq!(r.status, RequestStatus::Pending);
    }

    #[test]
    fn negative_hours_rejected_and_request_untouched() {
        let mut r = assigned();
        let before = r.clone();
        let update = ResolverUpdate {
            status: "inprogress".into(),
            hours_worked: -1.0,
            resolver_comment: None,
        };
        let err = validate_resolver_update(&mut r, &update, Utc::now()).unwrap_err();
        assert_eq!(err.validation_code(), Some("hours_negative"));
        assert_eq!(r, before);
    }

    #[test]
    fn unknown_status_rejected() {
        let mut r = assigned();
        let update = ResolverUpdate {
            status: "closed".into(),
            hours_worked: 1.0,
            resolver_comment: None,
        };
        let err = validate_resolver_update(&mut r, &update, Utc::now()).unwrap_err();
        assert_eq!(err.validation_code(), Some("invalid_status"));
    }

    #[test]
    fn update_without_assigned_resolver_is_invalid_state() {
        let mut r = created(false);
        let update = ResolverUpdate {
            status: "inprogress".into(),
            hours_worked: 1.0,
            resolver_comment: None,
        };
        assert_matches!(
            validate_resolver_update(&mut r, &update, Utc::now()),
            Err(CoreError::InvalidState(_))
        );
    }

    #[test]
    fn parse_hours_handles_blank_and_garbage() {
        assert_eq!(parse_hours("").unwrap(), 0.0);
        assert_eq!(parse_hours(" 5.5 ").unwrap(), 5.5);
        assert_eq!(
            parse_hours("abc").unwrap_err().validation_code(),
            Some("hours_invalid")
        );
        assert_eq!(
            parse_hours("-2").unwrap_err().validation_code(),
            Some("hours_negative")
        );
        assert_eq!(
            parse_hours("inf").unwrap_err().validation_code(),
            Some("hours_invalid")
        );
    }

    // -- dept head gate ------------------------------------------------------

    #[test]
    fn approval_resolves_pending_gate() {
        let mut r = created(true);
        let verdict = DeptHeadVerdict {
            decision: DeptHeadDecision::Approved,
            rejection_reason: None,
        };
        validate_dept_head_decision(&mut r, &verdict, Utc::now()).unwrap();
        assert_eq!(r.dept_head_status, DeptHeadStatus::Approved);
        assert!(r.dept_head_decided_at.is_some());
        assert!(r.is_unblocked());
    }

    #[test]
    fn rejection_requires_reason() {
        let mut r = created(true);
        let verdict = DeptHeadVerdict {
            decision: DeptHeadDecision::Rejected,
            rejection_reason: Some(String::new()),
        };
        let err = validate_dept_head_decision(&mut r, &verdict, Utc::now()).unwrap_err();
        assert_eq!(err.validation_code(), Some("reason_required"));
        assert_eq!(r.dept_head_status, DeptHeadStatus::Pending);
    }

    #[test]
    fn rejection_is_terminal() {
        let mut r = created(true);
        let reject = DeptHeadVerdict {
            decision: DeptHeadDecision::Rejected,
            rejection_reason: Some("out of budget".into()),
        };
        validate_dept_head_decision(&mut r, &reject, Utc::now()).unwrap();
        assert_eq!(r.rejection_reason.as_deref(), Some("out of budget"));
        assert!(!r.is_unblocked());

        let approve = DeptHeadVerdict {
            decision: DeptHeadDecision::Approved,
            rejection_reason: None,
        };
        assert_matches!(
            validate_dept_head_decision(&mut r, &approve, Utc::now()),
            Err(CoreError::InvalidState(_))
        );
    }

    #[test]
    fn decision_on_ungated_request_is_invalid_state() {
        let mut r = created(false);
        let verdict = DeptHeadVerdict {
            decision: DeptHeadDecision::Approved,
            rejection_reason: None,
        };
        assert_matches!(
            validate_dept_head_decision(&mut r, &verdict, Utc::now()),
            Err(CoreError::InvalidState(_))
        );
    }

    // -- completion attachments ---------------------------------------------

    #[test]
    fn deliverable_requires_completed_status() {
        let mut r = assigned();
        let file = AttachmentRef::new("out.pdf", "application/pdf", "out.pdf", 100);
        assert_matches!(
            validate_completion_attachment(&mut r, &file, Utc::now()),
            Err(CoreError::InvalidState(_))
        );

        r.status = RequestStatus::Completed;
        validate_completion_attachment(&mut r, &file, Utc::now()).unwrap();
        assert!(r.has_downloadable_attachments());
    }

    #[test]
    fn request_without_files_has_nothing_to_download() {
        assert!(!created(false).has_downloadable_attachments());
    }

    // -- enums ---------------------------------------------------------------

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::InProgress).unwrap(),
            r#""inprogress""#
        );
        assert_eq!(RequestStatus::InProgress.label(), "In Progress");
        assert_eq!(RequestStatus::from_name("Completed").unwrap(), RequestStatus::Completed);
    }

    #[test]
    fn priority_parsing() {
        assert_eq!(Priority::from_name("HIGH").unwrap(), Priority::High);
        assert_eq!(
            Priority::from_name("urgent").unwrap_err().validation_code(),
            Some("invalid_priority")
        );
    }
}
