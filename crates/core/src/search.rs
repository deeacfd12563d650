//! List filters for request dashboards and project activity.
//!
//! Filters are predicates meant to run before [`crate::pagination::paginate`].

use crate::conversation::ProjectActivity;
use crate::error::CoreError;
use crate::request::{Request, RequestStatus};

/// Status tab on a request list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(RequestStatus),
}

impl StatusFilter {
    /// Parse `all` or any request status wire name.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        if name.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        RequestStatus::from_name(name).map(Self::Only)
    }

    pub fn matches(self, status: RequestStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// Case-insensitive substring match against an already-lowercased needle.
fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

/// Status tab plus free-text search over a request list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQuery {
    pub status: StatusFilter,
    pub text: String,
}

impl RequestQuery {
    pub fn new(status: StatusFilter, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    /// Match on status, then on submitter name, project name or details.
    pub fn matches(&self, request: &Request) -> bool {
        if !self.status.matches(request.status) {
            return false;
        }
        let needle = self.text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        contains_ci(Some(&request.submitted_by_name), &needle)
            || contains_ci(request.project_name.as_deref(), &needle)
            || contains_ci(Some(&request.request_details), &needle)
    }
}

/// Free-text search over project activity rows.
pub fn activity_matches(activity: &ProjectActivity, text: &str) -> bool {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    contains_ci(activity.project_name.as_deref(), &needle)
        || contains_ci(activity.assigner_name.as_deref(), &needle)
        || contains_ci(activity.latest_remarks.as_deref(), &needle)
}
