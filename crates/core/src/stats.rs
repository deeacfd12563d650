//! Dashboard counters derived from a request list.

use serde::Serialize;

use crate::request::{DeptHeadStatus, Request, RequestStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Gated requests still waiting on the Department Head.
    pub awaiting_dept_head: usize,
    pub dept_head_approved: usize,
    pub dept_head_rejected: usize,
}

impl RequestStats {
    pub fn from_requests<'a>(requests: impl IntoIterator<Item = &'a Request>) -> Self {
        requests.into_iter().fold(Self::default(), |mut stats, r| {
            stats.total += 1;
            match r.status {
                RequestStatus::Pending => stats.pending += 1,
                RequestStatus::InProgress => stats.in_progress += 1,
                RequestStatus::Completed => stats.completed += 1,
            }
            match r.dept_head_status {
                DeptHeadStatus::Pending => stats.awaiting_dept_head += 1,
                DeptHeadStatus::Approved => stats.dept_head_approved += 1,
                DeptHeadStatus::Rejected => stats.dept_head_rejected += 1,
                DeptHeadStatus::None => {}
            }
            stats
        })
    }
}
