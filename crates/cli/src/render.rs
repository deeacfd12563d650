//! Plain-text rendering of list rows and thread entries.

use changedesk_core::conversation::{ConversationTurn, ProjectActivity, SubmitterStatus};
use changedesk_core::pagination::PageInfo;
use changedesk_core::request::{DeptHeadStatus, Request};
use changedesk_core::stats::RequestStats;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn request_row(r: &Request) -> String {
    let gate = match r.dept_head_status {
        DeptHeadStatus::None => String::new(),
        other => format!(" [dept head: {}]", other.as_str()),
    };
    let attachments = if r.has_downloadable_attachments() {
        " (attachments)"
    } else {
        ""
    };
    format!(
        "#{:<5} {:<12} {:<7} {:<20} {}{}{}",
        r.id,
        r.status.label(),
        r.priority.label(),
        r.project_name.as_deref().unwrap_or("-"),
        r.request_details,
        gate,
        attachments,
    )
}

pub fn activity_row(a: &ProjectActivity) -> String {
    let state = if a.has_response {
        "answered".to_string()
    } else {
        format!("{} open", a.open_turns)
    };
    format!(
        "{:<5} {:<24} {:<16} {:<10} {}",
        a.project_id,
        a.project_name.as_deref().unwrap_or("-"),
        a.latest_assigner_date.format(DATE_FORMAT),
        state,
        a.latest_remarks.as_deref().unwrap_or(""),
    )
}

pub fn turn_entry(t: &ConversationTurn) -> String {
    let mut out = format!(
        "[{}] {} (turn {}): {}",
        t.assigner_date.format(DATE_FORMAT),
        t.assigner_name.as_deref().unwrap_or("Assigner"),
        t.id,
        t.assigner_remarks.as_deref().unwrap_or("(attachment only)"),
    );
    let verdict = match t.submitter_status {
        SubmitterStatus::Unset => return out + "\n    awaiting response",
        status => status.as_str(),
    };
    out.push_str(&format!(
        "\n    {}{}: {}",
        verdict,
        t.submitter_date
            .map(|d| format!(" on {}", d.format(DATE_FORMAT)))
            .unwrap_or_default(),
        t.submitter_remarks.as_deref().unwrap_or("(no remarks)"),
    ));
    out
}

pub fn page_footer(info: &PageInfo) -> String {
    format!("{}  ({})", info.summary(), info.position())
}

pub fn stats_block(s: &RequestStats) -> String {
    format!(
        "total {}  pending {}  in progress {}  completed {}\ndept head: awaiting {}  approved {}  rejected {}",
        s.total,
        s.pending,
        s.in_progress,
        s.completed,
        s.awaiting_dept_head,
        s.dept_head_approved,
        s.dept_head_rejected,
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use changedesk_core::conversation::{build_turn, NewTurn, TurnDecision, TurnResponse};

    use super::*;

    fn turn() -> ConversationTurn {
        let input = NewTurn {
            project_id: 3,
            remarks: Some("Budget for Q3?".into()),
            ..Default::default()
        };
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        build_turn(8, 2, Some("Omar".into()), &input, at).unwrap()
    }

    #[test]
    fn open_turn_shows_awaiting() {
        let text = turn_entry(&turn());
        assert!(text.starts_with("[2025-03-01 09:30] Omar (turn 8): Budget for Q3?"));
        assert!(text.ends_with("awaiting response"));
    }

    #[test]
    fn answered_turn_shows_verdict() {
        let mut t = turn();
        let response = TurnResponse {
            decision: TurnDecision::Rejected,
            remarks: Some("Next year".into()),
            attachment: None,
        };
        let at = Utc.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).unwrap();
        t.respond(3, &response, at).unwrap();
        assert!(turn_entry(&t).ends_with("rejected on 2025-03-02 10:00: Next year"));
    }

    #[test]
    fn footer_combines_summary_and_position() {
        let info = PageInfo::new(37, 3, 15);
        assert_eq!(page_footer(&info), format!("{}  ({})", info.summary(), info.position()));
        assert!(page_footer(&info).starts_with("Showing 31-37 of 37"));
    }
}
