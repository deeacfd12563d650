//! Department Head conversation thread over the memory store.

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use changedesk_core::conversation::{NewTurn, SubmitterStatus, TurnDecision, TurnResponse};
use changedesk_core::error::CoreError;
use changedesk_core::session::SessionCapability;
use changedesk_core::workflow::Workflow;
use changedesk_store::MemoryStore;

use common::*;

fn turn(remarks: &str) -> NewTurn {
    NewTurn {
        project_id: PROJECT_ID,
        remarks: Some(remarks.into()),
        ..Default::default()
    }
}

fn accept(remarks: &str) -> TurnResponse {
    TurnResponse {
        decision: TurnDecision::Accepted,
        remarks: Some(remarks.into()),
        attachment: None,
    }
}

#[tokio::test]
async fn concurrent_responses_have_exactly_one_winner() {
    let store = seed(MemoryStore::with_latency(Duration::from_millis(5))).await;
    let assigner = session(&store, ASSIGNER);
    let posted = assigner
        .post_assigner_turn(turn("Approve budget?"))
        .await
        .unwrap();

    let head_a = session(&store, DEPT_HEAD);
    let head_b = session(&store, DEPT_HEAD);
    let results = futures::future::join_all([
        head_a.respond_to_turn(posted.id, accept("yes")),
        head_b.respond_to_turn(posted.id, accept("also yes")),
    ])
    .await;

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let losers = results
        .iter()
        .filter(|r| matches!(r, Err(CoreError::AlreadyResponded { .. })))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(losers, 1);
}

#[tokio::test]
async fn responding_on_stale_copy_fails_at_write_time() {
    let store = seeded_store().await;
    let assigner = Workflow::new(session(&store, ASSIGNER));
    let head = Workflow::new(session(&store, DEPT_HEAD));

    let posted = assigner.post_assigner_turn(turn("Scope ok?")).await.unwrap();
    let stale = head.latest_open_turn(PROJECT_ID).await.unwrap().unwrap();
    assert!(stale.is_open());

    head.respond_to_turn(posted.id, accept("fine")).await.unwrap();
    assert_matches!(
        head.respond_to_turn(stale.id, accept("again")).await,
        Err(CoreError::AlreadyResponded { turn_id }) if turn_id == posted.id
    );
}

#[tokio::test]
async fn latest_open_turn_tracks_newest_and_has_response() {
    let store = seeded_store().await;
    let assigner = Workflow::new(session(&store, ASSIGNER));
    let head = Workflow::new(session(&store, DEPT_HEAD));

    assert!(head.has_response(PROJECT_ID).await.unwrap());

    let older = assigner.post_assigner_turn(turn("first")).await.unwrap();
    let newer = assigner.post_assigner_turn(turn("second")).await.unwrap();

    let latest = head.latest_open_turn(PROJECT_ID).await.unwrap().unwrap();
    assert_eq!(latest.id, newer.id);
    assert!(!head.has_response(PROJECT_ID).await.unwrap());

    let answered = head
        .respond_to_latest(PROJECT_ID, accept("go ahead"))
        .await
        .unwrap();
    assert_eq!(answered.id, newer.id);
    assert_eq!(answered.submitter_status, SubmitterStatus::Accepted);
    assert_eq!(answered.responder_id, Some(DEPT_HEAD.user_id));

    // The older turn is still open and now surfaces as the latest.
    let latest = head.latest_open_turn(PROJECT_ID).await.unwrap().unwrap();
    assert_eq!(latest.id, older.id);
}

#[tokio::test]
async fn respond_to_latest_without_open_turn_is_invalid_state() {
    let store = seeded_store().await;
    let head = Workflow::new(session(&store, DEPT_HEAD));
    assert_matches!(
        head.respond_to_latest(PROJECT_ID, accept("hm")).await,
        Err(CoreError::InvalidState(_))
    );
}

#[tokio::test]
async fn empty_response_is_rejected_before_any_write() {
    let store = seeded_store().await;
    let assigner = Workflow::new(session(&store, ASSIGNER));
    let head = Workflow::new(session(&store, DEPT_HEAD));
    let posted = assigner.post_assigner_turn(turn("?")).await.unwrap();

    let empty = TurnResponse {
        decision: TurnDecision::Rejected,
        remarks: Some("   ".into()),
        attachment: None,
    };
    let err = head.respond_to_turn(posted.id, empty).await.unwrap_err();
    assert_eq!(err.validation_code(), Some("empty_response"));
    assert!(head.latest_open_turn(PROJECT_ID).await.unwrap().is_some());
}

#[tokio::test]
async fn thread_is_oldest_first_and_activity_summarized() {
    let store = seeded_store().await;
    store.register_project(11, "HR Onboarding").await;
    let assigner = Workflow::new(session(&store, ASSIGNER));
    let head = Workflow::new(session(&store, DEPT_HEAD));

    assigner.post_assigner_turn(turn("one")).await.unwrap();
    assigner.post_assigner_turn(turn("two")).await.unwrap();
    assigner
        .post_assigner_turn(NewTurn {
            project_id: 11,
            remarks: Some("hr".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let thread = head.conversation(PROJECT_ID).await.unwrap();
    let remarks: Vec<_> = thread
        .iter()
        .map(|t| t.assigner_remarks.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(remarks, ["one", "two"]);

    let activity = head.project_activity().await.unwrap();
    assert_eq!(activity.len(), 2);
    let payroll = activity
        .iter()
        .find(|a| a.project_id == PROJECT_ID)
        .unwrap();
    assert_eq!(payroll.turn_count, 2);
    assert_eq!(payroll.open_turns, 2);
    assert_eq!(payroll.assigner_name.as_deref(), Some("Omar Haddad"));

    let found = head.activity_page("onboarding", 1, 15).await.unwrap();
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].project_id, 11);
}

#[tokio::test]
async fn turn_with_nothing_to_say_is_rejected() {
    let store = seeded_store().await;
    let assigner = Workflow::new(session(&store, ASSIGNER));
    let err = assigner
        .post_assigner_turn(NewTurn {
            project_id: PROJECT_ID,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.validation_code(), Some("empty_turn"));
}
