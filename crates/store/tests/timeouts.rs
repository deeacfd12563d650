//! Remote calls that outlive the workflow timeout surface as transient.

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use changedesk_core::error::CoreError;
use changedesk_core::workflow::Workflow;
use changedesk_store::MemoryStore;

use common::*;

#[tokio::test]
async fn slow_read_times_out_as_transient() {
    let store = seed(MemoryStore::with_latency(Duration::from_millis(300))).await;
    let submitter = Workflow::with_timeout(session(&store, SUBMITTER), Duration::from_millis(20));

    let err = submitter.requests().await.unwrap_err();
    assert_matches!(err, CoreError::Transient(_));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn fast_store_completes_within_timeout() {
    let store = seed(MemoryStore::with_latency(Duration::from_millis(1))).await;
    let submitter = Workflow::with_timeout(session(&store, SUBMITTER), Duration::from_secs(5));
    assert!(submitter.requests().await.unwrap().is_empty());
}
