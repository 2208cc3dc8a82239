//! Tests for the open/closed gating decision

use super::support::{
    assert_pending, collect_ready, named_mutation, named_query, poll_once, TestLink,
};
use crate::link::api::{LinkError, QueueLink};
use crate::operation::api::{chain, NextLink, OperationKind, SKIP_QUEUE_KEY};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_link_starts_open() {
    let link = QueueLink::new();
    assert!(link.is_open());
    assert!(link.is_empty());
}

#[test]
fn test_forwards_immediately_when_open() {
    let link = QueueLink::new();
    let test_link = TestLink::new();

    let mut results = link.request(named_query("Hello"), test_link.clone());

    // Forwarded during request(), queue untouched
    assert_eq!(test_link.count(), 1);
    assert_eq!(link.len(), 0);

    let items = collect_ready(&mut results);
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].as_ref().unwrap().data,
        Some(json!({ "hello": "Hello" }))
    );
}

#[test]
fn test_holds_requests_while_closed() {
    let link = QueueLink::new();
    let test_link = TestLink::new();
    link.close();

    let mut results = link.request(named_query("Hello"), test_link.clone());
    assert_pending(&mut results);

    assert_eq!(test_link.count(), 0);
    assert_eq!(link.len(), 1);
}

#[test]
fn test_queue_grows_by_one_per_request_in_arrival_order() {
    let link = QueueLink::new();
    let test_link = TestLink::new();
    link.close();

    let mut streams = Vec::new();
    for (index, name) in ["A", "B", "C"].iter().enumerate() {
        let mut results = link.request(named_query(name), test_link.clone());
        assert_pending(&mut results);
        assert_eq!(link.len(), index + 1);
        streams.push(results);
    }

    let names: Vec<String> = link
        .queued_operations()
        .iter()
        .map(|op| op.name().to_string())
        .collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn test_request_is_not_queued_until_polled() {
    let link = QueueLink::new();
    let test_link = TestLink::new();
    link.close();

    let results = link.request(named_query("Lazy"), test_link.clone());
    assert_eq!(link.len(), 0);

    drop(results);
    assert_eq!(link.len(), 0);
    link.open();
    assert_eq!(test_link.count(), 0);
}

#[test]
fn test_releases_held_requests_on_open() {
    let link = QueueLink::new();
    let test_link = TestLink::new();
    link.close();

    let mut results = link.request(named_query("Hello"), test_link.clone());
    assert_pending(&mut results);
    assert_eq!(test_link.count(), 0);

    link.open();
    assert!(link.is_open());
    assert_eq!(test_link.count(), 1);
    assert_eq!(link.len(), 0);

    let items = collect_ready(&mut results);
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].as_ref().unwrap().data,
        Some(json!({ "hello": "Hello" }))
    );
}

#[test]
fn test_skip_queue_bypasses_closed_link() {
    let link = QueueLink::new();
    let test_link = TestLink::new();
    link.close();

    let op = named_query("Urgent").with_context_value(SKIP_QUEUE_KEY, json!(true));
    let mut results = link.request(op, test_link.clone());

    assert_eq!(link.len(), 0);
    assert_eq!(test_link.count(), 1);
    assert_eq!(collect_ready(&mut results).len(), 1);
}

#[test]
fn test_filtered_kinds_bypass_closed_link() {
    let link = QueueLink::builder()
        .filter(vec![OperationKind::Mutation])
        .build();
    let test_link = TestLink::new();
    link.close();

    let mut mutation = link.request(named_mutation("Like"), test_link.clone());
    let mut query = link.request(named_query("Feed"), test_link.clone());
    assert_pending(&mut query);

    assert_eq!(test_link.names(), vec!["Like"]);
    assert_eq!(link.len(), 1);
    assert_eq!(collect_ready(&mut mutation).len(), 1);
}

#[test]
fn test_set_filter_applies_to_later_requests_only() {
    let link = QueueLink::new();
    let test_link = TestLink::new();
    link.close();

    let mut held = link.request(named_query("Before"), test_link.clone());
    assert_pending(&mut held);

    link.set_filter(vec![OperationKind::Query]);
    assert_eq!(link.filter(), vec![OperationKind::Query]);

    let _bypassed = link.request(named_query("After"), test_link.clone());
    assert_eq!(test_link.names(), vec!["After"]);
    assert_eq!(link.len(), 1);
}

#[test]
fn test_passes_through_forwarded_errors() {
    let link = QueueLink::new();
    let test_link = TestLink::new();

    let op = named_query("Broken").with_context_value("testError", json!("darkness"));
    let mut results = link.request(op.clone(), test_link.clone());
    let items = collect_ready(&mut results);
    assert_eq!(
        items,
        vec![Err(LinkError::Forwarded {
            message: "darkness".to_string()
        })]
    );

    link.close();
    let mut held = link.request(op, test_link.clone());
    assert_pending(&mut held);
    link.open();
    assert_eq!(
        collect_ready(&mut held),
        vec![Err(LinkError::Forwarded {
            message: "darkness".to_string()
        })]
    );
}

#[test]
fn test_close_keeps_queue_and_open_is_idempotent() {
    let link = QueueLink::new();
    let test_link = TestLink::new();
    link.close();

    let mut results = link.request(named_query("A"), test_link.clone());
    assert_pending(&mut results);
    link.close();
    assert_eq!(link.len(), 1);

    link.open();
    link.open();
    assert_eq!(test_link.count(), 1);
    assert_eq!(link.len(), 0);
}

#[test]
fn test_subscribing_after_reopen_forwards_directly() {
    let link = QueueLink::new();
    let test_link = TestLink::new();
    link.close();

    // Requested while closed, first polled after the link opened again
    let mut results = link.request(named_query("Late"), test_link.clone());
    link.open();

    assert!(matches!(poll_once(&mut results), Some(Some(Ok(_)))));
    assert_eq!(test_link.count(), 1);
    assert_eq!(link.len(), 0);
}

#[test]
fn test_dropping_the_link_fails_held_requests() {
    let link = QueueLink::new();
    let test_link = TestLink::new();
    link.close();

    let mut results = link.request(named_query("Orphan"), test_link.clone());
    assert_pending(&mut results);
    drop(link);

    match poll_once(&mut results) {
        Some(Some(Err(LinkError::Internal { .. }))) => {}
        other => panic!("Expected internal error, got: {:?}", other),
    }
    assert_eq!(test_link.count(), 0);
}

#[test]
fn test_link_composes_into_a_chain() {
    let link = QueueLink::new();
    let test_link = TestLink::new();
    let pipeline = chain(Arc::new(link.clone()), test_link.clone());

    link.close();
    let mut results = pipeline.forward(named_query("Chained"));
    assert_pending(&mut results);
    assert_eq!(link.len(), 1);

    link.open();
    assert_eq!(collect_ready(&mut results).len(), 1);
    assert_eq!(test_link.names(), vec!["Chained"]);
}
