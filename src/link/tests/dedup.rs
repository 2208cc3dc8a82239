//! Keep policy and duplicate detection

use super::support::{assert_pending, collect_ready, named_query, poll_once, TestLink};
use crate::link::api::{KeepPolicy, LinkError, QueueLink};
use crate::operation::api::{Operation, ResultStream};
use serde_json::json;
use std::sync::Arc;

fn attempt(name: &str, attempt: i64) -> Operation {
    named_query(name).with_context_value("attempt", json!(attempt))
}

fn queued_attempts(link: &QueueLink) -> Vec<(String, i64)> {
    link.queued_operations()
        .iter()
        .map(|op| {
            let attempt = op.context.get("attempt").and_then(|v| v.as_i64()).unwrap();
            (op.name().to_string(), attempt)
        })
        .collect()
}

/// Close the link and subscribe A, B, A in that order
fn enqueue_a_b_a(link: &QueueLink, test_link: &Arc<TestLink>) -> Vec<ResultStream> {
    link.close();
    [attempt("A", 1), attempt("B", 1), attempt("A", 2)]
        .into_iter()
        .map(|op| {
            let mut results = link.request(op, test_link.clone());
            let _ = poll_once(&mut results);
            results
        })
        .collect()
}

#[test]
fn test_keep_last_evicts_earlier_duplicate() {
    let link = QueueLink::builder().keep_policy(KeepPolicy::Last).build();
    let test_link = TestLink::new();

    let mut streams = enqueue_a_b_a(&link, &test_link);

    assert_eq!(
        queued_attempts(&link),
        vec![("B".to_string(), 1), ("A".to_string(), 2)]
    );
    assert_eq!(
        poll_once(&mut streams[0]),
        Some(Some(Err(LinkError::DeduplicationSuppressed)))
    );
    assert_eq!(poll_once(&mut streams[0]), Some(None));
    assert_pending(&mut streams[1]);
    assert_pending(&mut streams[2]);
}

#[test]
fn test_keep_first_rejects_later_duplicate() {
    let link = QueueLink::builder().keep_policy(KeepPolicy::First).build();
    let test_link = TestLink::new();
    link.close();

    let mut first = link.request(attempt("A", 1), test_link.clone());
    assert_pending(&mut first);
    let mut other = link.request(attempt("B", 1), test_link.clone());
    assert_pending(&mut other);

    // Rejected on subscription, never queued
    let mut duplicate = link.request(attempt("A", 2), test_link.clone());
    assert_eq!(
        poll_once(&mut duplicate),
        Some(Some(Err(LinkError::DeduplicationSuppressed)))
    );

    assert_eq!(
        queued_attempts(&link),
        vec![("A".to_string(), 1), ("B".to_string(), 1)]
    );
    assert_pending(&mut first);
}

#[test]
fn test_keep_all_queues_duplicates_in_order() {
    let link = QueueLink::new();
    let test_link = TestLink::new();

    let mut streams = enqueue_a_b_a(&link, &test_link);
    assert_eq!(
        queued_attempts(&link),
        vec![
            ("A".to_string(), 1),
            ("B".to_string(), 1),
            ("A".to_string(), 2)
        ]
    );

    link.open();
    assert_eq!(test_link.names(), vec!["A", "B", "A"]);
    let attempts: Vec<i64> = test_link
        .operations()
        .iter()
        .filter_map(|op| op.context.get("attempt").and_then(|v| v.as_i64()))
        .collect();
    assert_eq!(attempts, vec![1, 1, 2]);

    for results in streams.iter_mut() {
        assert_eq!(collect_ready(results).len(), 1);
    }
}

#[test]
fn test_keep_last_forwards_only_the_survivor() {
    let link = QueueLink::builder().keep_policy(KeepPolicy::Last).build();
    let test_link = TestLink::new();

    let _streams = enqueue_a_b_a(&link, &test_link);
    link.open();

    let forwarded: Vec<(String, Option<i64>)> = test_link
        .operations()
        .iter()
        .map(|op| {
            (
                op.name().to_string(),
                op.context.get("attempt").and_then(|v| v.as_i64()),
            )
        })
        .collect();
    assert_eq!(
        forwarded,
        vec![("B".to_string(), Some(1)), ("A".to_string(), Some(2))]
    );
}

#[test]
fn test_different_variables_are_not_duplicates() {
    let link = QueueLink::builder().keep_policy(KeepPolicy::First).build();
    let test_link = TestLink::new();
    link.close();

    let mut one = serde_json::Map::new();
    one.insert("id".to_string(), json!(1));
    let mut two = serde_json::Map::new();
    two.insert("id".to_string(), json!(2));

    let mut first = link.request(named_query("A").with_variables(one), test_link.clone());
    let mut second = link.request(named_query("A").with_variables(two), test_link.clone());
    assert_pending(&mut first);
    assert_pending(&mut second);

    assert_eq!(link.len(), 2);
}

#[test]
fn test_custom_duplicate_check() {
    // Same name is enough to be a duplicate
    let link = QueueLink::with_duplicate_check(KeepPolicy::First, |a, b| a.name() == b.name());
    let test_link = TestLink::new();
    link.close();

    let mut first = link.request(named_query("A"), test_link.clone());
    assert_pending(&mut first);

    let other_document = Operation::parse("query A { other }").unwrap().with_name("A");
    let mut second = link.request(other_document, test_link.clone());
    assert_eq!(
        poll_once(&mut second),
        Some(Some(Err(LinkError::DeduplicationSuppressed)))
    );
    assert_eq!(link.len(), 1);
}

#[test]
fn test_deduplication_ignores_entries_already_released() {
    let link = QueueLink::builder().keep_policy(KeepPolicy::First).build();
    let test_link = TestLink::new();

    link.close();
    let mut first = link.request(named_query("A"), test_link.clone());
    assert_pending(&mut first);
    link.open();
    assert_eq!(collect_ready(&mut first).len(), 1);

    link.close();
    let mut again = link.request(named_query("A"), test_link.clone());
    assert_pending(&mut again);
    assert_eq!(link.len(), 1);
}
