//! Terminating links and helpers shared by the queue link tests

use crate::link::api::LinkError;
use crate::operation::api::{FetchResult, NextLink, Operation, OperationKind, ResultStream};
use futures::channel::mpsc::{unbounded, UnboundedSender};
use futures::{stream, FutureExt, StreamExt};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub(super) type Item = Result<FetchResult, LinkError>;

/// Terminating link that records every forwarded operation and answers
/// from the operation's context: `testError` fails, otherwise
/// `testResponse` is emitted once followed by completion.
#[derive(Default)]
pub(super) struct TestLink {
    operations: Mutex<Vec<Operation>>,
}

impl TestLink {
    pub(super) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(super) fn operations(&self) -> Vec<Operation> {
        self.operations.lock().unwrap().clone()
    }

    pub(super) fn count(&self) -> usize {
        self.operations.lock().unwrap().len()
    }

    pub(super) fn names(&self) -> Vec<String> {
        self.operations()
            .iter()
            .map(|op| op.name().to_string())
            .collect()
    }
}

impl NextLink for TestLink {
    fn forward(&self, operation: Operation) -> ResultStream {
        self.operations.lock().unwrap().push(operation.clone());

        if let Some(message) = operation.context.get("testError").and_then(Value::as_str) {
            let error = LinkError::Forwarded {
                message: message.to_string(),
            };
            return stream::iter(vec![Err(error)]).boxed();
        }

        let data = operation
            .context
            .get("testResponse")
            .cloned()
            .unwrap_or(Value::Null);
        stream::iter(vec![Ok(FetchResult::from_data(data))]).boxed()
    }
}

/// Terminating link whose results are pushed by the test
#[derive(Default)]
pub(super) struct ManualLink {
    operations: Mutex<Vec<Operation>>,
    senders: Mutex<Vec<UnboundedSender<Item>>>,
}

impl ManualLink {
    pub(super) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(super) fn count(&self) -> usize {
        self.operations.lock().unwrap().len()
    }

    pub(super) fn names(&self) -> Vec<String> {
        self.operations
            .lock()
            .unwrap()
            .iter()
            .map(|op| op.name().to_string())
            .collect()
    }

    /// Emit one result for the `index`-th forwarded operation and complete it
    pub(super) fn complete(&self, index: usize, data: Value) {
        let senders = self.senders.lock().unwrap();
        senders[index]
            .unbounded_send(Ok(FetchResult::from_data(data)))
            .unwrap();
        senders[index].close_channel();
    }

    pub(super) fn fail(&self, index: usize, message: &str) {
        let senders = self.senders.lock().unwrap();
        senders[index]
            .unbounded_send(Err(LinkError::Forwarded {
                message: message.to_string(),
            }))
            .unwrap();
        senders[index].close_channel();
    }
}

impl NextLink for ManualLink {
    fn forward(&self, operation: Operation) -> ResultStream {
        self.operations.lock().unwrap().push(operation);
        let (sender, receiver) = unbounded();
        self.senders.lock().unwrap().push(sender);
        receiver.boxed()
    }
}

pub(super) fn named_query(name: &str) -> Operation {
    Operation::new(OperationKind::Query, format!("query {} {{ hello }}", name))
        .with_name(name)
        .with_context_value("testResponse", json!({ "hello": name }))
}

pub(super) fn named_mutation(name: &str) -> Operation {
    Operation::new(OperationKind::Mutation, format!("mutation {} {{ like }}", name))
        .with_name(name)
        .with_context_value("testResponse", json!({ "like": true }))
}

/// One poll with a no-op waker; `None` means the stream is pending
pub(super) fn poll_once(results: &mut ResultStream) -> Option<Option<Item>> {
    results.next().now_or_never()
}

/// Poll once and expect the stream to be waiting
pub(super) fn assert_pending(results: &mut ResultStream) {
    assert!(poll_once(results).is_none(), "stream should be pending");
}

/// Drain a stream that must not block any more
pub(super) fn collect_ready(results: &mut ResultStream) -> Vec<Item> {
    let mut items = Vec::new();
    loop {
        match poll_once(results) {
            Some(Some(item)) => items.push(item),
            Some(None) => return items,
            None => panic!("stream blocked after {} items", items.len()),
        }
    }
}
