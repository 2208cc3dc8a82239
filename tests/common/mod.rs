//! Common test utilities and helpers
//!
//! A scripted terminating link answering from the operation context, plus
//! small helpers for building operations and reading result streams.

#![allow(dead_code)]

use futures::{stream, StreamExt};
use queuelink::link::api::LinkError;
use queuelink::operation::api::{FetchResult, NextLink, Operation, ResultStream};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub type Item = Result<FetchResult, LinkError>;

/// Terminating link: `testError` in the context fails the operation,
/// otherwise `testResponse` is returned as data
#[derive(Default)]
pub struct ScriptedLink {
    forwarded: Mutex<Vec<Operation>>,
}

impl ScriptedLink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn forwarded(&self) -> Vec<Operation> {
        self.forwarded.lock().unwrap().clone()
    }

    pub fn forwarded_names(&self) -> Vec<String> {
        self.forwarded()
            .iter()
            .map(|op| op.name().to_string())
            .collect()
    }
}

impl NextLink for ScriptedLink {
    fn forward(&self, operation: Operation) -> ResultStream {
        self.forwarded.lock().unwrap().push(operation.clone());

        if let Some(message) = operation.context.get("testError").and_then(Value::as_str) {
            return stream::iter(vec![Err(LinkError::Forwarded {
                message: message.to_string(),
            })])
            .boxed();
        }
        let data = operation
            .context
            .get("testResponse")
            .cloned()
            .unwrap_or(Value::Null);
        stream::iter(vec![Ok(FetchResult::from_data(data))]).boxed()
    }
}

pub fn query(name: &str) -> Operation {
    Operation::parse(format!("query {} {{ item {{ id }} }}", name))
        .unwrap()
        .with_context_value("testResponse", json!({ "name": name }))
}

pub fn mutation(name: &str) -> Operation {
    Operation::parse(format!("mutation {} {{ save {{ id }} }}", name))
        .unwrap()
        .with_context_value("testResponse", json!({ "saved": name }))
}

/// Await every item of a result stream
pub async fn collect(results: ResultStream) -> Vec<Item> {
    results.collect().await
}
