//! Serializable queue snapshots and their replay against a client
//!
//! A snapshot keeps only the request half of each entry. The forwarding
//! capability and the waiting caller cannot outlive the process, so a
//! restored operation is issued as a brand-new top-level request on a
//! client instead of being put back into a link's queue.

use crate::link::error::{LinkError, LinkResult};
use crate::link::queue_link::QueueLink;
use crate::operation::api::{select_operation, NextLink, Operation, OperationKind, ResultStream};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// One queued operation in persisted form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedOperation {
    pub query: String,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub context: Map<String, Value>,
    #[serde(default)]
    pub extensions: Map<String, Value>,
}

impl From<&Operation> for SerializedOperation {
    fn from(operation: &Operation) -> Self {
        Self {
            query: operation.query.clone(),
            variables: operation.variables.clone(),
            operation_name: operation.operation_name.clone(),
            context: operation.context.clone(),
            extensions: operation.extensions.clone(),
        }
    }
}

impl SerializedOperation {
    /// Rebuild the operation, taking its kind from the definition named by
    /// `operation_name`, or from the whole document if it names none
    pub fn to_operation(&self) -> LinkResult<Operation> {
        let header = select_operation(&self.query, self.operation_name.as_deref())
            .ok_or_else(|| LinkError::MalformedSnapshot {
                message: format!(
                    "cannot determine the operation kind of queued operation '{}'",
                    self.operation_name.as_deref().unwrap_or("<anonymous>")
                ),
            })?;

        let mut operation = Operation::new(header.kind, self.query.clone())
            .with_variables(self.variables.clone())
            .with_context(self.context.clone())
            .with_extensions(self.extensions.clone());
        operation.operation_name = self.operation_name.clone();
        Ok(operation)
    }
}

/// Entry point for issuing restored operations as new top-level requests
pub trait Client {
    type Response;

    fn query(&self, operation: Operation) -> Self::Response;

    fn mutate(&self, operation: Operation) -> Self::Response;
}

/// Client that issues restored operations straight into a link chain
pub struct ChainClient {
    chain: Arc<dyn NextLink>,
}

impl ChainClient {
    pub fn new(chain: Arc<dyn NextLink>) -> Self {
        Self { chain }
    }
}

impl Client for ChainClient {
    type Response = ResultStream;

    fn query(&self, operation: Operation) -> ResultStream {
        self.chain.forward(operation)
    }

    fn mutate(&self, operation: Operation) -> ResultStream {
        self.chain.forward(operation)
    }
}

impl QueueLink {
    /// Serializable copy of the queue, in arrival order
    pub fn extract(&self) -> Vec<SerializedOperation> {
        self.queued_operations()
            .iter()
            .map(SerializedOperation::from)
            .collect()
    }

    /// Re-issue snapshot entries on `client`
    ///
    /// Mutations go through `Client::mutate`, every other kind through
    /// `Client::query`. An entry whose kind cannot be determined yields
    /// `MalformedSnapshot` in its slot; the remaining entries are still
    /// issued. No link's queue is touched.
    pub fn restore<C>(client: &C, entries: &[SerializedOperation]) -> Vec<LinkResult<C::Response>>
    where
        C: Client + ?Sized,
    {
        entries
            .iter()
            .map(|entry| {
                let operation = entry.to_operation()?;
                log::debug!(
                    "Restoring {} '{}' from snapshot",
                    operation.kind,
                    operation.name()
                );
                Ok(match operation.kind {
                    OperationKind::Mutation => client.mutate(operation),
                    OperationKind::Query | OperationKind::Subscription => client.query(operation),
                })
            })
            .collect()
    }
}
