//! Operation descriptors and results exchanged along the link chain

use crate::link::error::{LinkError, LinkResult};
use crate::operation::document::{select_operation, OperationKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Context key that lets a single operation bypass a closed queue
pub const SKIP_QUEUE_KEY: &str = "skipQueue";

/// A GraphQL request travelling down the link chain
///
/// The kind is fixed when the operation is built, either explicitly or by
/// inspecting the document once in [`Operation::parse`]. The queue link
/// never mutates an operation it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub query: String,
    pub kind: OperationKind,
    pub operation_name: Option<String>,
    pub variables: Map<String, Value>,
    pub context: Map<String, Value>,
    pub extensions: Map<String, Value>,
}

impl Operation {
    pub fn new(kind: OperationKind, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            kind,
            operation_name: None,
            variables: Map::new(),
            context: Map::new(),
            extensions: Map::new(),
        }
    }

    /// Build an operation from document text, taking kind and name from
    /// the operation definition it runs
    ///
    /// # Examples
    /// ```rust
    /// use queuelink::operation::api::{Operation, OperationKind};
    ///
    /// let op = Operation::parse("mutation Like { like(id: 1) }").unwrap();
    /// assert_eq!(op.kind, OperationKind::Mutation);
    /// assert_eq!(op.name(), "Like");
    /// ```
    pub fn parse(query: impl Into<String>) -> LinkResult<Self> {
        Self::from_document(query.into(), None)
    }

    /// Like [`Operation::parse`], running the definition called `name` in a
    /// document that defines several operations
    pub fn parse_named(query: impl Into<String>, name: impl Into<String>) -> LinkResult<Self> {
        Self::from_document(query.into(), Some(name.into()))
    }

    fn from_document(query: String, name: Option<String>) -> LinkResult<Self> {
        let header = select_operation(&query, name.as_deref()).ok_or_else(|| {
            LinkError::MalformedDocument {
                message: "no query, mutation or subscription definition found".to_string(),
            }
        })?;

        let mut operation = Self::new(header.kind, query);
        operation.operation_name = name.or(header.name);
        Ok(operation)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    pub fn with_context_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    pub fn with_extensions(mut self, extensions: Map<String, Value>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Operation name, or the empty string for anonymous operations
    pub fn name(&self) -> &str {
        self.operation_name.as_deref().unwrap_or("")
    }

    /// True if the per-call context asks to bypass the queue
    pub fn skip_queue(&self) -> bool {
        self.context
            .get(SKIP_QUEUE_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// One result emitted by the forwarding chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl FetchResult {
    pub fn from_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }
}
