//! Link chain contracts
//!
//! A result stream carries the three outcomes of an executed operation:
//! `Some(Ok(result))` is a next value, `Some(Err(error))` is the terminal
//! error and `None` is completion. Dropping the stream unsubscribes.

use crate::link::error::LinkError;
use crate::operation::types::{FetchResult, Operation};
use futures::stream::BoxStream;
use std::sync::Arc;

/// Results of one operation as produced by the forwarding chain
pub type ResultStream = BoxStream<'static, Result<FetchResult, LinkError>>;

/// The rest of the chain after a link: executes an operation
pub trait NextLink: Send + Sync {
    fn forward(&self, operation: Operation) -> ResultStream;
}

impl<F> NextLink for F
where
    F: Fn(Operation) -> ResultStream + Send + Sync,
{
    fn forward(&self, operation: Operation) -> ResultStream {
        self(operation)
    }
}

/// A middleware stage that decides what happens to an operation before
/// (or instead of) handing it to `forward`
pub trait Link: Send + Sync {
    fn request(&self, operation: Operation, forward: Arc<dyn NextLink>) -> ResultStream;
}

/// Compose a link with the rest of the chain into a single `NextLink`
///
/// # Examples
/// ```rust
/// use futures::stream::{self, StreamExt};
/// use queuelink::link::api::QueueLink;
/// use queuelink::operation::api::{chain, FetchResult, NextLink, Operation, ResultStream};
/// use std::sync::Arc;
///
/// let terminal: Arc<dyn NextLink> = Arc::new(|_op: Operation| -> ResultStream {
///     stream::once(async { Ok(FetchResult::default()) }).boxed()
/// });
/// let pipeline = chain(Arc::new(QueueLink::new()), terminal);
/// let _results = pipeline.forward(Operation::parse("{ hello }").unwrap());
/// ```
pub fn chain(link: Arc<dyn Link>, next: Arc<dyn NextLink>) -> Arc<dyn NextLink> {
    Arc::new(Chained { link, next })
}

struct Chained {
    link: Arc<dyn Link>,
    next: Arc<dyn NextLink>,
}

impl NextLink for Chained {
    fn forward(&self, operation: Operation) -> ResultStream {
        self.link.request(operation, Arc::clone(&self.next))
    }
}
