//! Queue Link Component
//!
//! A request gate that sits inline in a link chain. While open it is a
//! pass-through; while closed it holds operations in arrival order and
//! releases them when opened again.
//!
//! # Overview
//!
//! - **Gating**: `open()` / `close()` toggle the gate; `request()` decides per
//!   operation whether to forward now or hold
//! - **Exemptions**: a `skipQueue` context flag or a filtered operation kind
//!   bypasses a closed gate
//! - **Deduplication**: `first` / `last` keep policies suppress equivalent
//!   queued operations with a `DeduplicationSuppressed` error
//! - **Draining**: release everything on open, or one at a time
//! - **Listeners**: enqueue, dequeue, cancel and change events via the
//!   notification bus
//! - **Snapshots**: `extract()` for persistence, `restore()` to replay
//!
//! # Architecture
//!
//! ```text
//!   caller ──request──▶ ┌──────────────────────────────┐
//!                       │          QueueLink           │
//!                       │  open? ───────────────────────┼──▶ forward (rest of chain)
//!                       │  closed:                      │
//!                       │   ┌───┬───┬───┬───┐           │
//!                       │   │ 1 │ 2 │ 3 │...│ entries   │
//!                       │   └───┴───┴───┴───┘           │
//!                       └───────────┬──────────────────┘
//!                                   │ open(): drain
//!                                   ▼
//!                       forward(op) ──results──▶ waiting caller
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use futures::{stream, FutureExt, StreamExt};
//! use queuelink::link::api::{KeepPolicy, LinkError, QueueLink};
//! use queuelink::operation::api::{FetchResult, NextLink, Operation, ResultStream};
//! use std::sync::Arc;
//!
//! let terminal: Arc<dyn NextLink> = Arc::new(|_op: Operation| -> ResultStream {
//!     stream::iter(vec![Ok(FetchResult::default())]).boxed()
//! });
//! let link = QueueLink::builder().keep_policy(KeepPolicy::First).closed().build();
//!
//! let op = Operation::parse("query Feed { feed { id } }").unwrap();
//! let mut first = link.request(op.clone(), Arc::clone(&terminal));
//! let mut second = link.request(op, terminal);
//!
//! assert!(first.next().now_or_never().is_none());
//! assert!(matches!(
//!     second.next().now_or_never(),
//!     Some(Some(Err(LinkError::DeduplicationSuppressed)))
//! ));
//! assert_eq!(link.len(), 1);
//! ```

pub(crate) mod entry;
pub(crate) mod error;
pub(crate) mod policy;
pub(crate) mod queue_link;
pub(crate) mod request;
pub(crate) mod snapshot;

pub mod api;

#[cfg(test)]
mod tests;
