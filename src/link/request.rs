//! Result streams handed out by a closed link

use crate::link::entry::{QueueEntry, Release};
use crate::link::error::LinkError;
use crate::link::queue_link::LinkInner;
use crate::operation::api::{FetchResult, NextLink, Operation, ResultStream};
use futures::{ready, Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

type QueuedItem = Result<FetchResult, LinkError>;

/// Stream returned for an operation requested while the link is closed
///
/// Nothing happens until the first poll, which plays the role of
/// subscription: the entry is created and handed to the link's enqueue
/// path. Dropping the stream while the entry is still queued cancels it.
pub(crate) struct QueuedRequest {
    link: Weak<LinkInner>,
    pending: Option<(Operation, Arc<dyn NextLink>)>,
    entry: Option<Weak<QueueEntry>>,
    release: Option<oneshot::Receiver<Release>>,
    results: Option<ResultStream>,
    done: bool,
}

impl QueuedRequest {
    pub(crate) fn new(
        link: Weak<LinkInner>,
        operation: Operation,
        forward: Arc<dyn NextLink>,
    ) -> Self {
        Self {
            link,
            pending: Some((operation, forward)),
            entry: None,
            release: None,
            results: None,
            done: false,
        }
    }

    fn subscribe(&mut self, operation: Operation, forward: Arc<dyn NextLink>) {
        let (sender, receiver) = oneshot::channel();
        let entry = Arc::new(QueueEntry::new(operation, forward, sender));
        self.release = Some(receiver);

        match self.link.upgrade() {
            Some(link) => {
                self.entry = Some(Arc::downgrade(&entry));
                link.enqueue(entry);
            }
            None => {
                // No gate left to hold the operation
                entry.release(Release::Forwarded(entry.forward()));
            }
        }
    }

    fn finish(&mut self, item: Option<QueuedItem>) -> Poll<Option<QueuedItem>> {
        self.done = true;
        self.results = None;
        Poll::Ready(item)
    }
}

impl Stream for QueuedRequest {
    type Item = QueuedItem;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        if let Some((operation, forward)) = this.pending.take() {
            this.subscribe(operation, forward);
        }

        if let Some(receiver) = this.release.as_mut() {
            let release = ready!(Pin::new(receiver).poll(cx));
            this.release = None;
            this.entry = None;
            match release {
                Ok(Release::Forwarded(results)) => this.results = Some(results),
                Ok(Release::Rejected(error)) => return this.finish(Some(Err(error))),
                Err(_) => {
                    return this.finish(Some(Err(LinkError::Internal {
                        message: "queue link dropped before the operation was released"
                            .to_string(),
                    })))
                }
            }
        }

        let Some(results) = this.results.as_mut() else {
            return this.finish(None);
        };
        match ready!(results.poll_next_unpin(cx)) {
            Some(Ok(result)) => Poll::Ready(Some(Ok(result))),
            terminal => this.finish(terminal),
        }
    }
}

impl Drop for QueuedRequest {
    fn drop(&mut self) {
        // The queue owns the entry; once released there is nothing to cancel
        let entry = self.entry.take().and_then(|entry| entry.upgrade());
        if let (Some(entry), Some(link)) = (entry, self.link.upgrade()) {
            link.cancel(&entry);
        }
    }
}

/// Wraps a sequentially drained forwarded stream and tells the link once it
/// has settled: completed, failed, or been dropped unfinished
pub(crate) struct DrainOnSettle {
    results: ResultStream,
    link: Weak<LinkInner>,
    settled: bool,
}

impl DrainOnSettle {
    pub(crate) fn new(results: ResultStream, link: Weak<LinkInner>) -> Self {
        Self {
            results,
            link,
            settled: false,
        }
    }

    fn settle(&mut self) {
        if self.settled {
            return;
        }
        self.settled = true;
        if let Some(link) = self.link.upgrade() {
            link.on_forward_settled();
        }
    }
}

impl Stream for DrainOnSettle {
    type Item = QueuedItem;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.settled {
            return Poll::Ready(None);
        }
        let item = ready!(this.results.poll_next_unpin(cx));
        if !matches!(item, Some(Ok(_))) {
            this.settle();
        }
        Poll::Ready(item)
    }
}

impl Drop for DrainOnSettle {
    fn drop(&mut self) {
        self.settle();
    }
}
