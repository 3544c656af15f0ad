//! The queue contract consumers talk to.

use crate::{QueueItem, Result};
use std::future::Future;
use std::time::Duration;

/// A durable FIFO that hands out items one claim at a time.
///
/// A claimed item stays invisible to other consumers until it is deleted
/// (acknowledged), released or rejected.
pub trait Queue: Send + Sync {
    /// Name of the queue this handle works on
    fn name(&self) -> &str;

    /// Can `claim_item` bound its wait? Queues that answer `false` only
    /// support immediate claims, so an idle timeout can't be honored.
    fn supports_claim_timeout(&self) -> bool {
        true
    }

    /// Obtain the underlying channel and make sure the queue is usable
    fn create_queue(&self) -> impl Future<Output = Result<()>> + Send + '_;

    /// Add a new item with the given body
    fn create_item(&self, body: Vec<u8>) -> impl Future<Output = Result<QueueItem>> + Send + '_;

    /// Claim the next item, waiting at most `wait` for one to arrive.
    ///
    /// `None` (or a zero duration) doesn't wait at all. Returns `Ok(None)` once
    /// the wait elapses without an item.
    fn claim_item(
        &self,
        wait: Option<Duration>,
    ) -> impl Future<Output = Result<Option<QueueItem>>> + Send + '_;

    /// Acknowledge a claimed item, removing it permanently
    fn delete_item<'a>(&'a self, item: &'a QueueItem)
    -> impl Future<Output = Result<()>> + Send + 'a;

    /// Put a claimed item back so it can be claimed again
    fn release_item<'a>(
        &'a self,
        item: &'a QueueItem,
    ) -> impl Future<Output = Result<()>> + Send + 'a;

    /// Negatively acknowledge a claimed item, optionally asking for redelivery
    fn reject_item<'a>(
        &'a self,
        item: &'a QueueItem,
        requeue: bool,
    ) -> impl Future<Output = Result<()>> + Send + 'a;

    /// Approximate number of items waiting to be claimed
    fn number_of_items(&self) -> impl Future<Output = Result<u64>> + Send + '_;

    /// Remove the queue and everything in it, returning how many items were dropped
    fn delete_queue(&self) -> impl Future<Output = Result<usize>> + Send + '_;

    /// Release transport resources held by this handle
    fn shutdown(&self) -> impl Future<Output = Result<()>> + Send + '_;
}
