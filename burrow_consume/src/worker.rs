use burrow_core::Result;
use serde_json::Value;
use std::future::Future;

use crate::Decoder;

/// What a worker gets to look at for a single item
#[derive(Debug, Clone)]
pub struct Workload {
    pub item_id: String,
    pub queue: String,

    /// The item body, already decoded
    pub data: Value,

    /// How many times the item went back to the queue after being claimed
    pub release_count: u32,
    pub reject_count: u32,
}

/// What the worker decided should happen to the item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkSummary {
    /// Done, acknowledge and forget the item
    Success,

    /// Put the item back so it's delivered again
    Requeue,

    /// Put the item back and stop consuming
    Suspend,

    /// Could not be processed, reject the item
    Failure(String),
}

/// What the consumer actually did with the item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Acknowledged,
    Requeued,
    Suspended,
    Rejected,
}

impl Outcome {
    /// Only items that left the queue for good count against the iteration limit
    pub fn completes_iteration(&self) -> bool {
        matches!(self, Outcome::Acknowledged | Outcome::Rejected)
    }
}

/// Application logic that handles the items of a queue
pub trait Worker: Send + Sync {
    fn work<'a>(
        &'a self,
        workload: &'a Workload,
    ) -> impl Future<Output = Result<WorkSummary>> + Send + 'a;

    /// Decoder to use for item bodies when the consumer wasn't given one
    fn decoder(&self) -> Option<Decoder> {
        None
    }
}
