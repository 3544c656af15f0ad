//! In-process queue implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::{BurrowError, Queue, QueueItem, Result, generate_item_id};

/// Every call made against a [`MemoryQueue`], in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    Created(String),
    Claimed(String),
    Deleted(String),
    Released(String),
    Rejected { item_id: String, requeue: bool },
}

#[derive(Default)]
struct MemoryQueueState {
    /// Waiting items, kept sorted by priority (FIFO within a priority).
    queued: VecDeque<QueueItem>,

    /// In-flight items by id.
    claimed: HashMap<String, QueueItem>,

    /// Items rejected without redelivery.
    rejected: Vec<QueueItem>,

    events: Vec<QueueEvent>,
}

impl MemoryQueueState {
    /// Append behind everything of equal or higher priority.
    fn push_back(&mut self, item: QueueItem) {
        let at = self
            .queued
            .iter()
            .position(|queued| queued.priority > item.priority)
            .unwrap_or(self.queued.len());
        self.queued.insert(at, item);
    }

    /// Put ahead of everything of equal or lower priority, like a broker
    /// redelivering to the original position.
    fn push_front(&mut self, item: QueueItem) {
        let at = self
            .queued
            .iter()
            .position(|queued| queued.priority >= item.priority)
            .unwrap_or(self.queued.len());
        self.queued.insert(at, item);
    }

    fn take_claimed(&mut self, item_id: &str) -> Result<QueueItem> {
        self.claimed
            .remove(item_id)
            .ok_or_else(|| BurrowError::ItemNotFound(item_id.to_string()))
    }
}

/// Queue living in process memory
///
/// Mirrors [`crate::RedisQueue`] semantics closely enough to drive a consumer
/// without a broker, and records every call for later inspection.
#[derive(Clone)]
pub struct MemoryQueue {
    name: String,
    state: Arc<Mutex<MemoryQueueState>>,
    notify: Arc<Notify>,
    closed: Arc<AtomicBool>,
    claim_timeout: bool,
}

impl MemoryQueue {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            state: Arc::new(Mutex::new(MemoryQueueState::default())),
            notify: Arc::new(Notify::new()),
            closed: Arc::new(AtomicBool::new(false)),
            claim_timeout: true,
        }
    }

    /// A queue that can only claim without waiting
    pub fn without_claim_timeout(mut self) -> Self {
        self.claim_timeout = false;
        self
    }

    /// Add an item with an explicit priority
    pub async fn push(&self, body: impl Into<Vec<u8>>, priority: i64) -> Result<QueueItem> {
        self.ensure_open()?;
        let item = QueueItem::new(generate_item_id(), body).with_priority(priority);
        {
            let mut state = self.state.lock().await;
            state.events.push(QueueEvent::Created(item.id.clone()));
            state.push_back(item.clone());
        }
        self.notify.notify_one();
        Ok(item)
    }

    /// Bodies of waiting items in claim order
    pub async fn queued_bodies(&self) -> Vec<Vec<u8>> {
        let state = self.state.lock().await;
        state.queued.iter().map(|item| item.body.clone()).collect()
    }

    pub async fn claimed_count(&self) -> usize {
        self.state.lock().await.claimed.len()
    }

    pub async fn rejected(&self) -> Vec<QueueItem> {
        self.state.lock().await.rejected.clone()
    }

    pub async fn events(&self) -> Vec<QueueEvent> {
        self.state.lock().await.events.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(BurrowError::Runtime(format!(
                "queue {} has been shut down",
                self.name
            )));
        }
        Ok(())
    }

    async fn try_claim(&self) -> Option<QueueItem> {
        let mut state = self.state.lock().await;
        let item = state.queued.pop_front()?;
        state.events.push(QueueEvent::Claimed(item.id.clone()));
        state.claimed.insert(item.id.clone(), item.clone());
        Some(item)
    }
}

impl Queue for MemoryQueue {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_claim_timeout(&self) -> bool {
        self.claim_timeout
    }

    async fn create_queue(&self) -> Result<()> {
        self.ensure_open()
    }

    async fn create_item(&self, body: Vec<u8>) -> Result<QueueItem> {
        self.push(body, 0).await
    }

    async fn claim_item(&self, wait: Option<Duration>) -> Result<Option<QueueItem>> {
        self.ensure_open()?;
        let deadline = wait.map(|wait| Instant::now() + wait);

        loop {
            if let Some(item) = self.try_claim().await {
                return Ok(Some(item));
            }

            let Some(deadline) = deadline.filter(|d| *d > Instant::now()) else {
                return Ok(None);
            };

            if tokio::time::timeout_at(deadline, self.notify.notified())
                .await
                .is_err()
            {
                // one last look, an item may have landed right at the deadline
                return Ok(self.try_claim().await);
            }
        }
    }

    async fn delete_item(&self, item: &QueueItem) -> Result<()> {
        let mut state = self.state.lock().await;
        state.take_claimed(&item.id)?;
        state.events.push(QueueEvent::Deleted(item.id.clone()));
        Ok(())
    }

    async fn release_item(&self, item: &QueueItem) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            let mut released = state.take_claimed(&item.id)?;
            released.release_count += 1;
            state.events.push(QueueEvent::Released(item.id.clone()));
            state.push_front(released);
        }
        self.notify.notify_one();
        Ok(())
    }

    async fn reject_item(&self, item: &QueueItem, requeue: bool) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            let mut rejected = state.take_claimed(&item.id)?;
            rejected.reject_count += 1;
            state.events.push(QueueEvent::Rejected {
                item_id: item.id.clone(),
                requeue,
            });
            if requeue {
                state.push_front(rejected);
            } else {
                state.rejected.push(rejected);
            }
        }
        if requeue {
            self.notify.notify_one();
        }
        Ok(())
    }

    async fn number_of_items(&self) -> Result<u64> {
        Ok(self.state.lock().await.queued.len() as u64)
    }

    async fn delete_queue(&self) -> Result<usize> {
        let mut state = self.state.lock().await;
        let removed = state.queued.len() + state.claimed.len() + state.rejected.len();
        state.queued.clear();
        state.claimed.clear();
        state.rejected.clear();
        Ok(removed)
    }

    async fn shutdown(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn claims_in_priority_then_fifo_order() {
        let queue = MemoryQueue::new("test");
        queue.push("low", 5).await.unwrap();
        queue.push("first", 0).await.unwrap();
        queue.push("second", 0).await.unwrap();

        let a = queue.claim_item(None).await.unwrap().unwrap();
        let b = queue.claim_item(None).await.unwrap().unwrap();
        let c = queue.claim_item(None).await.unwrap().unwrap();
        assert_eq!(a.body, b"first");
        assert_eq!(b.body, b"second");
        assert_eq!(c.body, b"low");
        assert!(queue.claim_item(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn release_puts_item_back_at_the_head() {
        let queue = MemoryQueue::new("test");
        queue.push("a", 0).await.unwrap();
        queue.push("b", 0).await.unwrap();

        let a = queue.claim_item(None).await.unwrap().unwrap();
        assert_eq!(queue.number_of_items().await.unwrap(), 1);
        queue.release_item(&a).await.unwrap();
        assert_eq!(queue.number_of_items().await.unwrap(), 2);

        let again = queue.claim_item(None).await.unwrap().unwrap();
        assert_eq!(again.id, a.id);
        assert_eq!(again.release_count, 1);
    }

    #[tokio::test]
    async fn reject_without_requeue_dead_letters() {
        let queue = MemoryQueue::new("test");
        queue.push("a", 0).await.unwrap();
        let a = queue.claim_item(None).await.unwrap().unwrap();
        queue.reject_item(&a, false).await.unwrap();

        assert_eq!(queue.number_of_items().await.unwrap(), 0);
        assert_eq!(queue.rejected().await.len(), 1);
        assert!(matches!(
            queue.delete_item(&a).await.unwrap_err(),
            BurrowError::ItemNotFound(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_claim_returns_none_after_the_wait() {
        let queue = MemoryQueue::new("test");
        let started = Instant::now();
        let claimed = queue
            .claim_item(Some(Duration::from_secs(2)))
            .await
            .unwrap();
        assert!(claimed.is_none());
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn bounded_claim_wakes_up_for_new_items() {
        let queue = MemoryQueue::new("test");
        let producer = queue.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            producer.push("late", 0).await.unwrap();
        });

        let claimed = queue
            .claim_item(Some(Duration::from_secs(5)))
            .await
            .unwrap();
        assert_eq!(claimed.unwrap().body, b"late");
    }

    #[tokio::test]
    async fn shut_down_queue_refuses_work() {
        let queue = MemoryQueue::new("test");
        queue.shutdown().await.unwrap();
        assert!(queue.is_closed());
        assert!(matches!(
            queue.claim_item(None).await.unwrap_err(),
            BurrowError::Runtime(_)
        ));
    }
}
