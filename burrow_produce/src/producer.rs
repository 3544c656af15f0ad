use crate::ItemPlan;
use burrow_core::*;
use tracing::info;

/// Interface for submitting items to Burrow queues
pub struct Producer {
    queue: RedisQueue,
}

impl Producer {
    pub fn with_context(context: Context) -> Self {
        Self {
            queue: RedisQueue::with_context(context),
        }
    }

    /// Submit a new item to the queue
    pub async fn submit_item(&self, item_plan: ItemPlan) -> Result<String> {
        let item = self
            .queue
            .push(&item_plan.id, &item_plan.body, item_plan.priority)
            .await?;

        info!(
            item_id = %item.id,
            queue = %self.queue.name(),
            priority = %item.priority,
            "Item sent to queue"
        );

        Ok(item.id)
    }

    /// Remove an item from every set and delete its data
    pub async fn clean_item(&self, item_id: &str) -> Result<bool> {
        let context = self.queue.context();
        let mut conn = context.get_connection().await?;
        let keys = context.keys();

        #[rustfmt::skip]
        let (item_deleted,): (u32,) = redis::pipe()
            .zrem(keys.queued_set(), item_id).ignore()
            .zrem(keys.claimed_set(), item_id).ignore()
            .zrem(keys.rejected_set(), item_id).ignore()
            .del(keys.item_hash(item_id))
            .query_async(&mut conn)
            .await?;

        Ok(item_deleted > 0)
    }

    /// Drop the whole queue, returning how many items were removed
    pub async fn delete_queue(&self) -> Result<usize> {
        let removed = self.queue.delete_queue().await?;
        info!(queue = %self.queue.name(), removed, "Queue deleted");
        Ok(removed)
    }
}
