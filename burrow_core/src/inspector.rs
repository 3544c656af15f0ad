//! Provides functionality to query items and counts in Burrow queues.

use redis::AsyncCommands;
use std::collections::HashMap;

use crate::{BurrowError, Context, ItemStatus, QueueItem, Result};

/// Interface for querying queue contents
pub struct Inspector {
    context: Context,
}

impl Inspector {
    pub fn with_context(context: Context) -> Self {
        Self { context }
    }

    /// Number of items waiting to be claimed; an unnamed queue has none
    pub async fn count(&self) -> Result<u64> {
        if self.context.queue().is_empty() {
            return Ok(0);
        }

        let mut conn = self.context.get_connection().await?;
        let count: u64 = conn.zcard(self.context.keys().queued_set()).await?;
        Ok(count)
    }

    pub async fn item_exists(&self, item_id: &str) -> Result<bool> {
        let mut conn = self.context.get_connection().await?;
        let keys = self.context.keys();

        let exists: bool = conn.exists(keys.item_hash(item_id)).await?;

        Ok(exists)
    }

    pub async fn get_item_status(&self, item_id: &str) -> Result<ItemStatus> {
        let mut conn = self.context.get_connection().await?;
        let keys = self.context.keys();

        #[rustfmt::skip]
        let (exists, claimed, queued, rejected): (bool, Option<f64>, Option<f64>, Option<f64>) =
            redis::pipe()
                .exists(keys.item_hash(item_id))
                .zscore(keys.claimed_set(), item_id)
                .zscore(keys.queued_set(), item_id)
                .zscore(keys.rejected_set(), item_id)
                .query_async(&mut conn)
                .await?;

        if !exists {
            return Err(BurrowError::ItemNotFound(item_id.to_string()));
        }
        if claimed.is_some() {
            return Ok(ItemStatus::Claimed);
        }
        if queued.is_some() {
            return Ok(ItemStatus::Queued);
        }
        if rejected.is_some() {
            return Ok(ItemStatus::Rejected);
        }

        // popped, the claim is still being recorded or is being put back
        Ok(ItemStatus::Claimed)
    }

    pub async fn get_item(&self, item_id: &str) -> Result<QueueItem> {
        let mut conn = self.context.get_connection().await?;
        let item_key = self.context.keys().item_hash(item_id);

        let hash: HashMap<String, Vec<u8>> = conn.hgetall(&item_key).await?;
        if hash.is_empty() {
            return Err(BurrowError::ItemNotFound(item_id.to_string()));
        }
        QueueItem::from_hash(hash)
    }

    /// Get item ids grouped by status, optionally filtered by criteria in ItemFilter.
    pub async fn get_status_to_item_ids(&self, filter: ItemFilter) -> Result<MapStatusToItemId> {
        let keys = self.context.keys();

        let states_to_fetch = match filter.states.as_deref() {
            Some(specific_states) => specific_states,
            None => &[ItemStatus::Queued, ItemStatus::Claimed, ItemStatus::Rejected],
        };

        let mut map = MapStatusToItemId::default();
        if states_to_fetch.is_empty() {
            return Ok(map);
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for status in states_to_fetch {
            match status {
                ItemStatus::Queued => pipe.zrange(keys.queued_set(), 0, -1),
                ItemStatus::Claimed => pipe.zrange(keys.claimed_set(), 0, -1),
                ItemStatus::Rejected => pipe.zrange(keys.rejected_set(), 0, -1),
            };
        }

        let mut conn = self.context.get_connection().await?;
        let result: Vec<Vec<String>> = pipe.query_async(&mut conn).await?;

        for (status, ids) in states_to_fetch.iter().zip(result) {
            match status {
                ItemStatus::Queued => map.queued = ids,
                ItemStatus::Claimed => map.claimed = ids,
                ItemStatus::Rejected => map.rejected = ids,
            }
        }

        Ok(map)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Optional list of item states to filter by, None disables this filter
    pub states: Option<Vec<ItemStatus>>,
}

#[derive(Debug, Clone, Default)]
pub struct MapStatusToItemId {
    /// Items waiting to be claimed, in claim order
    pub queued: Vec<String>,
    /// Items currently held by consumers
    pub claimed: Vec<String>,
    /// Items rejected without redelivery
    pub rejected: Vec<String>,
}
