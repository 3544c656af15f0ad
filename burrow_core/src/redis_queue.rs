use crate::{Context, Queue, QueueItem, Result, current_timestamp_ms, generate_item_id};
use redis::AsyncCommands;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Queue stored in Redis sorted sets, one hash per item
///
/// Waiting items live in the `queued` set scored by priority; ULID member
/// names keep equal priorities in FIFO order.
#[derive(Clone)]
pub struct RedisQueue {
    context: Context,
}

impl RedisQueue {
    pub fn with_context(context: Context) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Write a new item and make it claimable
    pub async fn push(&self, item_id: &str, body: &[u8], priority: i64) -> Result<QueueItem> {
        let mut conn = self.get_connection().await?;
        let keys = self.context.keys();
        let now = current_timestamp_ms();
        let item_key = keys.item_hash(item_id);

        let _: () = redis::pipe()
            .atomic()
            .hset(&item_key, "id", item_id)
            .hset(&item_key, "body", body)
            .hset(&item_key, "priority", priority)
            .hset(&item_key, "created_at", now)
            .hset(&item_key, "release_count", 0)
            .hset(&item_key, "reject_count", 0)
            .zadd(keys.queued_set(), item_id, priority)
            .query_async(&mut conn)
            .await?;

        debug!(item_id = %item_id, queue = %self.context.queue(), priority, "Item queued");

        Ok(QueueItem {
            id: item_id.to_string(),
            body: body.to_vec(),
            priority,
            created_at: now,
            release_count: 0,
            reject_count: 0,
        })
    }

    /// Take the next id off the queued set along with its priority score
    async fn pop_next_id(
        &self,
        conn: &mut deadpool_redis::Connection,
        wait: Option<Duration>,
    ) -> Result<Option<(String, f64)>> {
        let keys = self.context.keys();

        match wait.filter(|w| !w.is_zero()) {
            Some(wait) => {
                let reply: Option<(String, String, f64)> = redis::cmd("BZPOPMIN")
                    .arg(keys.queued_set())
                    .arg(wait.as_secs_f64())
                    .query_async(conn)
                    .await?;
                Ok(reply.map(|(_, item_id, score)| (item_id, score)))
            }
            None => {
                let entries: Vec<(String, f64)> = conn.zpopmin(keys.queued_set(), 1).await?;
                Ok(entries.into_iter().next())
            }
        }
    }

    /// Load a popped item and record it as claimed
    async fn record_claim(
        &self,
        conn: &mut deadpool_redis::Connection,
        item_id: &str,
    ) -> Result<Option<QueueItem>> {
        let keys = self.context.keys();
        let now = current_timestamp_ms();
        let item_key = keys.item_hash(item_id);

        let hash: HashMap<String, Vec<u8>> = conn.hgetall(&item_key).await?;
        if hash.is_empty() {
            warn!(item_id = %item_id, queue = %self.context.queue(), "Claimed item has no data, skipping");
            return Ok(None);
        }

        let item = match QueueItem::from_hash(hash) {
            Ok(item) => item,
            Err(e) => {
                error!(item_id = %item_id, queue = %self.context.queue(), error = %e, "Claimed item is malformed, moving it aside");
                let _: () = conn.zadd(keys.rejected_set(), item_id, now).await?;
                return Ok(None);
            }
        };

        let _: () = redis::pipe()
            .atomic()
            .zadd(keys.claimed_set(), item_id, now)
            .hset(&item_key, "claimed_at", now)
            .query_async(conn)
            .await?;

        Ok(Some(item))
    }

    async fn get_connection(&self) -> Result<deadpool_redis::Connection> {
        self.context.get_connection().await
    }
}

impl Queue for RedisQueue {
    fn name(&self) -> &str {
        self.context.queue()
    }

    async fn create_queue(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn create_item(&self, body: Vec<u8>) -> Result<QueueItem> {
        self.push(&generate_item_id(), &body, 0).await
    }

    async fn claim_item(&self, wait: Option<Duration>) -> Result<Option<QueueItem>> {
        let mut conn = self.get_connection().await?;

        let Some((item_id, score)) = self.pop_next_id(&mut conn, wait).await? else {
            return Ok(None);
        };

        match self.record_claim(&mut conn, &item_id).await {
            Ok(item) => Ok(item),
            Err(e) => {
                // the id is in no set at this point, put it back where it was
                let queued = self.context.keys().queued_set();
                let restored: redis::RedisResult<()> = conn.zadd(queued, &item_id, score).await;
                match restored {
                    Ok(()) => warn!(
                        item_id = %item_id,
                        queue = %self.context.queue(),
                        error = %e,
                        "Claim failed, item returned to the queue"
                    ),
                    Err(restore_error) => error!(
                        item_id = %item_id,
                        queue = %self.context.queue(),
                        error = %e,
                        restore_error = %restore_error,
                        "Claim failed and the item could not be returned to the queue"
                    ),
                }
                Err(e)
            }
        }
    }

    async fn delete_item(&self, item: &QueueItem) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let keys = self.context.keys();

        let _: () = redis::pipe()
            .atomic()
            .zrem(keys.claimed_set(), &item.id)
            .del(keys.item_hash(&item.id))
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn release_item(&self, item: &QueueItem) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let keys = self.context.keys();
        let item_key = keys.item_hash(&item.id);

        let _: () = redis::pipe()
            .atomic()
            .zrem(keys.claimed_set(), &item.id)
            .hdel(&item_key, "claimed_at")
            .hincr(&item_key, "release_count", 1)
            .zadd(keys.queued_set(), &item.id, item.priority)
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn reject_item(&self, item: &QueueItem, requeue: bool) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let keys = self.context.keys();
        let item_key = keys.item_hash(&item.id);

        let mut pipe = redis::pipe();
        pipe.atomic()
            .zrem(keys.claimed_set(), &item.id)
            .hincr(&item_key, "reject_count", 1);
        if requeue {
            pipe.hdel(&item_key, "claimed_at")
                .zadd(keys.queued_set(), &item.id, item.priority);
        } else {
            pipe.zadd(keys.rejected_set(), &item.id, current_timestamp_ms());
        }
        let _: () = pipe.query_async(&mut conn).await?;

        Ok(())
    }

    async fn number_of_items(&self) -> Result<u64> {
        let mut conn = self.get_connection().await?;
        let count: u64 = conn.zcard(self.context.keys().queued_set()).await?;
        Ok(count)
    }

    async fn delete_queue(&self) -> Result<usize> {
        let mut conn = self.get_connection().await?;
        let keys = self.context.keys();

        #[rustfmt::skip]
        let (queued, claimed, rejected): (Vec<String>, Vec<String>, Vec<String>) = redis::pipe()
            .zrange(keys.queued_set(), 0, -1)
            .zrange(keys.claimed_set(), 0, -1)
            .zrange(keys.rejected_set(), 0, -1)
            .query_async(&mut conn)
            .await?;

        let item_ids: Vec<String> = queued.into_iter().chain(claimed).chain(rejected).collect();

        let mut pipe = redis::pipe();
        pipe.atomic();
        for item_id in &item_ids {
            pipe.del(keys.item_hash(item_id)).ignore();
        }
        pipe.del(keys.queued_set()).ignore()
            .del(keys.claimed_set()).ignore()
            .del(keys.rejected_set()).ignore();
        let _: () = pipe.query_async(&mut conn).await?;

        Ok(item_ids.len())
    }

    async fn shutdown(&self) -> Result<()> {
        self.context.forum().close();
        debug!(queue = %self.context.queue(), "Connection pool closed");
        Ok(())
    }
}
