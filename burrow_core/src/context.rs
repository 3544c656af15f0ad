use crate::{Forum, Keys, Result};

/// One queue's view of a [`Forum`]
///
/// Every producer, consumer and inspector owns its own context; nothing is
/// shared through globals. The queue name scopes all Redis keys the holder
/// touches. Contexts cloned from the same forum draw from one connection
/// pool, so closing that forum ends every one of them.
#[derive(Clone)]
pub struct Context {
    forum: Forum,
    queue: String,
    keys: Keys,
}

impl Context {
    pub fn new(forum: Forum, queue: impl ToString) -> Self {
        Self {
            forum,
            queue: queue.to_string(),
            keys: Keys::with_queue(queue),
        }
    }

    /// Context over a fresh forum pointed at `BURROW_REDIS_URL` or `REDIS_URL`
    pub fn try_from_env(queue: impl ToString) -> Result<Self> {
        let forum = Forum::try_from_env()?;
        Ok(Self::new(forum, queue))
    }

    /// Check a connection out of the pool for a single queue operation
    ///
    /// The connection goes back to the pool when dropped; fails once the
    /// forum is closed.
    pub async fn get_connection(&self) -> Result<deadpool_redis::Connection> {
        Ok(self.forum.redis_pool().get().await?)
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    pub fn forum(&self) -> &Forum {
        &self.forum
    }

    /// Same pool, different queue
    pub fn clone_for_queue(&self, queue: impl ToString) -> Self {
        Self::new(self.forum.clone(), queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BurrowError;

    #[tokio::test]
    async fn contexts_for_other_queues_share_the_pool() {
        let orders = Forum::new("redis://127.0.0.1:6379").unwrap().queue("orders");
        let invoices = orders.clone_for_queue("invoices");

        assert_eq!(invoices.queue(), "invoices");
        assert_eq!(invoices.keys().queued_set(), "burrow:{invoices}:queued");
        assert_eq!(orders.keys().queued_set(), "burrow:{orders}:queued");

        orders.forum().close();
        assert!(invoices.forum().is_closed());
        let err = invoices.get_connection().await.err().expect("pool should be closed");
        assert!(matches!(err, BurrowError::Pool(_)));
        assert!(err.into_transport().is_transport());
    }
}
