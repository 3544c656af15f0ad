use crate::{Context, Result};
use deadpool_redis::{Config, Pool, Runtime};

/// Central Redis connection pool that manages access to all queues
///
/// A forum is an explicitly owned handle: create one per consumer (or per
/// group of cooperating producers) and pass it in. Clones share the pool.
#[derive(Clone)]
pub struct Forum {
    redis_pool: Pool,
}

impl Forum {
    /// Create a new forum with the specified Redis URL
    pub fn new(redis_url: &str) -> Result<Self> {
        let redis_pool = Config::from_url(redis_url).create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { redis_pool })
    }

    /// Create a forum with the Redis URL from environment
    pub fn try_from_env() -> Result<Self> {
        let redis_url = crate::util::get_redis_url();
        Self::new(&redis_url)
    }

    /// Create a context for a specific queue
    pub fn queue(&self, queue: &str) -> Context {
        Context::new(self.clone(), queue)
    }

    /// Get a reference to the underlying Redis pool
    pub(crate) fn redis_pool(&self) -> &Pool {
        &self.redis_pool
    }

    /// Close the pool; pending and future connection requests fail
    pub fn close(&self) {
        self.redis_pool.close();
    }

    pub fn is_closed(&self) -> bool {
        self.redis_pool.is_closed()
    }
}
