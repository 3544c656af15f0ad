//! `burrow_core` provides shared pieces for the Burrow consumer runtime.
//!
//! This crate includes the queue contract consumers talk to, its Redis and
//! in-memory implementations, connection handles, Redis key management,
//! error types and small utilities shared across the Burrow components.

mod context;
mod error;
mod forum;
mod inspector;
mod item;
mod item_status;
mod keys;
mod memory_queue;
mod queue;
mod redis_queue;
mod util;

pub use context::Context;
pub use error::{BurrowError, Result};
pub use forum::Forum;
pub use inspector::{Inspector, ItemFilter, MapStatusToItemId};
pub use item::QueueItem;
pub use item_status::ItemStatus;
pub use keys::Keys;
pub use memory_queue::{MemoryQueue, QueueEvent};
pub use queue::Queue;
pub use redis_queue::RedisQueue;
pub use util::{DEFAULT_REDIS_URL, current_timestamp_ms, generate_item_id, get_redis_url};

pub mod prelude {
    pub use crate::{
        BurrowError, Context, Forum, Inspector, ItemStatus, MemoryQueue, Queue, QueueItem,
        RedisQueue,
    };
}
