#![allow(dead_code)]

use burrow_core::{Context, Forum, MemoryQueue, QueueItem, generate_item_id, get_redis_url};
use serde_json::Value;

/// Context for a queue no other test run touches
pub fn create_test_context(prefix: &str) -> Context {
    let queue = format!("{}_{}", prefix, generate_item_id());
    Forum::new(&get_redis_url())
        .expect("Failed to create Redis pool")
        .queue(&queue)
}

pub async fn push_json(queue: &MemoryQueue, value: Value) -> QueueItem {
    let body = serde_json::to_vec(&value).expect("Failed to encode test payload");
    queue.push(body, 0).await.expect("Failed to push test item")
}

pub fn decode_bodies(bodies: Vec<Vec<u8>>) -> Vec<Value> {
    bodies
        .iter()
        .map(|body| serde_json::from_slice(body).expect("Queued body is not JSON"))
        .collect()
}
