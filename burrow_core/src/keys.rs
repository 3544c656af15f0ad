/// Redis key generator for Burrow components
#[derive(Debug, Clone)]
pub struct Keys {
    prefix: String,
    queue: String,
}

impl Keys {
    /// Create a new Redis key generator with the default "burrow" prefix over the given queue
    pub fn with_queue(queue: impl ToString) -> Self {
        Self {
            prefix: "burrow".to_string(),
            queue: queue.to_string(),
        }
    }

    /// Redis key for the hash that holds item body and bookkeeping
    pub fn item_hash(&self, item_id: &str) -> String {
        format!("{}:{{{}}}:item:{}", self.prefix, self.queue, item_id)
    }

    /// Redis key for the sorted set that holds waiting items with priority as scores
    pub fn queued_set(&self) -> String {
        format!("{}:{{{}}}:queued", self.prefix, self.queue)
    }

    /// Redis key for the sorted set that holds in-flight items with claim timestamps as scores
    pub fn claimed_set(&self) -> String {
        format!("{}:{{{}}}:claimed", self.prefix, self.queue)
    }

    /// Redis key for the sorted set that holds dead-lettered items with rejection timestamps as scores
    pub fn rejected_set(&self) -> String {
        format!("{}:{{{}}}:rejected", self.prefix, self.queue)
    }
}
