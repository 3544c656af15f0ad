use crate::error::{BurrowError, Result};
use std::collections::HashMap;

/// One unit of work as held by a queue: an opaque identity plus the raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    /// Unique identifier, used to delete, release or reject the item
    pub id: String,

    /// The undecoded payload
    pub body: Vec<u8>,

    /// Priority (lower values are claimed first)
    pub priority: i64,

    /// When the item was created; UNIX timestamp in milliseconds
    pub created_at: i64,

    /// How many times a worker asked for the item to be put back
    pub release_count: u32,

    /// How many times the item was rejected and redelivered
    pub reject_count: u32,
}

impl QueueItem {
    pub fn new(id: impl ToString, body: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.to_string(),
            body: body.into(),
            priority: 0,
            created_at: crate::current_timestamp_ms(),
            release_count: 0,
            reject_count: 0,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Convert a Redis hash into a structured queue item
    pub fn from_hash(hash: HashMap<String, Vec<u8>>) -> Result<Self> {
        let id = required_str(&hash, "id")?;
        let body = hash
            .get("body")
            .ok_or_else(|| BurrowError::InvalidItem("Missing body field".to_string()))?
            .clone();

        let priority = required_str(&hash, "priority")?
            .parse::<i64>()
            .map_err(|_| BurrowError::InvalidItem("Invalid priority".to_string()))?;

        let created_at = optional_str(&hash, "created_at")
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(0);
        let release_count = optional_str(&hash, "release_count")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);
        let reject_count = optional_str(&hash, "reject_count")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);

        Ok(Self {
            id,
            body,
            priority,
            created_at,
            release_count,
            reject_count,
        })
    }
}

fn optional_str(hash: &HashMap<String, Vec<u8>>, field: &str) -> Option<String> {
    hash.get(field)
        .and_then(|raw| std::str::from_utf8(raw).ok())
        .map(str::to_string)
}

fn required_str(hash: &HashMap<String, Vec<u8>>, field: &str) -> Result<String> {
    optional_str(hash, field)
        .ok_or_else(|| BurrowError::InvalidItem(format!("Missing {} field", field)))
}
