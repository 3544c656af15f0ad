use crate::Producer;
use burrow_core::*;
use serde::Serialize;

/// Item plan represents **a description** of work to be queued soon and, _hopefully_, processed
#[derive(Debug, Clone)]
pub struct ItemPlan {
    /// ULID identifier for the item
    pub id: String,

    /// The encoded body
    pub body: Vec<u8>,

    /// Priority of the item; lower values are claimed first
    pub priority: i64,
}

impl ItemPlan {
    /// Create a new item plan with the given payload encoded as JSON
    pub fn new<T: Serialize>(payload: T) -> Result<Self> {
        let body = serde_json::to_vec(&payload)?;
        Ok(Self::from_bytes(body))
    }

    /// Create a new item plan with an already encoded body
    pub fn from_bytes(body: impl Into<Vec<u8>>) -> Self {
        Self {
            id: generate_item_id(),
            body: body.into(),
            priority: 0,
        }
    }

    /// Set the priority; lower values are claimed first
    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Submit this plan through the given producer, returning the item id
    pub async fn submit(self, producer: &Producer) -> Result<String> {
        producer.submit_item(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_encodes_payload_as_json() {
        let plan = ItemPlan::new(json!({"to": "me@example.com"})).unwrap();
        assert_eq!(plan.body, br#"{"to":"me@example.com"}"#);
        assert_eq!(plan.priority, 0);
    }

    #[test]
    fn plans_get_unique_ids() {
        let a = ItemPlan::from_bytes("a").priority(-1);
        let b = ItemPlan::from_bytes("b");
        assert_ne!(a.id, b.id);
        assert_eq!(a.priority, -1);
    }
}
