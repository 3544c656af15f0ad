use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// All the possible states that a queue item can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    /// The item is waiting to be claimed.
    Queued,
    /// The item has been claimed and is being processed by a consumer.
    Claimed,
    /// The item was rejected without redelivery and is kept as a dead letter.
    Rejected,
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            ItemStatus::Queued => "queued",
            ItemStatus::Claimed => "claimed",
            ItemStatus::Rejected => "rejected",
        };
        write!(f, "{}", str)
    }
}

impl FromStr for ItemStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(ItemStatus::Queued),
            "claimed" => Ok(ItemStatus::Claimed),
            "rejected" => Ok(ItemStatus::Rejected),
            _ => Err(format!("Unknown item status: {}", s)),
        }
    }
}
