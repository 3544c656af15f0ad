use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use ulid::{Generator, Ulid};

static ID_GENERATOR: Mutex<Generator> = Mutex::new(Generator::new());

/// Redis URL used when neither `BURROW_REDIS_URL` nor `REDIS_URL` is set
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Generate a new ULID for a queue item
///
/// Ids are monotonic within the process so items of equal priority keep
/// their submission order in the sorted sets.
pub fn generate_item_id() -> String {
    let next = ID_GENERATOR
        .lock()
        .ok()
        .and_then(|mut generator| generator.generate().ok());
    next.unwrap_or_else(Ulid::new).to_string()
}

/// Get current timestamp in milliseconds since UNIX epoch
pub fn current_timestamp_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// A standardized way to read BURROW_REDIS_URL env var with REDIS_URL as fallback
pub fn get_redis_url() -> String {
    std::env::var("BURROW_REDIS_URL")
        .or_else(|_| std::env::var("REDIS_URL"))
        .unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_ids_sort_in_creation_order() {
        let ids: Vec<String> = (0..100).map(|_| generate_item_id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
