use std::fmt;
use std::sync::Arc;

use burrow_core::{BurrowError, Result};
use serde_json::Value;

use crate::Worker;

type DecodeFn = dyn Fn(&[u8]) -> Result<Value> + Send + Sync;

/// Turns raw item bodies into data a worker understands
#[derive(Clone)]
pub struct Decoder {
    name: String,
    decode: Arc<DecodeFn>,
}

impl Decoder {
    pub fn new<F>(name: impl ToString, decode: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            decode: Arc::new(decode),
        }
    }

    /// Bodies are JSON documents
    pub fn json() -> Self {
        Self::new("json", |body| Ok(serde_json::from_slice(body)?))
    }

    /// Bodies are UTF-8 text, handed over as a JSON string
    pub fn text() -> Self {
        Self::new("text", |body| {
            let text = std::str::from_utf8(body)
                .map_err(|e| BurrowError::InvalidItem(format!("body is not UTF-8: {}", e)))?;
            Ok(Value::String(text.to_string()))
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decode(&self, body: &[u8]) -> Result<Value> {
        (self.decode)(body)
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder").field("name", &self.name).finish()
    }
}

/// Pick the decoder for a run: one set on the consumer wins, then the
/// worker's own, then JSON.
pub fn resolve_decoder<W: Worker>(explicit: Option<&Decoder>, worker: &W) -> Decoder {
    explicit
        .cloned()
        .or_else(|| worker.decoder())
        .unwrap_or_else(Decoder::json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{WorkSummary, Workload};
    use serde_json::json;

    struct Plain;

    impl Worker for Plain {
        async fn work(&self, _workload: &Workload) -> Result<WorkSummary> {
            Ok(WorkSummary::Success)
        }
    }

    struct Texty;

    impl Worker for Texty {
        async fn work(&self, _workload: &Workload) -> Result<WorkSummary> {
            Ok(WorkSummary::Success)
        }

        fn decoder(&self) -> Option<Decoder> {
            Some(Decoder::text())
        }
    }

    #[test]
    fn json_decoder() {
        let value = Decoder::json().decode(br#"{"a":1}"#).unwrap();
        assert_eq!(value, json!({"a": 1}));
        assert!(matches!(
            Decoder::json().decode(b"{nope").unwrap_err(),
            BurrowError::Serialization(_)
        ));
    }

    #[test]
    fn text_decoder() {
        assert_eq!(Decoder::text().decode(b"hi").unwrap(), json!("hi"));
        assert!(matches!(
            Decoder::text().decode(&[0xff, 0xfe]).unwrap_err(),
            BurrowError::InvalidItem(_)
        ));
    }

    #[test]
    fn explicit_decoder_wins() {
        let custom = Decoder::new("upper", |body| {
            Ok(Value::String(String::from_utf8_lossy(body).to_uppercase()))
        });
        assert_eq!(resolve_decoder(Some(&custom), &Texty).name(), "upper");
        assert_eq!(resolve_decoder(None, &Texty).name(), "text");
        assert_eq!(resolve_decoder(None, &Plain).name(), "json");
    }
}
