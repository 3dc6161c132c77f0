//! The `{"data": ...}` wrapper Nexus puts around staging payloads.
//!
//! Requests are always wrapped. Responses are unwrapped when the top-level
//! object carries a `data` key and decoded as-is otherwise, since some
//! endpoints and proxies return the bare payload.

use serde::de::DeserializeOwned;
use serde::Serialize;

const DATA_KEY: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Decode a response body, stripping the envelope when present.
pub fn unwrap_json<T: DeserializeOwned>(body: &[u8]) -> serde_json::Result<T> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    let payload = match value {
        serde_json::Value::Object(mut map) if map.contains_key(DATA_KEY) => map
            .remove(DATA_KEY)
            .unwrap_or(serde_json::Value::Null),
        other => other,
    };
    serde_json::from_value(payload)
}
