//! Pub/sub transport abstractions.
//!
//! Implementations wrap whatever remote substrate actually moves messages;
//! the bridge only needs per-stream subscription and an asynchronous send.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// A message body moving through a stream in either direction.
///
/// Free-form chat text stays [`Payload::Text`]; values routed through the
/// `/obj` command travel as [`Payload::Object`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Object(Value),
}

/// One delivered pub/sub event, tagged with the stream it arrived on.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub stream: String,
    pub payload: Payload,
}

/// Transport contract required by the bridge.
///
/// `subscribe` is called once per configured stream at construction time and
/// must deliver every subsequent event for that stream into the given queue,
/// in arrival order. `publish` is a plain asynchronous send; delivery
/// guarantees are whatever the underlying substrate provides.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    fn subscribe(
        &self,
        stream: &str,
        events: mpsc::UnboundedSender<InboundEvent>,
    ) -> Result<(), String>;

    async fn publish(&self, stream: &str, payload: Payload) -> Result<(), String>;
}

impl Payload {
    pub fn text(value: impl Into<String>) -> Self {
        Payload::Text(value.into())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Payload::Text(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_serializes_untagged() {
        let text = serde_json::to_string(&Payload::text("hello")).unwrap();
        assert_eq!(text, r#""hello""#);

        let object = serde_json::to_string(&Payload::Object(json!({"x": 1}))).unwrap();
        assert_eq!(object, r#"{"x":1}"#);
    }

    #[test]
    fn payload_deserializes_strings_as_text() {
        let payload: Payload = serde_json::from_str(r#""hi there""#).unwrap();
        assert_eq!(payload, Payload::text("hi there"));
        assert!(payload.is_text());
    }

    #[test]
    fn payload_deserializes_objects_as_values() {
        let payload: Payload = serde_json::from_str(r#"{"a":2}"#).unwrap();
        assert_eq!(payload, Payload::Object(json!({"a": 2})));
        assert!(!payload.is_text());
    }
}
