use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const BODY_FIELD: &str = "body";
pub const RAW_BODY_FIELD: &str = "rawBody";

/// Gateway request descriptor exactly as the runtime delivered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InboundEvent(Value);

impl InboundEvent {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn body(&self) -> Option<&Value> {
        self.0.get(BODY_FIELD)
    }

    /// Derives the document to store. Never fails: an unparsable body falls
    /// back to [`Payload::RawWithContext`] so nothing received is dropped.
    pub fn into_payload(self) -> Payload {
        let fields = match self.0 {
            Value::Object(fields) => fields,
            other => return Payload::Event(other),
        };

        let body_text = match fields.get(BODY_FIELD) {
            Some(Value::String(text)) if !text.is_empty() => text.clone(),
            Some(body @ (Value::Object(_) | Value::Array(_))) => {
                return Payload::Parsed(body.clone())
            }
            _ => return Payload::Event(Value::Object(fields)),
        };

        match serde_json::from_str(&body_text) {
            Ok(parsed) => Payload::Parsed(parsed),
            Err(_) => Payload::RawWithContext {
                raw_body: body_text,
                event: fields,
            },
        }
    }
}

impl From<Value> for InboundEvent {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Parsed(Value),
    /// Serialized as `rawBody` followed by every event field; an event field
    /// named `rawBody` takes precedence.
    RawWithContext {
        raw_body: String,
        event: Map<String, Value>,
    },
    Event(Value),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parsed(_) => "parsed",
            Self::RawWithContext { .. } => "raw_with_context",
            Self::Event(_) => "event",
        }
    }

    pub fn to_pretty_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Parsed(value) | Self::Event(value) => value.serialize(serializer),
            Self::RawWithContext { raw_body, event } => {
                let shadowed = event.contains_key(RAW_BODY_FIELD);
                let mut map =
                    serializer.serialize_map(Some(event.len() + usize::from(!shadowed)))?;
                if !shadowed {
                    map.serialize_entry(RAW_BODY_FIELD, raw_body)?;
                }
                for (key, value) in event {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}
