//! The `{"type": ..., "value": ...}` wrapper.

use serde::Serialize;
use serde_json::{Map, Value};

/// A value tagged with the simple name of its original type.
///
/// `type` always precedes `value` in the emitted object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub value: Value,
}

impl Envelope {
    pub fn new(type_name: &'static str, value: impl Into<Value>) -> Self {
        Self {
            type_name,
            value: value.into(),
        }
    }

    pub fn into_value(self) -> Value {
        let mut object = Map::with_capacity(2);
        object.insert("type".to_string(), Value::from(self.type_name));
        object.insert("value".to_string(), self.value);
        Value::Object(object)
    }
}

impl From<Envelope> for Value {
    fn from(envelope: Envelope) -> Self {
        envelope.into_value()
    }
}
