//! Property map serialization.
//!
//! Resources travel as JSON objects. The data store only deals in
//! [`PropertyMap`]s and leaves the text format to a [`Serializer`].

use crate::error::{SdkError, SdkResult};
use serde_json::{Map, Value};

/// Field name to value mapping backing a resource.
pub type PropertyMap = Map<String, Value>;

/// Converts property maps to and from wire text.
pub trait Serializer: Send + Sync {
    fn serialize(&self, properties: &PropertyMap) -> SdkResult<String>;

    /// Decode `text` into a property map.
    ///
    /// Blank input decodes to an empty map.
    fn deserialize(&self, text: &str) -> SdkResult<PropertyMap>;
}

/// `serde_json` backed serializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, properties: &PropertyMap) -> SdkResult<String> {
        Ok(serde_json::to_string(properties)?)
    }

    fn deserialize(&self, text: &str) -> SdkResult<PropertyMap> {
        if text.trim().is_empty() {
            return Ok(PropertyMap::new());
        }
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(map),
            other => Err(SdkError::invalid_resource(format!(
                "Expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
