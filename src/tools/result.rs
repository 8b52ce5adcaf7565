//! Structured payload returned by every tool handler.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Outcome of a tool invocation.
///
/// Always carries an explicit `sucesso` flag, serialized as the first field,
/// followed by the handler's own fields in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    sucesso: bool,
    fields: Map<String, Value>,
}

impl ToolResult {
    /// A successful result carrying the entries of the `fields` object.
    /// Anything other than an object contributes no fields.
    pub fn success(fields: Value) -> Self {
        let mut fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.remove("sucesso");
        Self {
            sucesso: true,
            fields,
        }
    }

    /// A failed result with a human-readable error.
    pub fn failure(erro: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("erro".to_string(), Value::String(erro.into()));
        Self {
            sucesso: false,
            fields,
        }
    }

    /// Add or replace a field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if key != "sucesso" {
            self.fields.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.sucesso
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The error message of a failed result.
    pub fn error(&self) -> Option<&str> {
        self.get("erro").and_then(Value::as_str)
    }

    /// Pretty-printed JSON; non-ASCII characters are kept literally.
    pub fn to_text(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|_| "internal serialization error".to_string())
    }
}

impl Serialize for ToolResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("sucesso", &self.sucesso)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
