//! Per-request routing context supplied by the driver.
//!
//! The driver sends a string-keyed map of values along with the routing
//! table request. Values keep their wire type so that the plugin can tell a
//! missing entry from an explicit null or a value of the wrong type.

use std::collections::BTreeMap;

use serde::Serialize;

/// Key under which drivers declare the address they connected to.
pub const ADDRESS_CONTEXT_KEY: &str = "address";

/// A single value in the routing context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    /// Explicit "no value" marker (null on the wire).
    NoValue,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<ContextValue>),
    Map(BTreeMap<String, ContextValue>),
}

impl ContextValue {
    /// Wire type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ContextValue::NoValue => "NoValue",
            ContextValue::Boolean(_) => "Boolean",
            ContextValue::Integer(_) => "Integer",
            ContextValue::Float(_) => "Float",
            ContextValue::Text(_) => "Text",
            ContextValue::List(_) => "List",
            ContextValue::Map(_) => "Map",
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Text(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Integer(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Boolean(value)
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ContextValue::NoValue,
            Value::Bool(b) => ContextValue::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ContextValue::Integer(i),
                None => ContextValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ContextValue::Text(s),
            Value::Array(items) => ContextValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                ContextValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Routing context map for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoutingContext {
    entries: BTreeMap<String, ContextValue>,
}

impl RoutingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build from a JSON object. Returns `None` for any other JSON value.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(map) => Some(Self {
                entries: map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_wire_types() {
        let ctx = RoutingContext::from_json(json!({
            "address": "10.0.0.5:7687",
            "policy": null,
            "port": 7687,
            "weight": 0.5,
            "tags": ["a", "b"],
        }))
        .unwrap();

        assert_eq!(ctx.len(), 5);
        assert_eq!(ctx.get(ADDRESS_CONTEXT_KEY), Some(&ContextValue::from("10.0.0.5:7687")));
        assert_eq!(ctx.get("policy"), Some(&ContextValue::NoValue));
        assert_eq!(ctx.get("port").map(ContextValue::type_name), Some("Integer"));
        assert_eq!(ctx.get("weight").map(ContextValue::type_name), Some("Float"));
        assert_eq!(ctx.get("tags").map(ContextValue::type_name), Some("List"));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn test_from_json_requires_object() {
        assert!(RoutingContext::from_json(json!("address")).is_none());
        assert!(RoutingContext::from_json(json!({})).unwrap().is_empty());
    }
}
