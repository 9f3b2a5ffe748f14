//! Closed value model for outbound request bodies.

use serde_json::Value as JsonValue;

/// A structured request body.
///
/// Maps keep insertion order so scan results follow the order keys were
/// written in.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Parse a JSON body.
    ///
    /// Fails on anything that is not JSON, and on documents nested deeper
    /// than serde_json's recursion limit (128).
    pub fn parse_json(text: &str) -> Result<Value, serde_json::Error> {
        serde_json::from_str::<JsonValue>(text).map(Value::from)
    }

    /// Convenience constructor for a map from borrowed keys.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_key_order() {
        let value = Value::from(json!({"zeta": 1, "alpha": [true, null], "mid": "x"}));
        let Value::Map(entries) = value else {
            panic!("expected a map");
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            entries[1].1,
            Value::List(vec![Value::Bool(true), Value::Null])
        );
    }

    #[test]
    fn test_parse_json_rejects_non_json() {
        assert!(Value::parse_json("name=Ada").is_err());
        assert_eq!(Value::parse_json("3").unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_parse_json_refuses_excessive_nesting() {
        let deep = format!("{}1{}", "[".repeat(200), "]".repeat(200));
        assert!(Value::parse_json(&deep).is_err());

        let shallow = format!("{}1{}", "[".repeat(50), "]".repeat(50));
        assert!(Value::parse_json(&shallow).is_ok());
    }
}
