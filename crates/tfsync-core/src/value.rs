//! Attribute data model
//!
//! Values are tree shaped and come from decoded JSON state documents, so
//! there are no cycles. Object keys keep their insertion order.

use indexmap::IndexMap;
use serde_json::Value;

/// Attribute value tagged by shape
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<AttributeValue>),
    Map(IndexMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Short shape name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Null => "null",
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Int(_) => "int",
            AttributeValue::Float(_) => "float",
            AttributeValue::String(_) => "string",
            AttributeValue::List(_) => "list",
            AttributeValue::Map(_) => "map",
        }
    }

    /// The emptiness rule applied at every nesting level.
    ///
    /// A list is non-empty when it has items; anything else is non-empty
    /// unless it is null or the empty string. Empty maps, `false` and `0`
    /// all count as non-empty here.
    pub fn is_non_empty(&self) -> bool {
        match self {
            AttributeValue::List(items) => !items.is_empty(),
            AttributeValue::Null => false,
            AttributeValue::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, AttributeValue>> {
        match self {
            AttributeValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Int(i),
                // u64 beyond i64::MAX lands here as well
                None => AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => AttributeValue::String(s),
            Value::Array(items) => {
                AttributeValue::List(items.into_iter().map(AttributeValue::from).collect())
            }
            Value::Object(map) => AttributeValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, AttributeValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Int(i)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Float(f)
    }
}

/// A named attribute, built fresh for each sync pass and never mutated
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_key_order() {
        let value = AttributeValue::from(json!({"zeta": 1, "alpha": 2, "mid": 3}));
        let keys: Vec<&str> = value
            .as_map()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(AttributeValue::from(json!(10)), AttributeValue::Int(10));
        assert_eq!(AttributeValue::from(json!(-3)), AttributeValue::Int(-3));
        assert_eq!(AttributeValue::from(json!(1.5)), AttributeValue::Float(1.5));
        assert_eq!(
            AttributeValue::from(json!(u64::MAX)),
            AttributeValue::Float(u64::MAX as f64)
        );
    }

    #[test]
    fn test_non_empty_predicate() {
        assert!(!AttributeValue::Null.is_non_empty());
        assert!(!AttributeValue::from("").is_non_empty());
        assert!(!AttributeValue::List(vec![]).is_non_empty());

        assert!(AttributeValue::from(false).is_non_empty());
        assert!(AttributeValue::from(0i64).is_non_empty());
        assert!(AttributeValue::Map(IndexMap::new()).is_non_empty());
        assert!(AttributeValue::List(vec![AttributeValue::Null]).is_non_empty());
    }
}
