//! JSON variable bag shared between actions and execution state.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Ordered key-value bag backed by a JSON object.
///
/// Used for action results, trigger payload variables and notification
/// payloads. Values are stored as raw JSON so heterogeneous data can be
/// carried without a dedicated type per producer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Vars(Map<String, Value>);

impl Vars {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with<T: Serialize>(
        mut self,
        key: &str,
        value: T,
    ) -> Self {
        self.set(key, value);
        self
    }

    pub fn set<T: Serialize>(
        &mut self,
        key: &str,
        value: T,
    ) {
        if let Ok(v) = serde_json::to_value(value) {
            self.0.insert(key.to_string(), v);
        }
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Option<T> {
        self.0.get(key).cloned().and_then(|v| serde_json::from_value(v).ok())
    }

    pub fn insert(
        &mut self,
        key: String,
        value: Value,
    ) {
        self.0.insert(key, value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Value> for Vars {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }
}

impl From<Vars> for Value {
    fn from(vars: Vars) -> Self {
        Value::Object(vars.0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut vars = Vars::new();
        vars.set("count", 3);
        vars.set("name", "widget");

        assert_eq!(vars.get::<i64>("count"), Some(3));
        assert_eq!(vars.get::<String>("name"), Some("widget".to_string()));
        assert_eq!(vars.get::<String>("missing"), None);
    }

    #[test]
    fn test_with_builder() {
        let vars = Vars::new().with("a", 1).with("b", true);
        assert_eq!(vars.get::<i64>("a"), Some(1));
        assert_eq!(vars.get::<bool>("b"), Some(true));
    }

    #[test]
    fn test_from_value_roundtrip() {
        let vars = Vars::from(json!({"x": [1, 2]}));
        let value: Value = vars.into();
        assert_eq!(value, json!({"x": [1, 2]}));
    }

    #[test]
    fn test_from_non_object_is_empty() {
        let vars = Vars::from(json!([1, 2]));
        assert!(vars.is_empty());
    }
}
