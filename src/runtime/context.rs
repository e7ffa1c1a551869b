//! Per-run execution context.

use serde_json::{Value, json};

use crate::utils;

/// Data available to condition and action nodes during one run.
///
/// Built once from the trigger payload and read-only during traversal. The
/// trigger payload fields (`product`, `store`, `movement`, `user`,
/// `variables`) are mapped directly; the full payload is also retained under
/// `trigger.data` for alias fallbacks.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    root: Value,
}

impl ExecutionContext {
    pub fn build(trigger_data: &Value) -> Self {
        let kind = trigger_data.pointer("/trigger/type").and_then(Value::as_str).unwrap_or_default();
        // The trigger's own payload when the envelope carries one, the
        // whole envelope otherwise.
        let data = trigger_data.pointer("/trigger/data").cloned().unwrap_or(trigger_data.clone());

        let mut root = json!({
            "trigger": {
                "type": kind,
                "data": data,
                "timestamp": utils::time::time_millis(),
            },
            "variables": trigger_data.get("variables").cloned().unwrap_or(json!({})),
        });

        for field in ["product", "store", "movement", "user"] {
            if let Some(value) = trigger_data.get(field) {
                root[field] = value.clone();
            }
        }

        Self {
            root,
        }
    }

    /// Resolve a dotted path against the context, `None` when any segment
    /// is missing.
    pub fn lookup(
        &self,
        path: &str,
    ) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current)
    }

    pub fn trigger_kind(&self) -> &str {
        self.root.pointer("/trigger/type").and_then(Value::as_str).unwrap_or_default()
    }

    /// The trigger payload the run was started with.
    pub fn trigger_data(&self) -> &Value {
        self.root.pointer("/trigger/data").unwrap_or(&Value::Null)
    }

    /// Full context snapshot, used as notification payload.
    pub fn snapshot(&self) -> Value {
        self.root.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement_payload() -> Value {
        json!({
            "trigger": {"type": "movement_created"},
            "product": {"id": "p1", "name": "Widget", "stock": 5},
            "store": {"id": "s1"},
            "movement": {"type": "OUT", "quantity": 2},
            "variables": {"note": "restock"}
        })
    }

    #[test]
    fn test_build_maps_fields() {
        let ctx = ExecutionContext::build(&movement_payload());
        assert_eq!(ctx.trigger_kind(), "movement_created");
        assert_eq!(ctx.lookup("product.name"), Some(&json!("Widget")));
        assert_eq!(ctx.lookup("store.id"), Some(&json!("s1")));
        assert_eq!(ctx.lookup("variables.note"), Some(&json!("restock")));
    }

    #[test]
    fn test_lookup_missing_segment() {
        let ctx = ExecutionContext::build(&movement_payload());
        assert_eq!(ctx.lookup("product.missing"), None);
        assert_eq!(ctx.lookup("nothing.at.all"), None);
    }

    #[test]
    fn test_trigger_data_retains_payload() {
        let payload = movement_payload();
        let ctx = ExecutionContext::build(&payload);
        assert_eq!(ctx.trigger_data(), &payload);
        assert_eq!(ctx.lookup("trigger.data.movement.quantity"), Some(&json!(2)));
    }

    #[test]
    fn test_trigger_data_prefers_nested_payload() {
        let ctx = ExecutionContext::build(&json!({
            "trigger": {"type": "movement_created", "data": {"movement": {"id": "m1"}}}
        }));
        assert_eq!(ctx.trigger_data(), &json!({"movement": {"id": "m1"}}));
        assert_eq!(ctx.lookup("movement"), None);
    }

    #[test]
    fn test_build_without_optional_entities() {
        let ctx = ExecutionContext::build(&json!({"trigger": {"type": "stock_change"}}));
        assert_eq!(ctx.trigger_kind(), "stock_change");
        assert_eq!(ctx.lookup("product"), None);
        assert_eq!(ctx.lookup("variables"), Some(&json!({})));
    }
}
