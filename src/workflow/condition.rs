//! Condition evaluation against a run's context.
//!
//! A condition node holds a list of field/operator/value expressions
//! combined by a logical operator. Evaluation is pure: it reads the
//! execution context and never mutates anything.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::{Result, runtime::ExecutionContext};

/// Logical combinator over the expression results.
///
/// Unrecognized operator strings deserialize to `Unknown`, which always
/// evaluates false.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
    Unknown,
}

impl<'de> Deserialize<'de> for LogicalOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "and" => LogicalOperator::And,
            "or" => LogicalOperator::Or,
            _ => LogicalOperator::Unknown,
        })
    }
}

/// Comparison operator of one expression.
///
/// Ordering operators follow a numeric-only contract: both operands must
/// be JSON numbers, anything else compares false. Equality is structural
/// deep equality over JSON values.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOperator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "unknown")]
    Unknown,
}

impl<'de> Deserialize<'de> for CompareOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "<" => CompareOperator::Lt,
            ">" => CompareOperator::Gt,
            "<=" => CompareOperator::Le,
            ">=" => CompareOperator::Ge,
            "==" => CompareOperator::Eq,
            "!=" => CompareOperator::Ne,
            _ => CompareOperator::Unknown,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Expression {
    pub field: String,
    pub operator: CompareOperator,
    #[serde(default)]
    pub value: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConditionConfig {
    #[serde(default)]
    pub conditions: Vec<Expression>,
    #[serde(default)]
    pub logical_operator: LogicalOperator,
}

impl ConditionConfig {
    pub fn parse(params: &Value) -> Result<Self> {
        jsonschema::validate(&Self::schema(), params)?;
        let config = serde_json::from_value::<Self>(params.clone())?;
        Ok(config)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "conditions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["field", "operator"],
                        "properties": {
                            "field": { "type": "string" },
                            "operator": { "type": "string" },
                            "value": {}
                        }
                    }
                },
                "logical_operator": { "type": "string" }
            }
        })
    }
}

/// Evaluate a condition config against the context.
///
/// An empty or absent expression list is default-allow.
pub fn evaluate(
    config: &ConditionConfig,
    ctx: &ExecutionContext,
) -> bool {
    if config.conditions.is_empty() {
        return true;
    }

    let results: Vec<bool> = config.conditions.iter().map(|expr| evaluate_expression(expr, ctx)).collect();

    match config.logical_operator {
        LogicalOperator::And => results.iter().all(|r| *r),
        LogicalOperator::Or => results.iter().any(|r| *r),
        LogicalOperator::Unknown => false,
    }
}

fn evaluate_expression(
    expr: &Expression,
    ctx: &ExecutionContext,
) -> bool {
    let actual = field_value(&expr.field, ctx);

    match expr.operator {
        CompareOperator::Lt => numeric_cmp(&actual, &expr.value, |a, b| a < b),
        CompareOperator::Gt => numeric_cmp(&actual, &expr.value, |a, b| a > b),
        CompareOperator::Le => numeric_cmp(&actual, &expr.value, |a, b| a <= b),
        CompareOperator::Ge => numeric_cmp(&actual, &expr.value, |a, b| a >= b),
        CompareOperator::Eq => actual == expr.value,
        CompareOperator::Ne => actual != expr.value,
        CompareOperator::Unknown => false,
    }
}

/// Resolve a field name to its context value.
///
/// A fixed alias table takes priority; any other name is treated as a
/// dotted path into the context. Missing values resolve to JSON null.
fn field_value(
    field: &str,
    ctx: &ExecutionContext,
) -> Value {
    match field {
        "stock_quantity" => lookup(ctx, "product.stock"),
        "movement_value" => lookup(ctx, "movement.quantity"),
        "movement_type" => lookup(ctx, "movement.type"),
        "stock_percentage" => stock_percentage(ctx),
        path => lookup(ctx, path),
    }
}

fn lookup(
    ctx: &ExecutionContext,
    path: &str,
) -> Value {
    ctx.lookup(path).cloned().unwrap_or(Value::Null)
}

/// Stock level relative to the configured min/max band, in percent.
fn stock_percentage(ctx: &ExecutionContext) -> Value {
    let stock = ctx.lookup("product.stock").and_then(Value::as_f64);
    let min = ctx.lookup("product.stock_min").and_then(Value::as_f64);
    let max = ctx.lookup("product.stock_max").and_then(Value::as_f64);

    let (Some(stock), Some(min), Some(max)) = (stock, min, max) else {
        return Value::Null;
    };

    if max - min == 0.0 {
        return json!(0.0);
    }

    json!((stock - min) / (max - min) * 100.0)
}

fn numeric_cmp<F>(
    actual: &Value,
    expected: &Value,
    cmp: F,
) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(stock: i64) -> ExecutionContext {
        ExecutionContext::build(&json!({
            "trigger": {"type": "movement_created"},
            "product": {"id": "p1", "stock": stock, "stock_min": 5, "stock_max": 25},
            "movement": {"type": "OUT", "quantity": 4}
        }))
    }

    fn expr(
        field: &str,
        operator: &str,
        value: Value,
    ) -> Expression {
        serde_json::from_value(json!({"field": field, "operator": operator, "value": value})).unwrap()
    }

    #[test]
    fn test_empty_conditions_default_allow() {
        let config = ConditionConfig::default();
        assert!(evaluate(&config, &context(3)));

        let config = ConditionConfig {
            conditions: vec![],
            logical_operator: LogicalOperator::Or,
        };
        assert!(evaluate(&config, &context(3)));
    }

    #[test]
    fn test_stock_quantity_alias_boundary() {
        let config = ConditionConfig {
            conditions: vec![expr("stock_quantity", "<", json!(10))],
            logical_operator: LogicalOperator::And,
        };
        assert!(evaluate(&config, &context(9)));
        assert!(!evaluate(&config, &context(10)));
        assert!(!evaluate(&config, &context(11)));
    }

    #[test]
    fn test_and_or_combination() {
        let truthy = expr("stock_quantity", ">", json!(0));
        let falsy = expr("stock_quantity", ">", json!(1000));

        let and = ConditionConfig {
            conditions: vec![truthy.clone(), falsy.clone()],
            logical_operator: LogicalOperator::And,
        };
        assert!(!evaluate(&and, &context(8)));

        let or = ConditionConfig {
            conditions: vec![truthy, falsy],
            logical_operator: LogicalOperator::Or,
        };
        assert!(evaluate(&or, &context(8)));
    }

    #[test]
    fn test_unknown_logical_operator_is_false() {
        let config: ConditionConfig = serde_json::from_value(json!({
            "conditions": [{"field": "stock_quantity", "operator": ">", "value": 0}],
            "logical_operator": "xor"
        }))
        .unwrap();
        assert_eq!(config.logical_operator, LogicalOperator::Unknown);
        assert!(!evaluate(&config, &context(8)));
    }

    #[test]
    fn test_movement_aliases() {
        let config = ConditionConfig {
            conditions: vec![expr("movement_type", "==", json!("OUT")), expr("movement_value", ">=", json!(4))],
            logical_operator: LogicalOperator::And,
        };
        assert!(evaluate(&config, &context(8)));
    }

    #[test]
    fn test_stock_percentage_computed() {
        // (10 - 5) / (25 - 5) * 100 = 25
        let config = ConditionConfig {
            conditions: vec![expr("stock_percentage", "==", json!(25.0))],
            logical_operator: LogicalOperator::And,
        };
        assert!(evaluate(&config, &context(10)));
    }

    #[test]
    fn test_stock_percentage_zero_denominator() {
        let ctx = ExecutionContext::build(&json!({
            "trigger": {"type": "stock_change"},
            "product": {"stock": 7, "stock_min": 5, "stock_max": 5}
        }));
        let config = ConditionConfig {
            conditions: vec![expr("stock_percentage", "==", json!(0.0))],
            logical_operator: LogicalOperator::And,
        };
        assert!(evaluate(&config, &ctx));
    }

    #[test]
    fn test_dotted_path_field() {
        let config = ConditionConfig {
            conditions: vec![expr("product.id", "==", json!("p1"))],
            logical_operator: LogicalOperator::And,
        };
        assert!(evaluate(&config, &context(8)));
    }

    #[test]
    fn test_missing_field_resolves_null() {
        let eq_null = ConditionConfig {
            conditions: vec![expr("product.vendor", "==", Value::Null)],
            logical_operator: LogicalOperator::And,
        };
        assert!(evaluate(&eq_null, &context(8)));

        let lt = ConditionConfig {
            conditions: vec![expr("product.vendor", "<", json!(10))],
            logical_operator: LogicalOperator::And,
        };
        assert!(!evaluate(&lt, &context(8)));
    }

    #[test]
    fn test_deep_equality() {
        let ctx = ExecutionContext::build(&json!({
            "trigger": {"type": "stock_change"},
            "product": {"tags": ["a", "b"], "dims": {"w": 2, "h": 3}}
        }));

        let arrays = ConditionConfig {
            conditions: vec![expr("product.tags", "==", json!(["a", "b"]))],
            logical_operator: LogicalOperator::And,
        };
        assert!(evaluate(&arrays, &ctx));

        let shorter = ConditionConfig {
            conditions: vec![expr("product.tags", "!=", json!(["a"]))],
            logical_operator: LogicalOperator::And,
        };
        assert!(evaluate(&shorter, &ctx));

        let objects = ConditionConfig {
            conditions: vec![expr("product.dims", "==", json!({"h": 3, "w": 2}))],
            logical_operator: LogicalOperator::And,
        };
        assert!(evaluate(&objects, &ctx));
    }

    #[test]
    fn test_ordering_is_numeric_only() {
        let ctx = ExecutionContext::build(&json!({
            "trigger": {"type": "stock_change"},
            "product": {"name": "Widget", "stock": 5}
        }));

        let string_operand = ConditionConfig {
            conditions: vec![expr("product.name", "<", json!("Zed"))],
            logical_operator: LogicalOperator::And,
        };
        assert!(!evaluate(&string_operand, &ctx));

        let string_expected = ConditionConfig {
            conditions: vec![expr("product.stock", "<", json!("10"))],
            logical_operator: LogicalOperator::And,
        };
        assert!(!evaluate(&string_expected, &ctx));
    }

    #[test]
    fn test_unknown_compare_operator_is_false() {
        let config = ConditionConfig {
            conditions: vec![expr("stock_quantity", "~=", json!(5))],
            logical_operator: LogicalOperator::And,
        };
        assert!(!evaluate(&config, &context(5)));
    }

    #[test]
    fn test_parse_rejects_malformed_expression() {
        assert!(ConditionConfig::parse(&json!({"conditions": [{"operator": "<"}]})).is_err());
        assert!(ConditionConfig::parse(&json!({"conditions": "nope"})).is_err());
    }
}
