//! # Value Tree Helpers
//!
//! Both schema definitions and instance data are `serde_json::Value` trees
//! (with insertion-ordered object keys via the `preserve_order` feature).
//! This module holds the small shared vocabulary for talking about them.

use serde_json::Value;

/// Human-readable name of a value's JSON type, used in violation messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a number node holds an integral value.
///
/// `1.0` counts as integral: JSON does not distinguish `1` from `1.0`, and
/// the OpenAPI `integer` type accepts both spellings.
pub fn is_integral(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => false,
    }
}

/// Numeric comparison helper: every JSON number widened to `f64`.
///
/// The OpenAPI profile compares `minimum`/`maximum`/`multipleOf` as reals;
/// contracts that need exact 64-bit integer boundaries use `format: int64`.
pub fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Deep equality with numeric widening, used by `enum`, `const` and
/// `uniqueItems`: `1` and `1.0` are the same JSON number.
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(fx), Some(fy)) => fx == fy,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(va, vb)| json_eq(va, vb))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, va)| y.get(k).is_some_and(|vb| json_eq(va, vb)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(&json!(null)), "null");
        assert_eq!(type_name(&json!(true)), "boolean");
        assert_eq!(type_name(&json!(3)), "integer");
        assert_eq!(type_name(&json!(3.5)), "number");
        assert_eq!(type_name(&json!("s")), "string");
        assert_eq!(type_name(&json!([1])), "array");
        assert_eq!(type_name(&json!({"a": 1})), "object");
    }

    #[test]
    fn test_integral_accepts_float_spelling() {
        assert!(is_integral(&json!(4)));
        assert!(is_integral(&json!(4.0)));
        assert!(!is_integral(&json!(4.5)));
        assert!(!is_integral(&json!("4")));
    }

    #[test]
    fn test_json_eq_widens_numbers() {
        assert!(json_eq(&json!(1), &json!(1.0)));
        assert!(json_eq(&json!([1, {"a": 2}]), &json!([1.0, {"a": 2.0}])));
        assert!(!json_eq(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }
}
