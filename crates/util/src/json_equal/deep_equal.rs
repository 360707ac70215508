use serde_json::{Map, Number, Value};

/// Performs a deep equality check between two JSON values.
///
/// Unlike `Value::eq`, numbers compare by magnitude, so `1` and `1.0` are
/// equal. Object comparison ignores key order.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use delta_engine_util::json_equal::deep_equal;
///
/// assert!(deep_equal(&json!({"size": [1, 2]}), &json!({"size": [1.0, 2]})));
/// assert!(!deep_equal(&json!({"size": 1}), &json!({"size": "1"})));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => number_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => map_equal(a, b),
        _ => false,
    }
}

/// Deep equality of two JSON objects, ignoring key order.
pub fn map_equal(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .all(|(key, val_a)| b.get(key).is_some_and(|val_b| deep_equal(val_a, val_b)))
}

/// Deep equality of optional maps where `None` and an empty map are the same.
///
/// ```
/// use serde_json::Map;
/// use delta_engine_util::json_equal::opt_map_equal;
///
/// assert!(opt_map_equal(None, Some(&Map::new())));
/// ```
pub fn opt_map_equal(a: Option<&Map<String, Value>>, b: Option<&Map<String, Value>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(m), None) | (None, Some(m)) => m.is_empty(),
        (Some(a), Some(b)) => map_equal(a, b),
    }
}

fn number_equal(a: &Number, b: &Number) -> bool {
    if a == b {
        return true;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primitives() {
        assert!(deep_equal(&json!(null), &json!(null)));
        assert!(deep_equal(&json!(true), &json!(true)));
        assert!(!deep_equal(&json!(true), &json!(false)));
        assert!(deep_equal(&json!("x"), &json!("x")));
        assert!(!deep_equal(&json!(0), &json!(null)));
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(deep_equal(&json!(3), &json!(3.0)));
        assert!(!deep_equal(&json!(3), &json!(3.5)));
    }

    #[test]
    fn nested_structures() {
        let a = json!({"a": [1, {"b": null}], "c": "d"});
        let b = json!({"c": "d", "a": [1, {"b": null}]});
        assert!(deep_equal(&a, &b));
        let c = json!({"c": "d", "a": [1, {"b": 0}]});
        assert!(!deep_equal(&a, &c));
    }

    #[test]
    fn arrays_respect_order_and_length() {
        assert!(!deep_equal(&json!([1, 2]), &json!([2, 1])));
        assert!(!deep_equal(&json!([1]), &json!([1, 1])));
    }

    #[test]
    fn optional_maps() {
        let mut m = Map::new();
        assert!(opt_map_equal(None, None));
        assert!(opt_map_equal(Some(&m), None));
        m.insert("bold".into(), json!(true));
        assert!(!opt_map_equal(Some(&m), None));
        assert!(opt_map_equal(Some(&m), Some(&m.clone())));
    }
}
