use serde_json::Value;

/// Names the JSON type of a value, for diagnostics.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use step_form_util::json_type::type_of;
///
/// assert_eq!(type_of(&json!(null)), "null");
/// assert_eq!(type_of(&json!([1])), "array");
/// assert_eq!(type_of(&json!({"a": 1})), "object");
/// ```
pub fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns `true` for objects with at least one own key.
pub fn is_non_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(map) if !map.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_of_scalars() {
        assert_eq!(type_of(&json!(true)), "boolean");
        assert_eq!(type_of(&json!(1.5)), "number");
        assert_eq!(type_of(&json!("x")), "string");
    }

    #[test]
    fn test_is_non_empty_object() {
        assert!(is_non_empty_object(&json!({"a": 1})));
        assert!(!is_non_empty_object(&json!({})));
        assert!(!is_non_empty_object(&json!([1])));
        assert!(!is_non_empty_object(&json!(null)));
    }
}
