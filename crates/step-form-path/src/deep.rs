use serde_json::{Map, Value};
use step_form_util::type_of;

use crate::{join, DeepPath, PathError};

/// Enumerate every leaf path of `value`, depth-first in key order.
///
/// Only objects are descended into. Arrays, scalars and empty objects are
/// leaves. The root itself must be an object.
///
/// # Errors
///
/// [`PathError::NotAnObject`] if `value` isn't an object.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use step_form_path::create_deep;
///
/// let paths = create_deep(&json!({"a": {"b": 1, "c": [1, 2]}, "d": {}})).unwrap();
/// assert_eq!(paths, vec!["a.b", "a.c", "d"]);
/// ```
pub fn create_deep(value: &Value) -> Result<Vec<DeepPath>, PathError> {
    let map = value
        .as_object()
        .ok_or_else(|| PathError::NotAnObject(type_of(value)))?;
    let mut out = Vec::new();
    collect_leaves(map, "", &mut out);
    Ok(out)
}

fn collect_leaves(map: &Map<String, Value>, prefix: &str, out: &mut Vec<DeepPath>) {
    for (key, child) in map {
        let path = join(prefix, key);
        match child {
            Value::Object(inner) if !inner.is_empty() => collect_leaves(inner, &path, out),
            _ => out.push(path),
        }
    }
}

/// Derive the selected paths from an object whose leaves are booleans.
///
/// `true` leaves are selected, `false` leaves are skipped.
///
/// # Errors
///
/// - [`PathError::NotAnObject`] if `tree` isn't an object.
/// - [`PathError::NonBooleanLeaf`] if any leaf isn't a boolean.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use step_form_path::truthy_leaf_paths;
///
/// let tree = json!({"title": true, "fields": {"age": {"defaultValue": true, "label": false}}});
/// assert_eq!(truthy_leaf_paths(&tree).unwrap(), vec!["title", "fields.age.defaultValue"]);
/// ```
pub fn truthy_leaf_paths(tree: &Value) -> Result<Vec<DeepPath>, PathError> {
    let map = tree
        .as_object()
        .ok_or_else(|| PathError::NotAnObject(type_of(tree)))?;
    let mut out = Vec::new();
    collect_selected(map, "", &mut out)?;
    Ok(out)
}

fn collect_selected(
    map: &Map<String, Value>,
    prefix: &str,
    out: &mut Vec<DeepPath>,
) -> Result<(), PathError> {
    for (key, child) in map {
        let path = join(prefix, key);
        match child {
            Value::Bool(true) => out.push(path),
            Value::Bool(false) => {}
            Value::Object(inner) if !inner.is_empty() => collect_selected(inner, &path, out)?,
            other => {
                return Err(PathError::NonBooleanLeaf {
                    path,
                    received: type_of(other),
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_deep_rejects_non_object() {
        assert_eq!(create_deep(&json!([1, 2])), Err(PathError::NotAnObject("array")));
        assert_eq!(create_deep(&json!("x")), Err(PathError::NotAnObject("string")));
    }

    #[test]
    fn test_create_deep_empty_root() {
        assert!(create_deep(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_create_deep_is_restartable() {
        let value = json!({"a": 1, "b": {"c": null}});
        assert_eq!(create_deep(&value).unwrap(), create_deep(&value).unwrap());
    }

    #[test]
    fn test_truthy_leaf_paths_rejects_non_boolean() {
        let err = truthy_leaf_paths(&json!({"fields": {"age": {"defaultValue": 1}}})).unwrap_err();
        assert_eq!(
            err,
            PathError::NonBooleanLeaf {
                path: "fields.age.defaultValue".to_string(),
                received: "number",
            }
        );
    }

    #[test]
    fn test_truthy_leaf_paths_empty_object_leaf() {
        let err = truthy_leaf_paths(&json!({"fields": {}})).unwrap_err();
        assert!(matches!(err, PathError::NonBooleanLeaf { received: "object", .. }));
    }
}
