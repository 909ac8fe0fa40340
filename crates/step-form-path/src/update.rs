use serde_json::Value;

use crate::{get, get_mut, parse_path, PathError};

/// Write `value` at `path` inside `target`.
///
/// Every segment but the last must already resolve. The last segment is
/// inserted into (or replaced in) its parent object, or replaces an existing
/// array element.
///
/// # Errors
///
/// [`PathError::Unresolvable`] if the parent doesn't exist or isn't a
/// container.
pub fn set_at(target: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    let unresolvable = || PathError::Unresolvable(path.to_string());
    let segments = parse_path(path);
    let Some((last, parents)) = segments.split_last() else {
        return Err(unresolvable());
    };
    let parent_path = parents.join(".");
    let parent = get_mut(target, &parent_path).ok_or_else(unresolvable)?;
    match parent {
        Value::Object(map) => {
            map.insert((*last).to_string(), value);
            Ok(())
        }
        Value::Array(arr) => {
            let slot = last
                .parse::<usize>()
                .ok()
                .and_then(|idx| arr.get_mut(idx))
                .ok_or_else(unresolvable)?;
            *slot = value;
            Ok(())
        }
        _ => Err(unresolvable()),
    }
}

/// Produce a copy of `base` where each of `paths` holds the value found at
/// the same path in `updated`.
///
/// `base` is never mutated; everything not addressed by `paths` is carried
/// over unchanged.
///
/// # Errors
///
/// [`PathError::Unresolvable`] if a path is missing from `updated`, or its
/// parent is missing from `base`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use step_form_path::update_at;
///
/// let base = json!({"a": 1, "b": {"c": 2, "d": 3}});
/// let next = update_at(&base, &["b.c"], &json!({"b": {"c": 20}})).unwrap();
/// assert_eq!(next, json!({"a": 1, "b": {"c": 20, "d": 3}}));
/// assert_eq!(base, json!({"a": 1, "b": {"c": 2, "d": 3}}));
/// ```
pub fn update_at<S: AsRef<str>>(
    base: &Value,
    paths: &[S],
    updated: &Value,
) -> Result<Value, PathError> {
    let mut next = base.clone();
    for path in paths {
        let path = path.as_ref();
        let leaf = get(updated, path).ok_or_else(|| PathError::Unresolvable(path.to_string()))?;
        set_at(&mut next, path, leaf.clone())?;
    }
    Ok(next)
}
