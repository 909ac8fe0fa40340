//! Deep path utilities.
//!
//! A deep path is a dot-delimited address of a value inside nested JSON
//! objects (`fields.firstName.defaultValue`). This crate enumerates the leaf
//! paths of a value, reads and writes at a path, and compares two values at a
//! set of paths.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use step_form_path::{create_deep, get, update_at};
//!
//! let step = json!({"title": "Step 1", "fields": {"age": {"defaultValue": 25}}});
//! let paths = create_deep(&step).unwrap();
//! assert_eq!(paths, vec!["title", "fields.age.defaultValue"]);
//!
//! let updated = json!({"fields": {"age": {"defaultValue": 30}}});
//! let next = update_at(&step, &["fields.age.defaultValue"], &updated).unwrap();
//! assert_eq!(get(&next, "fields.age.defaultValue"), Some(&json!(30)));
//! assert_eq!(get(&next, "title"), Some(&json!("Step 1")));
//! ```

use serde_json::Value;
use thiserror::Error;

pub mod types;
pub use types::{DeepPath, Mismatch, PathComparison};

pub mod validate;
pub use validate::validate_path;

mod compare;
mod deep;
mod update;

pub use compare::{
    compare_partial_array, equals_at_paths, print_errors, print_mismatches, PartialArrayComparison,
    PartialArrayIssue,
};
pub use deep::{create_deep, truthy_leaf_paths};
pub use update::{set_at, update_at};

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("expected an object, was {0}")]
    NotAnObject(&'static str),
    #[error("path \"{0}\" does not resolve")]
    Unresolvable(String),
    #[error("invalid path \"{path}\": {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("selector leaf at \"{path}\" must be a boolean, was {received}")]
    NonBooleanLeaf { path: String, received: &'static str },
}

/// Split a path into its segments.
///
/// # Example
///
/// ```
/// use step_form_path::parse_path;
///
/// assert_eq!(parse_path("fields.age.defaultValue"), vec!["fields", "age", "defaultValue"]);
/// assert_eq!(parse_path("title"), vec!["title"]);
/// ```
pub fn parse_path(path: &str) -> Vec<&str> {
    path.split(PATH_SEPARATOR).collect()
}

/// Append `key` to `parent`. An empty parent is the root.
pub fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        return key.to_string();
    }
    let mut out = String::with_capacity(parent.len() + key.len() + 1);
    out.push_str(parent);
    out.push(PATH_SEPARATOR);
    out.push_str(key);
    out
}

fn step_into<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

/// Get a value by path.
///
/// The empty path is the root. Numeric segments index into arrays.
/// Returns `None` if the path doesn't resolve.
///
/// # Example
///
/// ```
/// use step_form_path::get;
/// use serde_json::json;
///
/// let doc = json!({"fields": {"tags": {"defaultValue": ["a", "b"]}}});
/// assert_eq!(get(&doc, "fields.tags.defaultValue.1"), Some(&json!("b")));
/// assert_eq!(get(&doc, "fields.missing"), None);
/// ```
pub fn get<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for segment in parse_path(path) {
        current = step_into(current, segment)?;
    }
    Some(current)
}

/// Get a mutable reference to a value by path.
///
/// Returns `None` if the path doesn't resolve.
pub fn get_mut<'a>(value: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for segment in parse_path(path) {
        current = match current {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(arr) => arr.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Check whether a path resolves in `value`.
pub fn has(value: &Value, path: &str) -> bool {
    get(value, path).is_some()
}
