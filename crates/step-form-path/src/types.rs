//! Type definitions for deep paths.

use serde_json::Value;

/// A dot-delimited address of a value inside a nested object, e.g.
/// `fields.firstName.defaultValue`.
pub type DeepPath = String;

/// A path at which two values disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub path: DeepPath,
    /// The value on the expected side. `None` if the path doesn't resolve.
    pub expected: Option<Value>,
    /// The value on the actual side. `None` if the path doesn't resolve.
    pub actual: Option<Value>,
}

/// Outcome of [`equals_at_paths`](crate::equals_at_paths).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathComparison {
    pub ok: bool,
    pub mismatches: Vec<Mismatch>,
}

impl PathComparison {
    /// Mismatched paths, in comparison order.
    pub fn paths(&self) -> Vec<&str> {
        self.mismatches.iter().map(|m| m.path.as_str()).collect()
    }
}
