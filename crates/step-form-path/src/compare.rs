use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use step_form_util::{format_list, quote, ListStyle};

use crate::{get, Mismatch, PathComparison};

/// Compare `expected` and `actual` at each of `paths`.
///
/// Values are compared by equality at the addressed location. A path that
/// resolves on only one side is a mismatch with `None` on the other side.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use step_form_path::equals_at_paths;
///
/// let a = json!({"title": "A", "fields": {"age": {"defaultValue": 1}}});
/// let b = json!({"title": "B", "fields": {"age": {"defaultValue": 1}}});
/// let result = equals_at_paths(&a, &["title", "fields.age.defaultValue"], &b);
/// assert!(!result.ok);
/// assert_eq!(result.paths(), vec!["title"]);
/// ```
pub fn equals_at_paths<S: AsRef<str>>(
    expected: &Value,
    paths: &[S],
    actual: &Value,
) -> PathComparison {
    let mismatches: Vec<Mismatch> = paths
        .iter()
        .filter_map(|path| {
            let path = path.as_ref();
            let left = get(expected, path);
            let right = get(actual, path);
            if left.is_some() && left == right {
                return None;
            }
            Some(Mismatch {
                path: path.to_string(),
                expected: left.cloned(),
                actual: right.cloned(),
            })
        })
        .collect();
    PathComparison {
        ok: mismatches.is_empty(),
        mismatches,
    }
}

fn describe(value: &Option<Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "<missing>".to_string(),
    }
}

/// Render mismatches as one line per path.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use step_form_path::{equals_at_paths, print_mismatches};
///
/// let result = equals_at_paths(&json!({"a": 1}), &["a"], &json!({"a": 2}));
/// assert_eq!(print_mismatches(&result), "- \"a\": expected 1, received 2");
/// ```
pub fn print_mismatches(comparison: &PathComparison) -> String {
    comparison
        .mismatches
        .iter()
        .map(|m| {
            format!(
                "- {}: expected {}, received {}",
                quote(&m.path, '"'),
                describe(&m.expected),
                describe(&m.actual)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One problem found by [`compare_partial_array`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialArrayIssue {
    /// Nothing was supplied.
    Empty,
    /// `value` at `index` isn't one of the valid entries.
    Unexpected { index: usize, value: String },
    /// `value` at `index` was already supplied at `first`.
    Duplicate {
        index: usize,
        first: usize,
        value: String,
    },
}

impl PartialArrayIssue {
    /// The offending entry, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            PartialArrayIssue::Empty => None,
            PartialArrayIssue::Unexpected { value, .. } | PartialArrayIssue::Duplicate { value, .. } => {
                Some(value.as_str())
            }
        }
    }
}

impl fmt::Display for PartialArrayIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialArrayIssue::Empty => write!(f, "no entries were provided"),
            PartialArrayIssue::Unexpected { index, value } => {
                write!(f, "{} (index {index}) is not a valid entry", quote(value, '"'))
            }
            PartialArrayIssue::Duplicate { index, first, value } => write!(
                f,
                "{} (index {index}) duplicates index {first}",
                quote(value, '"')
            ),
        }
    }
}

/// Outcome of [`compare_partial_array`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialArrayComparison {
    Success,
    Error(Vec<PartialArrayIssue>),
}

impl PartialArrayComparison {
    pub fn is_success(&self) -> bool {
        matches!(self, PartialArrayComparison::Success)
    }

    pub fn issues(&self) -> &[PartialArrayIssue] {
        match self {
            PartialArrayComparison::Success => &[],
            PartialArrayComparison::Error(issues) => issues,
        }
    }

    /// Every offending entry, in supplied order.
    pub fn invalid_entries(&self) -> Vec<String> {
        self.issues()
            .iter()
            .filter_map(|issue| issue.value().map(str::to_string))
            .collect()
    }
}

/// Check a caller-supplied subset against the authoritative list.
///
/// Every supplied entry must appear in `valid`, at most once. All problems are
/// collected, not just the first.
///
/// # Example
///
/// ```
/// use step_form_path::{compare_partial_array, PartialArrayIssue};
///
/// let valid = ["step1", "step2"];
/// assert!(compare_partial_array(&["step2"], &valid).is_success());
///
/// let result = compare_partial_array(&["step1", "stepX", "stepY"], &valid);
/// assert_eq!(result.invalid_entries(), vec!["stepX", "stepY"]);
/// ```
pub fn compare_partial_array<A: AsRef<str>, B: AsRef<str>>(
    supplied: &[A],
    valid: &[B],
) -> PartialArrayComparison {
    if supplied.is_empty() {
        return PartialArrayComparison::Error(vec![PartialArrayIssue::Empty]);
    }
    let mut issues = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (index, entry) in supplied.iter().enumerate() {
        let entry = entry.as_ref();
        if !valid.iter().any(|v| v.as_ref() == entry) {
            issues.push(PartialArrayIssue::Unexpected {
                index,
                value: entry.to_string(),
            });
            continue;
        }
        if let Some(&first) = seen.get(entry) {
            issues.push(PartialArrayIssue::Duplicate {
                index,
                first,
                value: entry.to_string(),
            });
            continue;
        }
        seen.insert(entry, index);
    }
    if issues.is_empty() {
        PartialArrayComparison::Success
    } else {
        PartialArrayComparison::Error(issues)
    }
}

/// Render issues as one line each, followed by the accepted entries.
pub fn print_errors<S: AsRef<str>>(issues: &[PartialArrayIssue], valid: &[S]) -> String {
    let mut lines: Vec<String> = issues.iter().map(|issue| format!("- {issue}")).collect();
    let quoted: Vec<String> = valid.iter().map(|v| quote(v.as_ref(), '"')).collect();
    lines.push(format!(
        "Valid entries are {}",
        format_list(&quoted, ListStyle::Disjunction)
    ));
    lines.join("\n")
}
