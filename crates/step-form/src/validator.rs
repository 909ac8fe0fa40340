//! The validator collaborator contract.
//!
//! A validator takes raw JSON and either returns the validated (possibly
//! transformed) value or a list of issues. Validation is synchronous: a
//! validator that can only answer later reports [`ValidationResult::Pending`],
//! which the engine rejects.

use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// One problem reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub message: String,
    /// Location of the problem inside the validated data, outermost first.
    pub path: Vec<String>,
}

impl ValidationIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    pub fn at<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path.join("."), self.message)
        }
    }
}

/// What a validator returns.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid(Value),
    Invalid(Vec<ValidationIssue>),
    /// The validator has not finished. Not supported.
    Pending,
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("- {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("validation failed:\n{}", format_issues(.0))]
    Issues(Vec<ValidationIssue>),
    #[error("validation must be synchronous, the validator returned a pending result")]
    Async,
}

impl ValidationError {
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            ValidationError::Issues(issues) => issues,
            ValidationError::Async => &[],
        }
    }
}

pub trait Validator {
    fn validate(&self, data: &Value) -> ValidationResult;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> ValidationResult,
{
    fn validate(&self, data: &Value) -> ValidationResult {
        self(data)
    }
}

/// A validator shared between a configuration and the helpers built from it.
pub type SharedValidator = Rc<dyn Validator>;

/// Run `validator` over `data`, turning every non-success into an error.
///
/// # Example
///
/// ```
/// use serde_json::{json, Value};
/// use step_form::validator::{run_standard_validation, ValidationIssue, ValidationResult};
///
/// let non_empty = |data: &Value| match data.as_str() {
///     Some(s) if !s.is_empty() => ValidationResult::Valid(data.clone()),
///     _ => ValidationResult::Invalid(vec![ValidationIssue::new("must be a non-empty string")]),
/// };
/// assert_eq!(run_standard_validation(&non_empty, &json!("ok")).unwrap(), json!("ok"));
/// assert!(run_standard_validation(&non_empty, &json!("")).is_err());
/// ```
pub fn run_standard_validation(
    validator: &dyn Validator,
    data: &Value,
) -> Result<Value, ValidationError> {
    match validator.validate(data) {
        ValidationResult::Valid(value) => Ok(value),
        ValidationResult::Invalid(issues) => Err(ValidationError::Issues(issues)),
        ValidationResult::Pending => Err(ValidationError::Async),
    }
}
