use step_form_path::{Mismatch, PathError};
use thiserror::Error;

use crate::storage::StorageError;
use crate::validator::ValidationError;

/// Every failure the schema engine reports.
///
/// Nothing is retried or recovered: a failed operation leaves the canonical
/// value untouched and the error surfaces at the call site.
#[derive(Debug, Error)]
pub enum FormError {
    /// Malformed step or field configuration at construction time.
    #[error("{0}")]
    Configuration(String),
    /// A step or field selector names unknown keys or has an unusable shape.
    #[error("{message}")]
    Selector { message: String, invalid: Vec<String> },
    /// An updater result is missing keys, has extra ones, or diverges where
    /// it must not.
    #[error("{message}")]
    ShapeMismatch {
        message: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
        mismatches: Vec<Mismatch>,
    },
    /// The validator collaborator rejected the data.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A value of the wrong JSON type reached an API boundary.
    #[error("{message} (was {received})")]
    Type {
        message: String,
        received: &'static str,
    },
    /// The storage collaborator failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Path(#[from] PathError),
}

impl FormError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        FormError::Configuration(message.into())
    }

    pub(crate) fn selector(message: impl Into<String>, invalid: Vec<String>) -> Self {
        FormError::Selector {
            message: message.into(),
            invalid,
        }
    }

    pub(crate) fn type_error(message: impl Into<String>, received: &'static str) -> Self {
        FormError::Type {
            message: message.into(),
            received,
        }
    }

    pub(crate) fn missing_keys(message: impl Into<String>, missing: Vec<String>) -> Self {
        FormError::ShapeMismatch {
            message: message.into(),
            missing,
            unexpected: Vec::new(),
            mismatches: Vec::new(),
        }
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        FormError::missing_keys(message, Vec::new())
    }

    pub(crate) fn mismatches(message: impl Into<String>, mismatches: Vec<Mismatch>) -> Self {
        FormError::ShapeMismatch {
            message: message.into(),
            missing: Vec::new(),
            unexpected: Vec::new(),
            mismatches,
        }
    }

    /// Keys reported as invalid by a selector failure, empty otherwise.
    pub fn invalid_keys(&self) -> &[String] {
        match self {
            FormError::Selector { invalid, .. } => invalid,
            _ => &[],
        }
    }

    /// Keys reported as missing by a shape failure, empty otherwise.
    pub fn missing(&self) -> &[String] {
        match self {
            FormError::ShapeMismatch { missing, .. } => missing,
            _ => &[],
        }
    }

    /// Keys or paths reported as unexpected by a shape failure, empty otherwise.
    pub fn unexpected(&self) -> &[String] {
        match self {
            FormError::ShapeMismatch { unexpected, .. } => unexpected,
            _ => &[],
        }
    }
}
