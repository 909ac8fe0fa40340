//! Validation functions for deep paths.

use crate::{parse_path, PathError};

/// Maximum allowed path string length.
pub const MAX_PATH_LENGTH: usize = 1024;

/// Maximum allowed number of segments.
pub const MAX_PATH_DEPTH: usize = 64;

/// Validate a deep path string.
///
/// # Errors
///
/// Returns [`PathError::InvalidPath`] if:
/// - The path is empty
/// - The path exceeds the maximum length (1024 characters) or depth (64 segments)
/// - Any segment is empty (`"a..b"`, `".a"`, `"a."`)
///
/// # Example
///
/// ```
/// use step_form_path::validate_path;
///
/// validate_path("fields.firstName.defaultValue").unwrap();
/// validate_path("fields..defaultValue").unwrap_err();
/// validate_path("").unwrap_err();
/// ```
pub fn validate_path(path: &str) -> Result<(), PathError> {
    let invalid = |reason| PathError::InvalidPath {
        path: path.to_string(),
        reason,
    };
    if path.is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.len() > MAX_PATH_LENGTH {
        return Err(invalid("path is too long"));
    }
    let segments = parse_path(path);
    if segments.len() > MAX_PATH_DEPTH {
        return Err(invalid("path is too deep"));
    }
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(invalid("path has an empty segment"));
    }
    Ok(())
}
