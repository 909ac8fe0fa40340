//! step-form-util - Utility functions for the step-form workspace
//!
//! Casing transforms for label derivation, plus the string and JSON helpers
//! used to build diagnostic messages.

pub mod casing;
pub mod json_type;
pub mod strings;

// Re-exports for convenience
pub use casing::{change_casing, split_words, CasingType, CASING_TYPES, DEFAULT_CASING};
pub use json_type::{is_non_empty_object, type_of};
pub use strings::{format_list, quote, ListStyle};
