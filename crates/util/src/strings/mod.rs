//! String utilities.
//!
//! Provides prose list formatting and quoting for diagnostic messages.

mod list_format;
mod quote;

pub use list_format::{format_list, ListStyle};
pub use quote::quote;
