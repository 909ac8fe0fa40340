/// How the last two items of a list are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// `a, b, and c`
    Conjunction,
    /// `a, b, or c`
    Disjunction,
}

impl ListStyle {
    fn word(&self) -> &'static str {
        match self {
            ListStyle::Conjunction => "and",
            ListStyle::Disjunction => "or",
        }
    }
}

/// Formats a list of items as English prose.
///
/// # Examples
///
/// ```
/// use step_form_util::strings::{format_list, ListStyle};
///
/// assert_eq!(format_list(&["step1"], ListStyle::Disjunction), "step1");
/// assert_eq!(format_list(&["step1", "step2"], ListStyle::Disjunction), "step1 or step2");
/// assert_eq!(format_list(&["a", "b", "c"], ListStyle::Conjunction), "a, b, and c");
/// ```
pub fn format_list<S: AsRef<str>>(items: &[S], style: ListStyle) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} {} {}", first.as_ref(), style.word(), second.as_ref()),
        [init @ .., last] => {
            let mut out = String::new();
            for item in init {
                out.push_str(item.as_ref());
                out.push_str(", ");
            }
            out.push_str(style.word());
            out.push(' ');
            out.push_str(last.as_ref());
            out
        }
    }
}
