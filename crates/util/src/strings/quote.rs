/// Wraps `s` in `quote_char`, stripping a lone leading or trailing quote
/// first so the result is always balanced.
///
/// # Examples
///
/// ```
/// use step_form_util::strings::quote;
///
/// assert_eq!(quote("step1", '"'), "\"step1\"");
/// assert_eq!(quote("\"step1\"", '"'), "\"step1\"");
/// assert_eq!(quote("'step1", '"'), "\"step1\"");
/// ```
pub fn quote(s: &str, quote_char: char) -> String {
    if s.len() >= 2 && s.starts_with(quote_char) && s.ends_with(quote_char) {
        return s.to_string();
    }
    let is_quote = |c: char| c == '"' || c == '\'';
    let trimmed = s.strip_prefix(is_quote).unwrap_or(s);
    let trimmed = trimmed.strip_suffix(is_quote).unwrap_or(trimmed);
    format!("{quote_char}{trimmed}{quote_char}")
}
