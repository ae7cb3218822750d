// src/util/text.rs

/// Trim a possibly missing string and drop it if nothing is left.
///
/// # Examples
///
/// ```
/// use flashdeck::util::text::non_blank;
///
/// assert_eq!(non_blank(Some("  Geografi ")), Some("Geografi".to_string()));
/// assert_eq!(non_blank(Some("   ")), None);
/// assert_eq!(non_blank(None), None);
/// ```
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Grouping key of a set name: set identity ignores case.
pub fn set_key(name: &str) -> String {
    name.to_lowercase()
}

/// True when both names denote the same set.
pub fn same_set(a: &str, b: &str) -> bool {
    set_key(a) == set_key(b)
}
