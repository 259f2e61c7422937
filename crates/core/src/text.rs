//! Small text helpers shared by form normalization and list search.

/// Returns `None` for empty or whitespace-only input, the trimmed text otherwise.
///
/// Optional form fields are stored as null rather than as empty strings.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Case-insensitive substring match used by every list search box.
///
/// `needle` is expected to be already lowercased; an empty needle matches.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
