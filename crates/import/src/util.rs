/// Trims and collapses every run of whitespace into a single space.
pub fn normalize_description(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lookup key for case-insensitive description matching.
pub fn description_key(s: &str) -> String {
    normalize_description(s).to_lowercase()
}

/// Case-insensitive comparison for header names and description prefixes.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

pub fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.to_lowercase().starts_with(&prefix.to_lowercase())
}
