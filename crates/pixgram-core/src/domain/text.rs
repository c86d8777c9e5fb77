//! Caption and tag parsing.

use std::collections::HashSet;

/// `#`-prefixed tokens from each source, in order, without duplicates.
///
/// A bare `#` is not a tag.
pub fn extract_hashtags<'a>(sources: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .flat_map(str::split_whitespace)
        .filter(|token| token.starts_with('#') && token.len() > 1)
        .filter(|token| seen.insert(token.to_string()))
        .map(String::from)
        .collect()
}

/// Trimmed, non-empty, de-duplicated tagged users in first-seen order.
pub fn normalize_tagged_users(users: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    users
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .filter(|u| seen.insert(u.to_string()))
        .map(String::from)
        .collect()
}
