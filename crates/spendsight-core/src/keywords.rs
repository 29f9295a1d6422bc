//! Case-insensitive keyword matching shared by every rule type

/// True when every keyword appears in `description`, ignoring case.
///
/// An empty keyword list matches vacuously; callers that must not match on
/// an empty list check for it first.
pub fn contains_all<S: AsRef<str>>(description: &str, keywords: &[S]) -> bool {
    let haystack = description.to_lowercase();
    contains_all_lower(&haystack, keywords)
}

/// Same as [`contains_all`] for a description that is already lowercased
pub fn contains_all_lower<S: AsRef<str>>(haystack: &str, keywords: &[S]) -> bool {
    keywords
        .iter()
        .all(|kw| haystack.contains(&kw.as_ref().to_lowercase()))
}

/// True when at least one entry of a lowercase keyword set appears in an
/// already-lowercased description
pub fn contains_any(haystack: &str, set: &[&str]) -> bool {
    set.iter().any(|kw| haystack.contains(kw))
}

/// Trim user-entered keywords and drop blank entries
pub fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|kw| kw.as_ref().trim().to_string())
        .filter(|kw| !kw.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_all_is_case_insensitive() {
        assert!(contains_all("STARBUCKS STORE #123 SEATTLE", &["starbucks"]));
        assert!(contains_all("starbucks store", &["STARBUCKS", "Store"]));
        assert!(!contains_all("STARBUCKS STORE #123 SEATTLE", &["starbucks", "gift"]));
    }

    #[test]
    fn test_contains_all_empty_list_is_vacuous() {
        let empty: [&str; 0] = [];
        assert!(contains_all("anything", &empty));
    }

    #[test]
    fn test_contains_any() {
        assert!(contains_any("netflix.com bill", &["hulu", "netflix"]));
        assert!(!contains_any("grocery outlet", &["hulu", "netflix"]));
    }

    #[test]
    fn test_normalize_keywords() {
        let normalized = normalize_keywords(["  amazon ", "", "  ", "prime"]);
        assert_eq!(normalized, vec!["amazon", "prime"]);
    }
}
