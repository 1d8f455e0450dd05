//! Lexical normalization of user queries

use std::collections::BTreeSet;

/// Words ignored when extracting ranking keywords.
const STOPWORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "and", "a", "an", "as", "are", "was", "were", "been", "be",
    "have", "has", "had", "do", "does", "did", "will", "would", "should", "could", "may", "might",
    "must", "can", "what", "how", "why", "when", "where", "who", "whom", "this", "that", "these",
    "those", "for", "from", "with", "about", "into", "of", "to", "in", "or", "it", "its", "our",
    "your", "their", "you", "we", "they", "me", "my", "tell",
];

/// Trim, collapse internal whitespace and lowercase.
pub fn normalize(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Extract the distinct content words of a query.
///
/// Punctuation is stripped, stopwords and tokens of two characters or fewer are dropped.
pub fn extract_keywords(query: &str) -> BTreeSet<String> {
    let cleaned: String = query
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .filter(|word| !STOPWORDS.contains(word))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_collapses_and_lowercases() {
        assert_eq!(normalize("  What is\tGitLab's \n Mission?  "), "what is gitlab's mission?");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_extract_keywords_drops_stopwords_and_short_tokens() {
        let keywords = extract_keywords("What is the CI/CD direction for GitLab, in 2025?");
        let expected: BTreeSet<String> = ["cicd", "direction", "gitlab", "2025"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(keywords, expected);
    }

    #[test]
    fn test_extract_keywords_deduplicates() {
        let keywords = extract_keywords("values values VALUES");
        assert_eq!(keywords.len(), 1);
        assert!(keywords.contains("values"));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(query in "\\PC{0,64}") {
            let once = normalize(&query);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn keywords_are_long_and_lowercase(query in "[A-Za-z ,.!?']{0,64}") {
            for keyword in extract_keywords(&query) {
                prop_assert!(keyword.chars().count() > 2);
                prop_assert_eq!(keyword.to_lowercase(), keyword.clone());
            }
        }
    }
}
