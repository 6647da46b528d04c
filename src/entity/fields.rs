//! Normalization of the comma separated list fields.

use std::collections::HashSet;

/// Split a comma separated tag string into lowercase, trimmed, unique tags.
///
/// First occurrence wins, so the result keeps the order the user typed.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_lowercase)
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Split a comma separated author string. Order and case are preserved.
pub fn normalize_authors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .map(String::from)
        .collect()
}

/// Trimmed year, `None` when blank.
pub fn normalize_year(raw: &str) -> Option<String> {
    let year = raw.trim();
    (!year.is_empty()).then(|| year.to_string())
}

pub fn tags_to_string(tags: &[String]) -> String {
    tags.join(", ")
}

pub fn authors_to_string(authors: &[String]) -> String {
    authors.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags() {
        assert_eq!(
            normalize_tags("Methods, Theory, Theory,   "),
            vec!["methods", "theory"]
        );
    }

    #[test]
    fn test_normalize_tags_is_idempotent() {
        let inputs = [
            "Methods, Theory, Theory,   ",
            ",,,",
            "  Machine Learning ,machine learning, NLP",
            "",
        ];
        for input in inputs {
            let once = normalize_tags(input);
            let twice = normalize_tags(&tags_to_string(&once));
            assert_eq!(once, twice, "input: {:?}", input);
        }
    }

    #[test]
    fn test_normalize_tags_dedupes_case_variants() {
        assert_eq!(normalize_tags("Rust, RUST, rust"), vec!["rust"]);
    }

    #[test]
    fn test_normalize_authors() {
        assert_eq!(
            normalize_authors("Ada Lovelace, Alan Turing"),
            vec!["Ada Lovelace", "Alan Turing"]
        );
        assert!(normalize_authors(" , ").is_empty());
    }

    #[test]
    fn test_normalize_year() {
        assert_eq!(normalize_year(" 2016 "), Some("2016".to_string()));
        assert_eq!(normalize_year("   "), None);
    }

    #[test]
    fn test_to_string_helpers() {
        let tags = vec!["a".to_string(), "b".to_string()];
        assert_eq!(tags_to_string(&tags), "a, b");
        assert_eq!(authors_to_string(&[]), "");
    }
}
