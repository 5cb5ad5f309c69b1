//! Set of label names that exist in a repository

use std::collections::BTreeSet;

/// Label names fetched from the target repository at the start of a run
///
/// Membership is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelVocabulary {
    names: BTreeSet<String>,
}

impl LabelVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Names joined with `", "` for embedding in a prompt
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(", ")
    }
}

impl<S: Into<String>> FromIterator<S> for LabelVocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduplicates_and_sorts() {
        let vocab: LabelVocabulary = ["enhancement", "bug", "bug"].into_iter().collect();
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.joined(), "bug, enhancement");
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        let vocab: LabelVocabulary = ["bug"].into_iter().collect();
        assert!(vocab.contains("bug"));
        assert!(!vocab.contains("Bug"));
        assert!(!vocab.contains(" bug"));
    }
}
