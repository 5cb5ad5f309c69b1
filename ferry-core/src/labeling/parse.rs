//! Parsing of the model's label answer

use super::LabelVocabulary;

/// Answer the model gives when none of the labels fit
pub const NO_SUITABLE_LABELS: &str = "NO_SUITABLE_LABELS";

/// Extract the vocabulary labels from a raw model answer
///
/// The answer is a comma-separated list. Pieces are trimmed and kept only if
/// they match a vocabulary entry exactly; order of first appearance is kept
/// and repeats are dropped. An empty answer or the [`NO_SUITABLE_LABELS`]
/// sentinel yields no labels.
pub fn parse_labels(raw: &str, vocabulary: &LabelVocabulary) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == NO_SUITABLE_LABELS {
        return Vec::new();
    }

    let mut labels: Vec<String> = Vec::new();
    for piece in raw.split(',').map(str::trim) {
        if vocabulary.contains(piece) && !labels.iter().any(|l| l == piece) {
            labels.push(piece.to_string());
        }
    }

    labels
}
