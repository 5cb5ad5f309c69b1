//! Label suggestion for unlabeled issues
//!
//! A language model is shown an issue together with the labels that exist in
//! the repository and asked which of them apply. Its answer is filtered back
//! down to that vocabulary, so nothing outside it can ever be applied.

mod engine;
mod parse;
mod prompt;
mod vocabulary;

pub use engine::{LabelSuggester, LanguageModel, Suggestion};
pub use parse::{parse_labels, NO_SUITABLE_LABELS};
pub use prompt::{render_prompt, CommentText, IssueText, NO_COMMENTS, NO_DESCRIPTION};
pub use vocabulary::LabelVocabulary;
