//! Ferry Core - Core library for repo-ferry
//!
//! This crate holds the pieces shared by every ferry job: configuration and
//! secrets, the rate-limit guard, the retry policy, the label suggestion
//! engine, and the flat JSON record store used to move repository metadata
//! between repositories.

pub mod clock;
pub mod config;
pub mod error;
pub mod labeling;
pub mod rate_limit;
pub mod records;
pub mod retry;
pub mod secrets;
pub mod store;
pub mod structure;
pub mod text;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use labeling::{
    parse_labels, IssueText, LabelSuggester, LabelVocabulary, LanguageModel, Suggestion,
    NO_SUITABLE_LABELS,
};
pub use rate_limit::{RateLimitGuard, RateLimitSource, RateLimitState};
pub use retry::{call_with_retry, RetryPolicy};
pub use secrets::Secrets;
pub use store::{DataFile, JsonStore};
