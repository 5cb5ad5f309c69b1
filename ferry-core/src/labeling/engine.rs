//! Label suggestion engine

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{parse_labels, render_prompt, IssueText, LabelVocabulary};
use crate::clock::Clock;
use crate::retry::{call_with_retry, RetryPolicy};
use crate::Result;

/// A text-in, text-out language model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logging
    fn name(&self) -> &str;

    /// Send `prompt` and return the model's text answer
    ///
    /// Timeouts, transport failures and malformed responses are all errors.
    async fn invoke(&self, prompt: &str) -> Result<String>;
}

/// Outcome of suggesting labels for one issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// The model answered; these vocabulary labels apply (possibly none)
    Accepted(Vec<String>),
    /// Every attempt failed
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Message of the final failure
        last_error: String,
    },
}

impl Suggestion {
    /// Labels to apply; empty when exhausted
    pub fn labels(&self) -> &[String] {
        match self {
            Suggestion::Accepted(labels) => labels,
            Suggestion::Exhausted { .. } => &[],
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Suggestion::Exhausted { .. })
    }
}

/// Asks a language model which vocabulary labels fit an issue
#[derive(Clone)]
pub struct LabelSuggester {
    model: Arc<dyn LanguageModel>,
    clock: Arc<dyn Clock>,
    policy: RetryPolicy,
}

impl LabelSuggester {
    pub fn new(model: Arc<dyn LanguageModel>, clock: Arc<dyn Clock>) -> Self {
        Self {
            model,
            clock,
            policy: RetryPolicy::default(),
        }
    }

    /// Use a different retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Suggest labels for `issue`
    ///
    /// Model failures are retried according to the policy and never returned
    /// as errors; a run that exhausts its attempts yields
    /// [`Suggestion::Exhausted`]. An empty vocabulary short-circuits without
    /// calling the model.
    pub async fn suggest(&self, issue: &IssueText, vocabulary: &LabelVocabulary) -> Suggestion {
        if vocabulary.is_empty() {
            debug!(title = %issue.title, "Empty vocabulary, skipping model call");
            return Suggestion::Accepted(Vec::new());
        }

        let prompt = render_prompt(issue, vocabulary);
        let model = self.model.as_ref();
        let prompt = prompt.as_str();

        info!(title = %issue.title, model = model.name(), "Requesting label suggestions");

        let answer = call_with_retry(&self.policy, self.clock.as_ref(), |attempt| async move {
            debug!(attempt, "Sending request to language model");
            model.invoke(prompt).await
        })
        .await;

        match answer {
            Ok(raw) => {
                let labels = parse_labels(&raw, vocabulary);
                debug!(raw = %raw.trim(), ?labels, "Parsed model answer");
                Suggestion::Accepted(labels)
            }
            Err(e) => {
                warn!(title = %issue.title, error = %e, "Label suggestion failed");
                Suggestion::Exhausted {
                    attempts: self.policy.attempts(),
                    last_error: e.to_string(),
                }
            }
        }
    }
}

impl std::fmt::Debug for LabelSuggester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelSuggester")
            .field("model", &self.model.name())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
