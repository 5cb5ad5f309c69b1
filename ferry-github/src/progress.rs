//! Per-item progress reporting for scrapes and jobs
//!
//! The library only logs through `tracing`. Front ends that want to show
//! each item as it is handled implement [`ProgressHandler`]; every method
//! has an empty default, so a handler only overrides what it displays.

use std::time::Duration;

use ferry_core::records::{IssueRecord, LabelRecord};
use ferry_core::{Clock, DataFile, RateLimitGuard, RateLimitSource};

use crate::api::RemoteIssue;
use crate::{Error, Result};

/// What happened to one scraped label during population
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    /// The record has no name; nothing was sent
    Nameless,
    Exists,
    Created,
    /// The target rejected it, usually as a duplicate (422)
    Rejected(String),
    /// The token cannot create labels; the batch stops here
    Forbidden(String),
    Failed(String),
    /// The existence check itself failed
    CheckFailed(String),
}

/// What happened to one scraped issue during population
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueOutcome {
    PullRequest,
    Created {
        number: u64,
    },
    /// The token cannot create issues; the batch stops here
    Forbidden(String),
    /// Validation failed (422)
    Invalid(String),
    /// Issues are disabled in the target (410)
    Disabled(String),
    Failed(String),
}

/// What happened to one unlabeled issue during auto-labelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelingOutcome {
    Applied(Vec<String>),
    /// Dry run: these labels would have been applied
    WouldApply(Vec<String>),
    /// The model answered but no vocabulary label fit
    NoSuggestion,
    Exhausted {
        attempts: u32,
        last_error: String,
    },
    CommentsFailed(String),
    ApplyFailed {
        labels: Vec<String>,
        error: String,
    },
}

/// Receives per-item events from the scrapers and jobs
pub trait ProgressHandler: Send {
    /// A scraper finished one top-level item
    fn on_fetched(&mut self, _file: DataFile, _item: &str) {}

    /// The repository has discussions turned off
    fn on_discussions_disabled(&mut self) {}

    /// Labels defined in the target, fetched at the start of a job
    fn on_target_labels(&mut self, _count: usize) {}

    /// The target's labels could not be fetched; the job goes on without them
    fn on_target_labels_failed(&mut self, _error: &Error) {}

    fn on_label(&mut self, _label: &LabelRecord, _outcome: &LabelOutcome) {}

    /// `title` is the sanitized title sent to the target
    fn on_issue(&mut self, _record: &IssueRecord, _title: &str, _outcome: &IssueOutcome) {}

    fn on_labels_replay_failed(&mut self, _number: u64, _labels: &[String], _error: &Error) {}

    fn on_comment_replay_failed(&mut self, _number: u64, _comment_id: u64, _error: &Error) {}

    /// Unlabeled issues found by the auto-labeller
    fn on_candidates(&mut self, _count: usize) {}

    fn on_labeling(&mut self, _issue: &RemoteIssue, _outcome: &LabelingOutcome) {}

    /// The rate-limit guard slept for `slept`
    fn on_rate_limit_pause(&mut self, _slept: Duration) {}
}

/// Handler that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressHandler for Silent {}

/// Run the rate-limit guard and report any pause to `handler`
pub(crate) async fn guard<S, H>(
    guard: &RateLimitGuard,
    source: &S,
    clock: &dyn Clock,
    handler: &mut H,
) -> Result<()>
where
    S: RateLimitSource<Error = Error> + ?Sized,
    H: ProgressHandler + ?Sized,
{
    if let Some(slept) = guard.guard(source, clock).await? {
        handler.on_rate_limit_pause(slept);
    }
    Ok(())
}
