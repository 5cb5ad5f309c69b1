//! Label the unlabeled issues of a repository with a language model

use ferry_core::labeling::CommentText;
use ferry_core::{Clock, IssueText, LabelSuggester, LabelVocabulary, RateLimitGuard, Suggestion};
use tracing::{debug, info, warn};

use crate::api::{RemoteIssue, RepoApi};
use crate::progress::{self, LabelingOutcome, ProgressHandler};
use crate::Result;

/// Options for [`autolabel`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AutolabelOptions {
    /// Suggest labels but do not apply them
    pub dry_run: bool,
}

/// Tally of an auto-label run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutolabelSummary {
    /// Unlabeled issues found
    pub candidates: usize,
    pub processed: usize,
    pub labeled: usize,
    /// Model exhausted its attempts, suggested nothing usable, or applying failed
    pub failed: usize,
}

/// Search query for issues without labels in `full_name`
pub fn unlabeled_query(full_name: &str) -> String {
    format!("repo:{} no:label type:issue", full_name)
}

/// Issues that still carry no label and are not pull requests
///
/// Search results can be stale, so each hit is fetched again.
async fn unlabeled_issues<R>(repo: &R) -> Result<Vec<RemoteIssue>>
where
    R: RepoApi + ?Sized,
{
    let numbers = repo
        .search_issue_numbers(&unlabeled_query(&repo.full_name()))
        .await?;

    let mut issues = Vec::with_capacity(numbers.len());
    for number in numbers {
        match repo.get_issue(number).await {
            Ok(issue) if issue.labels.is_empty() && !issue.is_pull_request => issues.push(issue),
            Ok(issue) => debug!(number, labels = ?issue.labels, "Skipping search hit"),
            Err(e) => warn!(number, error = %e, "Failed to fetch issue"),
        }
    }
    Ok(issues)
}

/// Suggest and apply labels for every unlabeled issue
///
/// Only labels already defined in the repository are ever applied. The
/// run stops before touching any issue when the repository has no labels.
pub async fn autolabel<R, H>(
    repo: &R,
    suggester: &LabelSuggester,
    options: AutolabelOptions,
    guard: &RateLimitGuard,
    clock: &dyn Clock,
    handler: &mut H,
) -> Result<AutolabelSummary>
where
    R: RepoApi + ?Sized,
    H: ProgressHandler + ?Sized,
{
    let mut summary = AutolabelSummary::default();

    let vocabulary: LabelVocabulary = repo
        .list_labels()
        .await?
        .into_iter()
        .map(|l| l.name)
        .collect();
    handler.on_target_labels(vocabulary.len());

    if vocabulary.is_empty() {
        warn!(repo = %repo.full_name(), "No labels defined, nothing to suggest from");
        return Ok(summary);
    }

    let issues = unlabeled_issues(repo).await?;
    summary.candidates = issues.len();
    handler.on_candidates(issues.len());

    for issue in issues {
        let outcome = label_issue(repo, suggester, &vocabulary, &issue, options).await;
        handler.on_labeling(&issue, &outcome);

        match outcome {
            LabelingOutcome::Applied(_) | LabelingOutcome::WouldApply(_) => summary.labeled += 1,
            _ => summary.failed += 1,
        }
        summary.processed += 1;

        progress::guard(guard, repo, clock, handler).await?;
    }

    info!(?summary, "Auto-labelling finished");
    Ok(summary)
}

async fn label_issue<R>(
    repo: &R,
    suggester: &LabelSuggester,
    vocabulary: &LabelVocabulary,
    issue: &RemoteIssue,
    options: AutolabelOptions,
) -> LabelingOutcome
where
    R: RepoApi + ?Sized,
{
    let comments = match repo.list_comments(issue.number).await {
        Ok(comments) => comments,
        Err(e) => {
            warn!(number = issue.number, error = %e, "Failed to fetch comments");
            return LabelingOutcome::CommentsFailed(e.to_string());
        }
    };
    debug!(number = issue.number, comments = comments.len(), "Fetched comments");

    let text = IssueText {
        title: issue.title.clone(),
        body: issue.body.clone(),
        comments: comments
            .into_iter()
            .map(|c| CommentText {
                author: c.author,
                body: c.body,
            })
            .collect(),
    };

    let labels = match suggester.suggest(&text, vocabulary).await {
        Suggestion::Accepted(labels) if labels.is_empty() => return LabelingOutcome::NoSuggestion,
        Suggestion::Accepted(labels) => labels,
        Suggestion::Exhausted {
            attempts,
            last_error,
        } => {
            return LabelingOutcome::Exhausted {
                attempts,
                last_error,
            }
        }
    };

    if options.dry_run {
        return LabelingOutcome::WouldApply(labels);
    }

    match repo.add_labels(issue.number, &labels).await {
        Ok(()) => {
            info!(number = issue.number, ?labels, "Applied labels");
            LabelingOutcome::Applied(labels)
        }
        Err(e) => {
            warn!(number = issue.number, error = %e, "Failed to apply labels");
            LabelingOutcome::ApplyFailed {
                labels,
                error: e.to_string(),
            }
        }
    }
}
