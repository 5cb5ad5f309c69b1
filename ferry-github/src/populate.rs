//! Replay scraped labels and issues into a target repository

use ferry_core::records::{CommentRecord, IssueRecord, LabelRecord};
use ferry_core::text::strip_mentions;
use ferry_core::{Clock, LabelVocabulary, RateLimitGuard};
use tracing::{debug, error, info, warn};

use crate::api::{NewIssue, RepoApi};
use crate::progress::{self, IssueOutcome, LabelOutcome, ProgressHandler};
use crate::{Error, Result};

const DEFAULT_TITLE: &str = "No Title Provided";
const DEFAULT_BODY: &str = "No body provided.";

/// Tally of a label population run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSummary {
    pub processed: usize,
    pub created: usize,
    /// Already present, nameless, or rejected as a duplicate (422)
    pub skipped: usize,
    pub errors: usize,
    /// The token lacked permission and the remaining labels were not attempted
    pub stopped_early: bool,
}

/// Tally of an issue population run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueSummary {
    pub processed: usize,
    pub pull_requests_skipped: usize,
    pub created: usize,
    pub comments_added: usize,
    pub labels_added: usize,
    pub errors: usize,
    pub stopped_early: bool,
}

/// Create every scraped label that the target repository lacks
///
/// Running this twice against the same repository creates nothing the second
/// time. A 403 on creation stops the batch.
pub async fn populate_labels<R, H>(
    repo: &R,
    labels: &[LabelRecord],
    guard: &RateLimitGuard,
    clock: &dyn Clock,
    handler: &mut H,
) -> Result<LabelSummary>
where
    R: RepoApi + ?Sized,
    H: ProgressHandler + ?Sized,
{
    info!(repo = %repo.full_name(), count = labels.len(), "Populating labels");
    let mut summary = LabelSummary::default();

    for label in labels {
        summary.processed += 1;

        if label.name.is_empty() {
            handler.on_label(label, &LabelOutcome::Nameless);
            summary.skipped += 1;
            continue;
        }

        let outcome = match repo.label_exists(&label.name).await {
            Ok(true) => LabelOutcome::Exists,
            Ok(false) => match repo.create_label(label).await {
                Ok(()) => LabelOutcome::Created,
                Err(Error::Forbidden(message)) => {
                    error!(label = %label.name, %message, "Permission denied creating label");
                    LabelOutcome::Forbidden(message)
                }
                Err(Error::Unprocessable(message)) => LabelOutcome::Rejected(message),
                Err(e) => {
                    warn!(label = %label.name, error = %e, "Failed to create label");
                    LabelOutcome::Failed(e.to_string())
                }
            },
            Err(e) => {
                // Only a 404 means absent; anything else leaves existence unknown
                warn!(label = %label.name, error = %e, "Failed to check label");
                LabelOutcome::CheckFailed(e.to_string())
            }
        };
        handler.on_label(label, &outcome);

        match outcome {
            LabelOutcome::Created => summary.created += 1,
            LabelOutcome::Nameless | LabelOutcome::Exists | LabelOutcome::Rejected(_) => {
                summary.skipped += 1
            }
            LabelOutcome::Forbidden(_) => {
                summary.errors += 1;
                summary.stopped_early = true;
                break;
            }
            LabelOutcome::Failed(_) | LabelOutcome::CheckFailed(_) => summary.errors += 1,
        }

        progress::guard(guard, repo, clock, handler).await?;
    }

    info!(?summary, "Label population finished");
    Ok(summary)
}

/// Options for [`populate_issues`]
#[derive(Debug, Clone)]
pub struct IssueOptions {
    /// `owner/repo` the records were scraped from, named in the provenance footer
    pub source_repo: String,
}

/// Body of the recreated issue: sanitized original plus a provenance footer
pub fn issue_body(record: &IssueRecord, source_repo: &str) -> String {
    let body = record.body.as_deref().unwrap_or(DEFAULT_BODY);
    format!(
        "{}\n\n---\n*Originally from {} #{} by `@{}` on {}*\n",
        strip_mentions(body),
        source_repo,
        record.number,
        record.user,
        record.created_at.to_rfc3339()
    )
}

/// Title of the recreated issue
pub fn issue_title(record: &IssueRecord) -> String {
    if record.title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        strip_mentions(&record.title)
    }
}

/// Replayed comment with an attribution header
pub fn comment_body(comment: &CommentRecord) -> String {
    format!(
        "**{} commented on {} (Original)**:\n\n{}",
        comment.user,
        comment.created_at.to_rfc3339(),
        strip_mentions(&comment.body)
    )
}

/// Recreate scraped issues, their labels and comments in the target repository
///
/// Pull requests are skipped. Only labels already defined in the target are
/// applied. A 403 on issue creation stops the batch.
pub async fn populate_issues<R, H>(
    repo: &R,
    records: &[IssueRecord],
    options: &IssueOptions,
    guard: &RateLimitGuard,
    clock: &dyn Clock,
    handler: &mut H,
) -> Result<IssueSummary>
where
    R: RepoApi + ?Sized,
    H: ProgressHandler + ?Sized,
{
    info!(repo = %repo.full_name(), count = records.len(), "Populating issues");

    let vocabulary: LabelVocabulary = match repo.list_labels().await {
        Ok(labels) => labels.into_iter().map(|l| l.name).collect(),
        Err(e) => {
            warn!(error = %e, "Failed to fetch target labels, creating issues without labels");
            handler.on_target_labels_failed(&e);
            LabelVocabulary::default()
        }
    };
    handler.on_target_labels(vocabulary.len());

    let mut summary = IssueSummary::default();

    for record in records {
        summary.processed += 1;

        if record.is_pull_request {
            debug!(number = record.number, "Skipping pull request");
            handler.on_issue(record, &record.title, &IssueOutcome::PullRequest);
            summary.pull_requests_skipped += 1;
            continue;
        }

        let new_issue = NewIssue {
            title: issue_title(record),
            body: issue_body(record, &options.source_repo),
            ..NewIssue::default()
        };

        let outcome = match repo.create_issue(&new_issue).await {
            Ok(number) => IssueOutcome::Created { number },
            Err(Error::Forbidden(message)) => {
                error!(number = record.number, %message, "Permission denied creating issue");
                IssueOutcome::Forbidden(message)
            }
            Err(Error::Unprocessable(message)) => IssueOutcome::Invalid(message),
            Err(Error::Gone(message)) => IssueOutcome::Disabled(message),
            Err(e) => {
                warn!(number = record.number, error = %e, "Failed to create issue");
                IssueOutcome::Failed(e.to_string())
            }
        };
        handler.on_issue(record, &new_issue.title, &outcome);

        match outcome {
            IssueOutcome::Created { number } => {
                summary.created += 1;
                replay_labels(repo, record, number, &vocabulary, &mut summary, handler).await;
                replay_comments(repo, record, number, &mut summary, handler).await;
            }
            IssueOutcome::Forbidden(_) => {
                summary.errors += 1;
                summary.stopped_early = true;
                break;
            }
            IssueOutcome::PullRequest => {}
            IssueOutcome::Invalid(_) | IssueOutcome::Disabled(_) | IssueOutcome::Failed(_) => {
                summary.errors += 1
            }
        }

        progress::guard(guard, repo, clock, handler).await?;
    }

    info!(?summary, "Issue population finished");
    Ok(summary)
}

async fn replay_labels<R, H>(
    repo: &R,
    record: &IssueRecord,
    number: u64,
    vocabulary: &LabelVocabulary,
    summary: &mut IssueSummary,
    handler: &mut H,
) where
    R: RepoApi + ?Sized,
    H: ProgressHandler + ?Sized,
{
    let labels: Vec<String> = record
        .labels
        .iter()
        .filter(|l| vocabulary.contains(l))
        .cloned()
        .collect();
    if labels.is_empty() {
        return;
    }

    match repo.add_labels(number, &labels).await {
        Ok(()) => summary.labels_added += labels.len(),
        Err(e) => {
            warn!(number, error = %e, "Failed to add labels");
            handler.on_labels_replay_failed(number, &labels, &e);
        }
    }
}

async fn replay_comments<R, H>(
    repo: &R,
    record: &IssueRecord,
    number: u64,
    summary: &mut IssueSummary,
    handler: &mut H,
) where
    R: RepoApi + ?Sized,
    H: ProgressHandler + ?Sized,
{
    for comment in &record.comments_data {
        match repo.create_comment(number, &comment_body(comment)).await {
            Ok(()) => summary.comments_added += 1,
            Err(e) => {
                warn!(number, comment_id = comment.id, error = %e, "Failed to add comment");
                handler.on_comment_replay_failed(number, comment.id, &e);
            }
        }
    }
}
