//! Pull request scraping with commits, files and review comments

use chrono::{DateTime, Utc};
use ferry_core::records::{
    CommitRecord, FileChangeRecord, ItemState, PullRequestRecord, ReviewCommentRecord,
};
use ferry_core::{Clock, DataFile, RateLimitGuard};
use serde::Deserialize;
use tracing::{info, warn};

use crate::commits::ApiCommit;
use crate::progress::{self, ProgressHandler};
use crate::{GitHubClient, Result};

#[derive(Debug, Deserialize)]
struct Login {
    login: String,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct PullSummary {
    number: u64,
}

/// Single pull request response; list responses lack the counters
#[derive(Debug, Deserialize)]
struct ApiPullRequest {
    id: u64,
    number: u64,
    title: Option<String>,
    body: Option<String>,
    state: String,
    #[serde(default)]
    merged: bool,
    #[serde(default)]
    draft: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    merged_at: Option<DateTime<Utc>>,
    user: Option<Login>,
    #[serde(default)]
    assignees: Vec<Login>,
    #[serde(default)]
    labels: Vec<Named>,
    head: Option<BranchRef>,
    base: Option<BranchRef>,
    commits: Option<u64>,
    additions: Option<u64>,
    deletions: Option<u64>,
    changed_files: Option<u64>,
}

impl From<ApiPullRequest> for PullRequestRecord {
    fn from(pr: ApiPullRequest) -> Self {
        PullRequestRecord {
            id: pr.id,
            number: pr.number,
            title: pr.title,
            body: pr.body,
            state: if pr.state == "closed" {
                ItemState::Closed
            } else {
                ItemState::Open
            },
            merged: pr.merged,
            draft: pr.draft,
            created_at: pr.created_at,
            updated_at: pr.updated_at,
            closed_at: pr.closed_at,
            merged_at: pr.merged_at,
            user: pr.user.map(|u| u.login),
            assignees: pr.assignees.into_iter().map(|a| a.login).collect(),
            labels: pr.labels.into_iter().map(|l| l.name).collect(),
            source_branch: pr.head.map(|h| h.name),
            target_branch: pr.base.map(|b| b.name),
            commits_count: pr.commits,
            additions: pr.additions,
            deletions: pr.deletions,
            changed_files: pr.changed_files,
            commits_data: Vec::new(),
            files_changed_data: Vec::new(),
            review_comments_data: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiReviewComment {
    id: u64,
    user: Option<Login>,
    #[serde(default)]
    body: String,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    path: String,
    position: Option<u64>,
    original_position: Option<u64>,
    commit_id: String,
    #[serde(default)]
    diff_hunk: String,
}

impl From<ApiReviewComment> for ReviewCommentRecord {
    fn from(c: ApiReviewComment) -> Self {
        ReviewCommentRecord {
            id: c.id,
            user: c.user.map(|u| u.login).unwrap_or_else(|| "N/A".to_string()),
            body: c.body,
            created_at: c.created_at,
            updated_at: c.updated_at,
            path: c.path,
            position: c.position,
            original_position: c.original_position,
            commit_id: c.commit_id,
            diff_hunk: c.diff_hunk,
        }
    }
}

impl GitHubClient {
    /// Fetch pull requests in every state with their commits, files and review comments
    ///
    /// A failed listing keeps the pull requests listed before it. Sub-list
    /// failures keep what those lists returned. A failure to fetch one pull
    /// request in detail stops the scrape and keeps what was fetched before
    /// it. `guard` runs after every pull request.
    pub async fn scrape_pull_requests<H>(
        &self,
        limit: Option<usize>,
        guard: &RateLimitGuard,
        clock: &dyn Clock,
        handler: &mut H,
    ) -> Result<Vec<PullRequestRecord>>
    where
        H: ProgressHandler + ?Sized,
    {
        info!(repo = %self.full_name(), "Fetching pull requests");

        let summaries: Vec<PullSummary> = self
            .get_all_pages(&self.repo_route("pulls"), &[("state", "all")], limit)
            .await
            .keep_partial("pull requests");

        let mut pulls = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let number = summary.number;
            let detail: ApiPullRequest = match self
                .get_json(&self.repo_route(&format!("pulls/{}", number)))
                .await
            {
                Ok(detail) => detail,
                Err(e) => {
                    warn!(number, error = %e, "Failed to fetch pull request, stopping");
                    break;
                }
            };

            let mut record = PullRequestRecord::from(detail);
            record.commits_data = self.pull_commits(number).await;
            record.files_changed_data = self.pull_files(number).await;
            record.review_comments_data = self.pull_review_comments(number).await;

            handler.on_fetched(
                DataFile::PullRequests,
                &format!(
                    "#{} ({} commits, {} files, {} review comments)",
                    number,
                    record.commits_data.len(),
                    record.files_changed_data.len(),
                    record.review_comments_data.len()
                ),
            );
            pulls.push(record);

            progress::guard(guard, self, clock, handler).await?;
        }

        info!(count = pulls.len(), "Fetched pull requests");
        Ok(pulls)
    }

    async fn pull_commits(&self, number: u64) -> Vec<CommitRecord> {
        let route = self.repo_route(&format!("pulls/{}/commits", number));
        self.get_all_pages::<ApiCommit>(&route, &[], None)
            .await
            .keep_partial("pull request commits")
            .into_iter()
            .map(CommitRecord::from)
            .collect()
    }

    async fn pull_files(&self, number: u64) -> Vec<FileChangeRecord> {
        let route = self.repo_route(&format!("pulls/{}/files", number));
        self.get_all_pages(&route, &[], None)
            .await
            .keep_partial("pull request files")
    }

    async fn pull_review_comments(&self, number: u64) -> Vec<ReviewCommentRecord> {
        let route = self.repo_route(&format!("pulls/{}/comments", number));
        self.get_all_pages::<ApiReviewComment>(&route, &[], None)
            .await
            .keep_partial("review comments")
            .into_iter()
            .map(ReviewCommentRecord::from)
            .collect()
    }
}
