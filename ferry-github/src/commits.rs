//! Commit history scraping

use chrono::{DateTime, Utc};
use ferry_core::records::{CommitRecord, FileChangeRecord};
use ferry_core::{Clock, DataFile, RateLimitGuard};
use serde::Deserialize;
use tracing::{info, warn};

use crate::progress::{self, ProgressHandler};
use crate::{GitHubClient, Result};

/// Name/email/date triple on a git commit
#[derive(Debug, Default, Deserialize)]
pub(crate) struct GitIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitCommit {
    #[serde(default)]
    pub message: String,
    pub author: Option<GitIdentity>,
    pub committer: Option<GitIdentity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParentRef {
    pub sha: String,
}

/// Commit as returned by the commits endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommit {
    pub sha: String,
    pub commit: GitCommit,
    #[serde(default)]
    pub parents: Vec<ParentRef>,
    /// Only on single-commit responses
    pub files: Option<Vec<FileChangeRecord>>,
}

impl From<ApiCommit> for CommitRecord {
    fn from(api: ApiCommit) -> Self {
        let author = api.commit.author.unwrap_or_default();
        let committer = api.commit.committer.unwrap_or_default();

        CommitRecord {
            sha: api.sha,
            message: api.commit.message,
            author_name: author.name,
            author_email: author.email,
            author_date: author.date,
            committer_name: committer.name,
            committer_email: committer.email,
            committer_date: committer.date,
            parents: api.parents.into_iter().map(|p| p.sha).collect(),
            files_changed: api.files.map(|files| {
                files
                    .into_iter()
                    .map(|f| FileChangeRecord {
                        sha: None,
                        blob_url: None,
                        raw_url: None,
                        contents_url: None,
                        ..f
                    })
                    .collect()
            }),
        }
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}

impl GitHubClient {
    /// Fetch the commit history of the default branch, each commit with its files
    ///
    /// A failed listing keeps the commits listed before it. A failed detail
    /// fetch keeps the commit with an empty file list. `guard` runs after
    /// every commit.
    pub async fn scrape_commits<H>(
        &self,
        limit: Option<usize>,
        guard: &RateLimitGuard,
        clock: &dyn Clock,
        handler: &mut H,
    ) -> Result<Vec<CommitRecord>>
    where
        H: ProgressHandler + ?Sized,
    {
        info!(repo = %self.full_name(), "Fetching commit history");

        let listed: Vec<ApiCommit> = self
            .get_all_pages(&self.repo_route("commits"), &[], limit)
            .await
            .keep_partial("commits");

        let mut commits = Vec::with_capacity(listed.len());
        for summary in listed {
            let short = summary.sha.chars().take(7).collect::<String>();
            let title = first_line(&summary.commit.message).to_string();

            let detail_route = self.repo_route(&format!("commits/{}", summary.sha));
            let record = match self.get_json::<ApiCommit>(&detail_route).await {
                Ok(detail) => CommitRecord::from(detail),
                Err(e) => {
                    warn!(sha = %summary.sha, error = %e, "Failed to fetch commit files");
                    let mut record = CommitRecord::from(summary);
                    record.files_changed = Some(Vec::new());
                    record
                }
            };

            handler.on_fetched(DataFile::Commits, &format!("{} - {}", short, title));
            commits.push(record);

            progress::guard(guard, self, clock, handler).await?;
        }

        info!(count = commits.len(), "Fetched commits");
        Ok(commits)
    }
}
