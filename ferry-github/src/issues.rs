//! Issue and label scraping

use ferry_core::records::{CommentRecord, IssueRecord, ItemState, LabelRecord};
use ferry_core::{Clock, DataFile, RateLimitGuard};
use octocrab::models::issues::{Comment as OctocrabComment, Issue as OctocrabIssue};
use tracing::{debug, info, warn};

use crate::client::PER_PAGE;
use crate::progress::{self, ProgressHandler};
use crate::{GitHubClient, Result};

fn item_state(state: octocrab::models::IssueState) -> ItemState {
    match state {
        octocrab::models::IssueState::Closed => ItemState::Closed,
        _ => ItemState::Open,
    }
}

fn comment_record(comment: OctocrabComment) -> CommentRecord {
    CommentRecord {
        id: comment.id.into_inner(),
        user: comment.user.login,
        body: comment.body.unwrap_or_default(),
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

/// Build a record from an issue, without its comments
pub(crate) fn issue_record(issue: OctocrabIssue) -> IssueRecord {
    IssueRecord {
        id: issue.id.into_inner(),
        number: issue.number,
        title: issue.title,
        body: issue.body,
        state: item_state(issue.state),
        created_at: issue.created_at,
        updated_at: Some(issue.updated_at),
        closed_at: issue.closed_at,
        user: issue.user.login,
        assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
        labels: issue.labels.into_iter().map(|l| l.name).collect(),
        comments_count: issue.comments,
        comments_data: Vec::new(),
        is_pull_request: issue.pull_request.is_some(),
    }
}

impl GitHubClient {
    /// Fetch issues in every state, each with its comments
    ///
    /// Pull requests show up here too and are flagged with `is_pull_request`.
    /// A failed page ends the listing; what was fetched so far is returned.
    /// `guard` runs after every issue, since each may cost a comment listing.
    pub async fn scrape_issues<H>(
        &self,
        limit: Option<usize>,
        guard: &RateLimitGuard,
        clock: &dyn Clock,
        handler: &mut H,
    ) -> Result<Vec<IssueRecord>>
    where
        H: ProgressHandler + ?Sized,
    {
        info!(repo = %self.full_name(), "Fetching issues");

        let mut issues = Vec::new();
        let mut page = 1u32;

        'pages: loop {
            let result = self
                .client()
                .issues(self.owner(), self.repo())
                .list()
                .state(octocrab::params::State::All)
                .per_page(PER_PAGE)
                .page(page)
                .send()
                .await;

            let items = match result {
                Ok(p) => p.items,
                Err(e) => {
                    warn!(page, error = %e, "Failed to list issues, keeping what was fetched");
                    break;
                }
            };
            let short = items.len() < usize::from(PER_PAGE);

            for issue in items {
                let mut record = issue_record(issue);
                if record.comments_count > 0 {
                    record.comments_data = self.issue_comments(record.number).await;
                }
                debug!(
                    number = record.number,
                    comments = record.comments_data.len(),
                    "Fetched issue"
                );
                handler.on_fetched(
                    DataFile::Issues,
                    &format!(
                        "#{} {} ({} comments)",
                        record.number,
                        record.title,
                        record.comments_data.len()
                    ),
                );
                issues.push(record);

                if limit.is_some_and(|max| issues.len() >= max) {
                    break 'pages;
                }
                progress::guard(guard, self, clock, handler).await?;
            }

            if short {
                break;
            }
            page += 1;
        }

        info!(count = issues.len(), "Fetched issues");
        Ok(issues)
    }

    /// Comments on one issue; a failure is logged and yields an empty list
    async fn issue_comments(&self, number: u64) -> Vec<CommentRecord> {
        let first = match self
            .client()
            .issues(self.owner(), self.repo())
            .list_comments(number)
            .per_page(PER_PAGE)
            .send()
            .await
        {
            Ok(page) => page,
            Err(e) => {
                warn!(number, error = %e, "Failed to fetch comments");
                return Vec::new();
            }
        };

        match self.client().all_pages(first).await {
            Ok(comments) => comments.into_iter().map(comment_record).collect(),
            Err(e) => {
                warn!(number, error = %e, "Failed to fetch comments");
                Vec::new()
            }
        }
    }

    /// Fetch every label of the repository
    pub async fn scrape_labels<H>(&self, handler: &mut H) -> Result<Vec<LabelRecord>>
    where
        H: ProgressHandler + ?Sized,
    {
        info!(repo = %self.full_name(), "Fetching labels");

        let labels = crate::RepoApi::list_labels(self).await?;
        for label in &labels {
            handler.on_fetched(DataFile::Labels, &format!("{} (#{})", label.name, label.color));
        }

        info!(count = labels.len(), "Fetched labels");
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Silent;
    use crate::test_support::{comment_json, github_error, issue_json, mock_client, rate_limit_json};
    use chrono::{TimeZone, Utc};
    use ferry_core::clock::ManualClock;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ISSUE_JSON: &str = r#"{
        "id": 2101,
        "node_id": "I_kwDO",
        "url": "https://api.github.com/repos/mendableai/firecrawl/issues/42",
        "repository_url": "https://api.github.com/repos/mendableai/firecrawl",
        "labels_url": "https://api.github.com/repos/mendableai/firecrawl/issues/42/labels{/name}",
        "comments_url": "https://api.github.com/repos/mendableai/firecrawl/issues/42/comments",
        "events_url": "https://api.github.com/repos/mendableai/firecrawl/issues/42/events",
        "html_url": "https://github.com/mendableai/firecrawl/issues/42",
        "number": 42,
        "state": "closed",
        "title": "Crawler ignores robots.txt",
        "body": "Steps to reproduce",
        "user": {
            "login": "octocat",
            "id": 1,
            "node_id": "MDQ6VXNlcjE=",
            "avatar_url": "https://github.com/images/error/octocat_happy.gif",
            "gravatar_id": "",
            "url": "https://api.github.com/users/octocat",
            "html_url": "https://github.com/octocat",
            "followers_url": "https://api.github.com/users/octocat/followers",
            "following_url": "https://api.github.com/users/octocat/following{/other_user}",
            "gists_url": "https://api.github.com/users/octocat/gists{/gist_id}",
            "starred_url": "https://api.github.com/users/octocat/starred{/owner}{/repo}",
            "subscriptions_url": "https://api.github.com/users/octocat/subscriptions",
            "organizations_url": "https://api.github.com/users/octocat/orgs",
            "repos_url": "https://api.github.com/users/octocat/repos",
            "events_url": "https://api.github.com/users/octocat/events{/privacy}",
            "received_events_url": "https://api.github.com/users/octocat/received_events",
            "type": "User",
            "site_admin": false
        },
        "labels": [{
            "id": 208045946,
            "node_id": "MDU6TGFiZWwyMDgwNDU5NDY=",
            "url": "https://api.github.com/repos/mendableai/firecrawl/labels/bug",
            "name": "bug",
            "description": "Something isn't working",
            "color": "f29513",
            "default": true
        }],
        "assignees": [],
        "locked": false,
        "comments": 3,
        "closed_at": "2024-03-03T10:00:00Z",
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-02T10:00:00Z",
        "author_association": "NONE"
    }"#;

    #[test]
    fn test_issue_record_from_api_issue() {
        let issue: OctocrabIssue = serde_json::from_str(ISSUE_JSON).unwrap();
        let record = issue_record(issue);

        assert_eq!(record.id, 2101);
        assert_eq!(record.number, 42);
        assert_eq!(record.state, ItemState::Closed);
        assert_eq!(record.user, "octocat");
        assert_eq!(record.labels, vec!["bug".to_string()]);
        assert_eq!(record.comments_count, 3);
        assert!(record.comments_data.is_empty());
        assert!(record.closed_at.is_some());
        assert!(!record.is_pull_request);
    }

    #[test]
    fn test_comment_record_from_api_comment() {
        let comment: OctocrabComment =
            serde_json::from_value(comment_json(7, "hubot", "Confirmed on 1.2")).unwrap();
        let record = comment_record(comment);

        assert_eq!(record.id, 7);
        assert_eq!(record.user, "hubot");
        assert_eq!(record.body, "Confirmed on 1.2");
        assert_eq!(
            record.created_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap()
        );
        assert!(record.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_scrape_issues_attaches_comments_and_guards() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let server = MockServer::start().await;

        let mut commented = issue_json(1, "Crash on start", &["bug"], false);
        commented["comments"] = json!(1);
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/issues"))
            .and(query_param("state", "all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                commented,
                issue_json(2, "Add retries", &[], true)
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/issues/1/comments"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([comment_json(9, "hubot", "Same here")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rate_limit"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(rate_limit_json(4, (now + chrono::Duration::seconds(20)).timestamp())),
            )
            .mount(&server)
            .await;

        let clock = ManualClock::new(now);
        let issues = mock_client(&server)
            .scrape_issues(None, &RateLimitGuard::scraping(), &clock, &mut Silent)
            .await
            .unwrap();

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].comments_data[0].user, "hubot");
        assert!(issues[1].is_pull_request);
        assert!(issues[1].comments_data.is_empty());
        // the first pause outlasts the reset, so the second check passes
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(30)]);
    }

    #[tokio::test]
    async fn test_scrape_issues_keeps_issues_when_comments_fail() {
        let server = MockServer::start().await;
        let mut commented = issue_json(3, "Timeout", &[], false);
        commented["comments"] = json!(2);
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([commented])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/issues/3/comments"))
            .respond_with(github_error(404, "Not Found"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rate_limit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rate_limit_json(5000, 0)))
            .mount(&server)
            .await;

        let clock = ManualClock::default();
        let issues = mock_client(&server)
            .scrape_issues(None, &RateLimitGuard::scraping(), &clock, &mut Silent)
            .await
            .unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].comments_count, 2);
        assert!(issues[0].comments_data.is_empty());
        assert!(clock.sleeps().is_empty());
    }
}
