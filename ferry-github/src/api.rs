//! Repository operations used by the populate and auto-label jobs
//!
//! The jobs only talk to [`RepoApi`], so they can run against a fake in tests.

use async_trait::async_trait;
use ferry_core::records::LabelRecord;
use ferry_core::RateLimitSource;
use octocrab::models::issues::{Comment as OctocrabComment, Issue as OctocrabIssue};
use tracing::debug;

use crate::{Error, GitHubClient, Result};

/// An issue as read back from the target repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIssue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub labels: Vec<String>,
    pub is_pull_request: bool,
}

impl From<OctocrabIssue> for RemoteIssue {
    fn from(issue: OctocrabIssue) -> Self {
        RemoteIssue {
            number: issue.number,
            title: issue.title,
            body: issue.body,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            is_pull_request: issue.pull_request.is_some(),
        }
    }
}

/// A comment as read back from the target repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteComment {
    pub author: String,
    pub body: String,
}

impl From<OctocrabComment> for RemoteComment {
    fn from(comment: OctocrabComment) -> Self {
        RemoteComment {
            author: comment.user.login,
            body: comment.body.unwrap_or_default(),
        }
    }
}

/// Fields for a new issue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
}

/// Hosting API surface for one repository
#[async_trait]
pub trait RepoApi: RateLimitSource<Error = Error> {
    /// `owner/repo`
    fn full_name(&self) -> String;

    /// Every label defined in the repository
    async fn list_labels(&self) -> Result<Vec<LabelRecord>>;

    /// Whether a label with exactly this name exists
    async fn label_exists(&self, name: &str) -> Result<bool>;

    async fn create_label(&self, label: &LabelRecord) -> Result<()>;

    /// Numbers of the issues matching a search query, in search order
    async fn search_issue_numbers(&self, query: &str) -> Result<Vec<u64>>;

    async fn get_issue(&self, number: u64) -> Result<RemoteIssue>;

    async fn list_comments(&self, number: u64) -> Result<Vec<RemoteComment>>;

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<()>;

    /// Create an issue and return its number
    async fn create_issue(&self, issue: &NewIssue) -> Result<u64>;

    async fn create_comment(&self, number: u64, body: &str) -> Result<()>;
}

#[async_trait]
impl RepoApi for GitHubClient {
    fn full_name(&self) -> String {
        GitHubClient::full_name(self)
    }

    async fn list_labels(&self) -> Result<Vec<LabelRecord>> {
        let first = self
            .client()
            .issues(self.owner(), self.repo())
            .list_labels_for_repo()
            .per_page(crate::client::PER_PAGE)
            .send()
            .await?;
        let labels = self.client().all_pages(first).await?;

        debug!(count = labels.len(), "Listed labels");

        Ok(labels
            .into_iter()
            .map(|l| LabelRecord {
                name: l.name,
                color: l.color,
                description: l.description,
            })
            .collect())
    }

    async fn label_exists(&self, name: &str) -> Result<bool> {
        match self
            .client()
            .issues(self.owner(), self.repo())
            .get_label(name)
            .await
            .map_err(Error::from)
        {
            Ok(_) => Ok(true),
            Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_label(&self, label: &LabelRecord) -> Result<()> {
        self.client()
            .issues(self.owner(), self.repo())
            .create_label(&label.name, &label.color, label.description_or_empty())
            .await?;
        Ok(())
    }

    async fn search_issue_numbers(&self, query: &str) -> Result<Vec<u64>> {
        let first = self
            .client()
            .search()
            .issues_and_pull_requests(query)
            .per_page(crate::client::PER_PAGE)
            .send()
            .await?;
        let issues = self.client().all_pages(first).await?;

        debug!(query, count = issues.len(), "Searched issues");

        Ok(issues.into_iter().map(|i| i.number).collect())
    }

    async fn get_issue(&self, number: u64) -> Result<RemoteIssue> {
        debug!(number, "Fetching issue");

        let issue = self
            .client()
            .issues(self.owner(), self.repo())
            .get(number)
            .await?;
        Ok(issue.into())
    }

    async fn list_comments(&self, number: u64) -> Result<Vec<RemoteComment>> {
        let first = self
            .client()
            .issues(self.owner(), self.repo())
            .list_comments(number)
            .per_page(crate::client::PER_PAGE)
            .send()
            .await?;
        let comments = self.client().all_pages(first).await?;
        Ok(comments.into_iter().map(RemoteComment::from).collect())
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        self.client()
            .issues(self.owner(), self.repo())
            .add_labels(number, labels)
            .await?;
        Ok(())
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<u64> {
        let handler = self.client().issues(self.owner(), self.repo());
        let mut builder = handler.create(&issue.title).body(&issue.body);

        if !issue.labels.is_empty() {
            builder = builder.labels(issue.labels.clone());
        }
        if !issue.assignees.is_empty() {
            builder = builder.assignees(issue.assignees.clone());
        }

        let created = builder.send().await?;
        Ok(created.number)
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        self.client()
            .issues(self.owner(), self.repo())
            .create_comment(number, body)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{comment_json, github_error, issue_json, label_json, mock_client};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_labels_maps_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/labels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                label_json("bug", "d73a4a"),
                label_json("enhancement", "a2eeef")
            ])))
            .mount(&server)
            .await;

        let labels = mock_client(&server).list_labels().await.unwrap();

        let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["bug", "enhancement"]);
        assert_eq!(labels[0].color, "d73a4a");
        assert!(labels[0].description.is_none());
    }

    #[tokio::test]
    async fn test_label_exists_treats_only_404_as_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/labels/bug"))
            .respond_with(ResponseTemplate::new(200).set_body_json(label_json("bug", "d73a4a")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/labels/docs"))
            .respond_with(github_error(404, "Not Found"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/labels/triage"))
            .respond_with(github_error(403, "Resource not accessible by integration"))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        assert!(client.label_exists("bug").await.unwrap());
        assert!(!client.label_exists("docs").await.unwrap());
        assert!(matches!(
            client.label_exists("triage").await,
            Err(Error::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_create_label_conflict_is_unprocessable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/labels"))
            .and(body_partial_json(json!({"name": "bug", "color": "d73a4a"})))
            .respond_with(github_error(422, "Validation Failed"))
            .mount(&server)
            .await;

        let label = LabelRecord {
            name: "bug".to_string(),
            color: "d73a4a".to_string(),
            description: None,
        };
        let err = mock_client(&server).create_label(&label).await.unwrap_err();

        assert!(matches!(err, Error::Unprocessable(ref m) if m == "Validation Failed"));
    }

    #[tokio::test]
    async fn test_search_returns_numbers_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param("q", "repo:owner/repo no:label type:issue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 2,
                "incomplete_results": false,
                "items": [issue_json(9, "Later", &[], false), issue_json(3, "Earlier", &[], false)]
            })))
            .mount(&server)
            .await;

        let numbers = mock_client(&server)
            .search_issue_numbers("repo:owner/repo no:label type:issue")
            .await
            .unwrap();

        assert_eq!(numbers, vec![9, 3]);
    }

    #[tokio::test]
    async fn test_get_issue_flags_pull_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/issues/5"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(issue_json(5, "Bump deps", &["deps"], true)),
            )
            .mount(&server)
            .await;

        let issue = mock_client(&server).get_issue(5).await.unwrap();

        assert_eq!(issue.title, "Bump deps");
        assert_eq!(issue.labels, vec!["deps"]);
        assert!(issue.is_pull_request);
    }

    #[tokio::test]
    async fn test_list_comments_maps_author_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/issues/5/comments"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([comment_json(1, "hubot", "Reproduced")])),
            )
            .mount(&server)
            .await;

        let comments = mock_client(&server).list_comments(5).await.unwrap();

        assert_eq!(
            comments,
            vec![RemoteComment {
                author: "hubot".to_string(),
                body: "Reproduced".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_create_issue_sends_fields_and_returns_number() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/issues"))
            .and(body_partial_json(json!({
                "title": "Crash on start",
                "body": "Details",
                "labels": ["bug"]
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(issue_json(17, "Crash on start", &["bug"], false)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let number = mock_client(&server)
            .create_issue(&NewIssue {
                title: "Crash on start".to_string(),
                body: "Details".to_string(),
                labels: vec!["bug".to_string()],
                assignees: vec![],
            })
            .await
            .unwrap();

        assert_eq!(number, 17);
    }

    #[tokio::test]
    async fn test_create_issue_when_issues_disabled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/issues"))
            .respond_with(github_error(410, "Issues are disabled for this repo"))
            .mount(&server)
            .await;

        let err = mock_client(&server)
            .create_issue(&NewIssue {
                title: "Crash".to_string(),
                ..NewIssue::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Gone(_)));
    }

    #[tokio::test]
    async fn test_add_labels_and_comment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/issues/17/labels"))
            .and(body_partial_json(json!({"labels": ["bug", "enhancement"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                label_json("bug", "d73a4a"),
                label_json("enhancement", "a2eeef")
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/issues/17/comments"))
            .and(body_partial_json(json!({"body": "Thanks"})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(comment_json(3, "ferry-bot", "Thanks")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        client
            .add_labels(17, &["bug".to_string(), "enhancement".to_string()])
            .await
            .unwrap();
        client.create_comment(17, "Thanks").await.unwrap();
    }
}
