//! Discussion scraping over the GraphQL API
//!
//! The REST API has no discussion endpoints.

use chrono::{DateTime, Utc};
use ferry_core::records::{DiscussionCommentRecord, DiscussionRecord};
use ferry_core::DataFile;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::progress::ProgressHandler;
use crate::{Error, GitHubClient, Result};

const DISCUSSIONS_QUERY: &str = r#"
    query($owner: String!, $repo: String!, $cursor: String) {
        repository(owner: $owner, name: $repo) {
            hasDiscussionsEnabled
            discussions(first: 50, after: $cursor) {
                pageInfo {
                    hasNextPage
                    endCursor
                }
                nodes {
                    id
                    number
                    title
                    body
                    author { login }
                    createdAt
                    updatedAt
                    comments(first: 100) {
                        nodes {
                            id
                            body
                            author { login }
                            createdAt
                            updatedAt
                        }
                    }
                }
            }
        }
    }
"#;

/// GraphQL query response wrapper
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DiscussionsData {
    repository: Option<RepositoryData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryData {
    has_discussions_enabled: bool,
    discussions: DiscussionConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscussionConnection {
    page_info: PageInfo,
    nodes: Vec<DiscussionNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Actor {
    login: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscussionNode {
    id: String,
    number: u64,
    title: String,
    #[serde(default)]
    body: String,
    author: Option<Actor>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    comments: CommentConnection,
}

#[derive(Debug, Deserialize)]
struct CommentConnection {
    nodes: Vec<CommentNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    id: String,
    #[serde(default)]
    body: String,
    author: Option<Actor>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

/// Deleted accounts come back as a null author
fn login_or_unknown(actor: Option<Actor>) -> String {
    actor.map(|a| a.login).unwrap_or_else(|| "N/A".to_string())
}

impl From<DiscussionNode> for DiscussionRecord {
    fn from(node: DiscussionNode) -> Self {
        let comments: Vec<DiscussionCommentRecord> = node
            .comments
            .nodes
            .into_iter()
            .map(|c| DiscussionCommentRecord {
                id: c.id,
                body: c.body,
                user: login_or_unknown(c.author),
                created_at: c.created_at,
                updated_at: c.updated_at,
            })
            .collect();

        DiscussionRecord {
            id: node.id,
            number: node.number,
            title: node.title,
            body: node.body,
            user: login_or_unknown(node.author),
            created_at: node.created_at,
            updated_at: node.updated_at,
            comments_count: comments.len(),
            comments_data: comments,
        }
    }
}

impl GitHubClient {
    /// Fetch discussions with their comments
    ///
    /// A repository with discussions turned off yields an empty list.
    pub async fn scrape_discussions<H>(
        &self,
        limit: Option<usize>,
        handler: &mut H,
    ) -> Result<Vec<DiscussionRecord>>
    where
        H: ProgressHandler + ?Sized,
    {
        info!(repo = %self.full_name(), "Fetching discussions");

        let mut discussions = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let variables = json!({
                "owner": self.owner(),
                "repo": self.repo(),
                "cursor": cursor,
            });

            let data = match self
                .graphql_query::<DiscussionsData>(DISCUSSIONS_QUERY, &variables)
                .await
            {
                Ok(data) => data,
                Err(e) if discussions.is_empty() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "Failed to fetch discussions page, keeping what was fetched");
                    break;
                }
            };

            let repository = data.repository.ok_or_else(|| {
                Error::NotFound(format!("Repository {} not found", self.full_name()))
            })?;

            if !repository.has_discussions_enabled {
                info!(repo = %self.full_name(), "Discussions are not enabled");
                handler.on_discussions_disabled();
                return Ok(Vec::new());
            }

            let connection = repository.discussions;
            for node in connection.nodes {
                let record = DiscussionRecord::from(node);
                handler.on_fetched(
                    DataFile::Discussions,
                    &format!(
                        "#{} {} ({} comments)",
                        record.number, record.title, record.comments_count
                    ),
                );
                discussions.push(record);
            }

            if let Some(max) = limit {
                if discussions.len() >= max {
                    discussions.truncate(max);
                    break;
                }
            }
            if !connection.page_info.has_next_page {
                break;
            }
            cursor = connection.page_info.end_cursor;
        }

        info!(count = discussions.len(), "Fetched discussions");
        Ok(discussions)
    }

    /// Execute a GraphQL query
    async fn graphql_query<T: for<'de> Deserialize<'de>>(
        &self,
        query: &str,
        variables: &serde_json::Value,
    ) -> Result<T> {
        debug!("Sending GraphQL query");

        let request_body = json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .http()
            .post(self.graphql_url())
            .bearer_auth(self.token())
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            return Err(Error::from_status(status.as_u16(), text.clone()).unwrap_or_else(|| {
                Error::Other(format!(
                    "GraphQL request failed with status {}: {}",
                    status, text
                ))
            }));
        }

        let graphql_response: GraphQLResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Failed to parse GraphQL response: {}", e)))?;

        parse_graphql_response(graphql_response)
    }
}

fn parse_graphql_response<T>(response: GraphQLResponse<T>) -> Result<T> {
    if let Some(errors) = response.errors {
        if !errors.is_empty() {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::Other(format!("GraphQL errors: {}", messages.join(", "))));
        }
    }

    response
        .data
        .ok_or_else(|| Error::Parse("No data in GraphQL response".to_string()))
}
