//! GitHub API client using octocrab

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ferry_core::{RateLimitSource, RateLimitState};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Page size used for every listing
pub(crate) const PER_PAGE: u8 = 100;

const GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// GitHub API client bound to one repository
#[derive(Clone)]
pub struct GitHubClient {
    client: Octocrab,
    /// Shared connection pool for GraphQL requests
    http: reqwest::Client,
    graphql_url: String,
    token: String,
    owner: String,
    repo: String,
}

/// Items from a paginated listing, with the failure that cut it short
#[derive(Debug)]
pub(crate) struct Listing<T> {
    pub items: Vec<T>,
    pub error: Option<Error>,
}

impl<T> Listing<T> {
    /// Everything fetched before any failure, which is logged
    pub fn keep_partial(self, what: &str) -> Vec<T> {
        if let Some(e) = &self.error {
            warn!(
                what,
                fetched = self.items.len(),
                error = %e,
                "Listing failed, keeping what was fetched"
            );
        }
        self.items
    }
}

#[derive(Debug, Deserialize)]
struct UserLogin {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
struct RateLimitResources {
    core: CoreRate,
}

#[derive(Debug, Deserialize)]
struct CoreRate {
    remaining: u64,
    /// Epoch seconds
    reset: i64,
}

impl GitHubClient {
    /// Create a new GitHub client for the specified repository
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Result<Self> {
        Self::build(token.into(), owner.into(), repo.into(), None)
    }

    /// Create a client for a GitHub-compatible API served at `base_uri`
    ///
    /// GraphQL requests go to `{base_uri}/graphql`.
    pub fn with_base_uri(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        base_uri: &str,
    ) -> Result<Self> {
        Self::build(token.into(), owner.into(), repo.into(), Some(base_uri))
    }

    fn build(token: String, owner: String, repo: String, base_uri: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.clone());
        if let Some(uri) = base_uri {
            builder = builder
                .base_uri(uri.to_string())
                .map_err(|e| Error::Parse(format!("Invalid API base URI {}: {}", uri, e)))?;
        }
        let client = builder
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        let http = reqwest::Client::builder().user_agent("repo-ferry").build()?;
        let graphql_url = base_uri.map_or_else(
            || GRAPHQL_URL.to_string(),
            |uri| format!("{}/graphql", uri.trim_end_matches('/')),
        );

        info!(owner = %owner, repo = %repo, "Created GitHub client");

        Ok(Self {
            client,
            http,
            graphql_url,
            token,
            owner,
            repo,
        })
    }

    /// Create a GitHub client from a repository URL
    ///
    /// Supports formats:
    /// - owner/repo
    /// - https://github.com/owner/repo
    /// - git@github.com:owner/repo.git
    pub fn from_url(token: impl Into<String>, url: &str) -> Result<Self> {
        let (owner, repo) = parse_github_url(url)?;
        Self::new(token, owner, repo)
    }

    /// Get the repository owner
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// REST route under this repository, e.g. `repo_route("labels")`
    pub(crate) fn repo_route(&self, path: &str) -> String {
        format!("/repos/{}/{}/{}", self.owner, self.repo, path)
    }

    /// Login of the token's owner
    pub async fn authenticated_user(&self) -> Result<String> {
        let user: UserLogin = self
            .client
            .get("/user", None::<&()>)
            .await
            .map_err(|e| match Error::from(e) {
                Error::Api(inner) => Error::Auth(format!("Invalid GitHub token: {}", inner)),
                other => other,
            })?;

        info!(login = %user.login, "Authenticated with GitHub");
        Ok(user.login)
    }

    /// Check that the repository exists and the token can see it
    pub async fn verify_access(&self) -> Result<()> {
        debug!(
            owner = %self.owner,
            repo = %self.repo,
            "Testing GitHub connection"
        );

        self.client
            .repos(&self.owner, &self.repo)
            .get()
            .await
            .map_err(|e| match Error::from(e) {
                Error::NotFound(_) => Error::NotFound(format!(
                    "Repository {}/{} not found or not accessible",
                    self.owner, self.repo
                )),
                other => other,
            })?;

        info!(repo = %self.full_name(), "Repository accessible");
        Ok(())
    }

    /// Fetch one JSON document from a REST route
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, route: &str) -> Result<T> {
        debug!(route, "GET");
        Ok(self.client.get(route, None::<&()>).await?)
    }

    /// Fetch every page of a REST listing that returns a bare array
    ///
    /// Stops at the first short page, or once `limit` items were collected.
    /// A failed page ends the listing and is returned next to the items
    /// fetched before it.
    pub(crate) async fn get_all_pages<T: DeserializeOwned>(
        &self,
        route: &str,
        params: &[(&str, &str)],
        limit: Option<usize>,
    ) -> Listing<T> {
        self.get_all_pages_with(route, params, limit, |items: Vec<T>| items)
            .await
    }

    /// Like [`get_all_pages`](Self::get_all_pages) for listings wrapped in an object
    pub(crate) async fn get_all_pages_with<W, T, F>(
        &self,
        route: &str,
        params: &[(&str, &str)],
        limit: Option<usize>,
        unwrap: F,
    ) -> Listing<T>
    where
        W: DeserializeOwned,
        F: Fn(W) -> Vec<T>,
    {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let page_str = page.to_string();
            let per_page = PER_PAGE.to_string();
            let mut query: Vec<(&str, &str)> = params.to_vec();
            query.push(("per_page", per_page.as_str()));
            query.push(("page", page_str.as_str()));

            debug!(route, page, "GET page");
            let wrapped: W = match self.client.get(route, Some(&query)).await {
                Ok(wrapped) => wrapped,
                Err(e) => {
                    return Listing {
                        items,
                        error: Some(e.into()),
                    }
                }
            };
            let batch = unwrap(wrapped);
            let short = batch.len() < usize::from(PER_PAGE);

            items.extend(batch);

            if let Some(max) = limit {
                if items.len() >= max {
                    items.truncate(max);
                    break;
                }
            }
            if short {
                break;
            }
            page += 1;
        }

        Listing { items, error: None }
    }
}

#[async_trait]
impl RateLimitSource for GitHubClient {
    type Error = Error;

    async fn rate_limit(&self) -> Result<RateLimitState> {
        let response: RateLimitResponse = self.get_json("/rate_limit").await?;
        let core = response.resources.core;
        let reset = DateTime::<Utc>::from_timestamp(core.reset, 0)
            .ok_or_else(|| Error::Parse(format!("Invalid rate limit reset: {}", core.reset)))?;

        Ok(RateLimitState {
            remaining: core.remaining,
            reset,
        })
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

/// Parse a GitHub URL into owner and repo
pub fn parse_github_url(url: &str) -> Result<(String, String)> {
    // Handle shorthand: owner/repo
    if !url.contains(':') && !url.contains('/') {
        return Err(Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            url
        )));
    }

    if !url.contains("://") && !url.contains('@') {
        let parts: Vec<&str> = url.split('/').collect();
        if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            return Ok((
                parts[0].to_string(),
                parts[1].trim_end_matches(".git").to_string(),
            ));
        }
        return Err(Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            url
        )));
    }

    // Handle HTTPS URL: https://github.com/owner/repo
    if url.starts_with("https://") || url.starts_with("http://") {
        let url = url::Url::parse(url).map_err(|e| Error::Parse(e.to_string()))?;
        let path = url.path().trim_start_matches('/').trim_end_matches(".git");
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() >= 2 {
            return Ok((parts[0].to_string(), parts[1].to_string()));
        }
        return Err(Error::Parse(format!("Invalid GitHub URL path: {}", path)));
    }

    // Handle SSH URL: git@github.com:owner/repo.git
    if url.starts_with("git@") {
        if let Some(path) = url.split(':').nth(1) {
            let path = path.trim_end_matches(".git");
            let parts: Vec<&str> = path.split('/').collect();
            if parts.len() >= 2 {
                return Ok((parts[0].to_string(), parts[1].to_string()));
            }
        }
        return Err(Error::Parse(format!("Invalid SSH URL: {}", url)));
    }

    Err(Error::Parse(format!("Unrecognized URL format: {}", url)))
}
