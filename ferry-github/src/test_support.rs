//! HTTP fixtures for tests that run the client against a mock server

use serde_json::{json, Value};
use wiremock::{MockServer, ResponseTemplate};

use crate::GitHubClient;

/// Client for `owner/repo` talking to `server`
pub(crate) fn mock_client(server: &MockServer) -> GitHubClient {
    GitHubClient::with_base_uri("ghp_test", "owner", "repo", &server.uri()).unwrap()
}

/// GitHub-style error response
pub(crate) fn github_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest"
    }))
}

pub(crate) fn author_json(login: &str) -> Value {
    json!({
        "login": login,
        "id": 1,
        "node_id": "MDQ6VXNlcjE=",
        "avatar_url": "https://github.com/images/error/octocat_happy.gif",
        "gravatar_id": "",
        "url": format!("https://api.github.com/users/{}", login),
        "html_url": format!("https://github.com/{}", login),
        "followers_url": format!("https://api.github.com/users/{}/followers", login),
        "following_url": format!("https://api.github.com/users/{}/following{{/other_user}}", login),
        "gists_url": format!("https://api.github.com/users/{}/gists{{/gist_id}}", login),
        "starred_url": format!("https://api.github.com/users/{}/starred{{/owner}}{{/repo}}", login),
        "subscriptions_url": format!("https://api.github.com/users/{}/subscriptions", login),
        "organizations_url": format!("https://api.github.com/users/{}/orgs", login),
        "repos_url": format!("https://api.github.com/users/{}/repos", login),
        "events_url": format!("https://api.github.com/users/{}/events{{/privacy}}", login),
        "received_events_url": format!("https://api.github.com/users/{}/received_events", login),
        "type": "User",
        "site_admin": false
    })
}

pub(crate) fn label_json(name: &str, color: &str) -> Value {
    json!({
        "id": 208045946,
        "node_id": "MDU6TGFiZWwyMDgwNDU5NDY=",
        "url": format!("https://api.github.com/repos/owner/repo/labels/{}", name),
        "name": name,
        "description": null,
        "color": color,
        "default": false
    })
}

/// Issue `number` with the given labels; `pull_request` marks it as a PR
pub(crate) fn issue_json(number: u64, title: &str, labels: &[&str], pull_request: bool) -> Value {
    let base = "https://api.github.com/repos/owner/repo";
    let mut issue = json!({
        "id": 2000 + number,
        "node_id": "I_kwDO",
        "url": format!("{}/issues/{}", base, number),
        "repository_url": base,
        "labels_url": format!("{}/issues/{}/labels{{/name}}", base, number),
        "comments_url": format!("{}/issues/{}/comments", base, number),
        "events_url": format!("{}/issues/{}/events", base, number),
        "html_url": format!("https://github.com/owner/repo/issues/{}", number),
        "number": number,
        "state": "open",
        "title": title,
        "body": "Steps to reproduce",
        "user": author_json("octocat"),
        "labels": labels.iter().map(|l| label_json(l, "ededed")).collect::<Vec<_>>(),
        "assignees": [],
        "locked": false,
        "comments": 0,
        "closed_at": null,
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-02T10:00:00Z",
        "author_association": "NONE"
    });
    if pull_request {
        issue["pull_request"] = json!({
            "url": format!("{}/pulls/{}", base, number),
            "html_url": format!("https://github.com/owner/repo/pull/{}", number),
            "diff_url": format!("https://github.com/owner/repo/pull/{}.diff", number),
            "patch_url": format!("https://github.com/owner/repo/pull/{}.patch", number)
        });
    }
    issue
}

pub(crate) fn comment_json(id: u64, login: &str, body: &str) -> Value {
    let base = "https://api.github.com/repos/owner/repo";
    json!({
        "id": id,
        "node_id": "IC_kwDO",
        "url": format!("{}/issues/comments/{}", base, id),
        "html_url": format!("https://github.com/owner/repo/issues/1#issuecomment-{}", id),
        "issue_url": format!("{}/issues/1", base),
        "body": body,
        "user": author_json(login),
        "author_association": "NONE",
        "created_at": "2024-03-01T11:00:00Z",
        "updated_at": "2024-03-01T12:00:00Z"
    })
}

pub(crate) fn rate_limit_json(remaining: u64, reset: i64) -> Value {
    json!({
        "resources": {"core": {"limit": 5000, "used": 5000 - remaining, "remaining": remaining, "reset": reset}},
        "rate": {"limit": 5000, "used": 5000 - remaining, "remaining": remaining, "reset": reset}
    })
}
