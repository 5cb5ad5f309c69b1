//! CLI command implementations

pub mod analyze;
pub mod autolabel;
pub mod populate;
pub mod scrape;

pub use analyze::AnalyzeArgs;
pub use autolabel::AutolabelArgs;
pub use populate::PopulateArgs;
pub use scrape::ScrapeArgs;

use ferry_core::Secrets;
use ferry_github::GitHubClient;

/// Authenticate and check that `repo` is reachable
///
/// Every failure here is fatal for the command.
pub(crate) async fn connect(repo: &str, secrets: &Secrets) -> anyhow::Result<GitHubClient> {
    let token = secrets.require_github_token()?;
    let client = GitHubClient::from_url(token, repo)?;

    let login = client
        .authenticated_user()
        .await
        .map_err(|e| anyhow::anyhow!("Error authenticating with GitHub. Check your token: {}", e))?;
    println!("Authenticated as: {}", login);

    client.verify_access().await.map_err(|e| {
        anyhow::anyhow!(
            "Error accessing repository {}: {}. Check the name and the token's permissions.",
            client.full_name(),
            e
        )
    })?;
    println!("Accessing repository: {}", client.full_name());

    Ok(client)
}
