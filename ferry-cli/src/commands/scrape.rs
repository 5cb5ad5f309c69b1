//! Scrape commands

use clap::{Args, ValueEnum};
use ferry_core::{Config, DataFile, JsonStore, RateLimitGuard, Secrets, SystemClock};
use ferry_github::GitHubClient;
use serde::Serialize;

use crate::progress::PrintProgress;

/// Fetch metadata from the source repository
#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// What to fetch
    #[arg(value_enum)]
    pub kind: ScrapeKind,

    /// Stop after this many top-level items
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScrapeKind {
    Issues,
    Labels,
    Pulls,
    Commits,
    Discussions,
    Actions,
    /// Every kind above, one after another
    All,
}

impl ScrapeKind {
    const EACH: [ScrapeKind; 6] = [
        ScrapeKind::Issues,
        ScrapeKind::Labels,
        ScrapeKind::Pulls,
        ScrapeKind::Commits,
        ScrapeKind::Discussions,
        ScrapeKind::Actions,
    ];

    fn data_file(self) -> Option<DataFile> {
        match self {
            ScrapeKind::Issues => Some(DataFile::Issues),
            ScrapeKind::Labels => Some(DataFile::Labels),
            ScrapeKind::Pulls => Some(DataFile::PullRequests),
            ScrapeKind::Commits => Some(DataFile::Commits),
            ScrapeKind::Discussions => Some(DataFile::Discussions),
            ScrapeKind::Actions => Some(DataFile::WorkflowRuns),
            ScrapeKind::All => None,
        }
    }
}

impl ScrapeArgs {
    /// Execute the scrape command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let secrets = Secrets::load()?;
        let client = super::connect(config.source_repo()?, &secrets).await?;
        let store = JsonStore::new(&config.paths.data_dir);

        let kinds: &[ScrapeKind] = if self.kind == ScrapeKind::All {
            &ScrapeKind::EACH
        } else {
            std::slice::from_ref(&self.kind)
        };

        for kind in kinds {
            scrape_one(&client, &store, *kind, self.limit).await?;
        }

        Ok(())
    }
}

async fn scrape_one(
    client: &GitHubClient,
    store: &JsonStore,
    kind: ScrapeKind,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let Some(file) = kind.data_file() else {
        return Ok(());
    };

    println!("Fetching {:?} from {}...", kind, client.full_name());

    let guard = RateLimitGuard::scraping();
    let clock = SystemClock;
    let mut progress = PrintProgress;

    match kind {
        ScrapeKind::Issues => {
            let issues = client
                .scrape_issues(limit, &guard, &clock, &mut progress)
                .await?;
            save(store, file, &issues)
        }
        ScrapeKind::Labels => save(store, file, &client.scrape_labels(&mut progress).await?),
        ScrapeKind::Pulls => {
            let pulls = client
                .scrape_pull_requests(limit, &guard, &clock, &mut progress)
                .await?;
            save(store, file, &pulls)
        }
        ScrapeKind::Commits => {
            let commits = client
                .scrape_commits(limit, &guard, &clock, &mut progress)
                .await?;
            save(store, file, &commits)
        }
        ScrapeKind::Discussions => {
            let discussions = client.scrape_discussions(limit, &mut progress).await?;
            save(store, file, &discussions)
        }
        ScrapeKind::Actions => {
            let runs = client
                .scrape_workflow_runs(limit, &guard, &clock, &mut progress)
                .await?;
            save(store, file, &runs)
        }
        ScrapeKind::All => Ok(()),
    }
}

fn save<T: Serialize>(store: &JsonStore, file: DataFile, records: &[T]) -> anyhow::Result<()> {
    let path = store.write(file, records)?;
    println!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_file() {
        for kind in ScrapeKind::EACH {
            assert!(kind.data_file().is_some());
        }
        assert!(ScrapeKind::All.data_file().is_none());
    }
}
