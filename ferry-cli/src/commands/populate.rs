//! Populate commands

use clap::{Args, Subcommand};
use ferry_core::records::{IssueRecord, LabelRecord};
use ferry_core::{Config, DataFile, JsonStore, RateLimitGuard, Secrets, SystemClock};
use ferry_github::{populate_issues, populate_labels, IssueOptions};

use crate::progress::PrintProgress;

/// Recreate scraped records in the target repository
#[derive(Args, Debug)]
pub struct PopulateArgs {
    #[command(subcommand)]
    pub command: PopulateCommand,
}

#[derive(Subcommand, Debug)]
pub enum PopulateCommand {
    /// Create labels from the scraped label list
    Labels,

    /// Create issues, with labels and comments, from the scraped issue list
    Issues,
}

impl PopulateArgs {
    /// Execute the populate command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        match self.command {
            PopulateCommand::Labels => run_labels(config).await,
            PopulateCommand::Issues => run_issues(config).await,
        }
    }
}

async fn run_labels(config: &Config) -> anyhow::Result<()> {
    let store = JsonStore::new(&config.paths.data_dir);
    println!(
        "Loading scraped labels data from {}...",
        store.path(DataFile::Labels).display()
    );
    let labels: Vec<LabelRecord> = store.read(DataFile::Labels)?;
    println!("Successfully loaded {} labels from JSON.", labels.len());

    let secrets = Secrets::load()?;
    let client = super::connect(config.target_repo()?, &secrets).await?;

    println!("\nCreating labels in {}...", client.full_name());
    let summary = populate_labels(
        &client,
        &labels,
        &RateLimitGuard::label_population(),
        &SystemClock,
        &mut PrintProgress,
    )
    .await?;

    println!("\n--- Summary ---");
    println!("Total labels processed from JSON: {}", summary.processed);
    println!("Labels successfully created in target repo: {}", summary.created);
    println!("Labels skipped (already exist or no name): {}", summary.skipped);
    println!("Errors during creation: {}", summary.errors);
    if summary.stopped_early {
        println!("Stopped early: permission denied");
    }
    println!("---------------");

    Ok(())
}

async fn run_issues(config: &Config) -> anyhow::Result<()> {
    let store = JsonStore::new(&config.paths.data_dir);
    println!(
        "Loading issues data from {}...",
        store.path(DataFile::Issues).display()
    );
    let issues: Vec<IssueRecord> = store.read(DataFile::Issues)?;
    println!("Successfully loaded {} issues from JSON.", issues.len());

    let options = IssueOptions {
        source_repo: config.source_repo()?.to_string(),
    };

    let secrets = Secrets::load()?;
    let client = super::connect(config.target_repo()?, &secrets).await?;

    println!("\n--- Creating issues in {} ---", client.full_name());
    let summary = populate_issues(
        &client,
        &issues,
        &options,
        &RateLimitGuard::issue_population(),
        &SystemClock,
        &mut PrintProgress,
    )
    .await?;

    println!("\nIssue Creation Summary:");
    println!("Total issues processed from JSON: {}", summary.processed);
    println!("Original PRs skipped: {}", summary.pull_requests_skipped);
    println!("Issues successfully created in target repo: {}", summary.created);
    println!("Comments added to issues: {}", summary.comments_added);
    println!("Labels added to issues: {}", summary.labels_added);
    println!("Errors during issue creation: {}", summary.errors);
    if summary.stopped_early {
        println!("Stopped early: permission denied");
    }
    println!("--------------------------------------------------");

    Ok(())
}
