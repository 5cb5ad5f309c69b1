//! Ferry GitHub - GitHub integration for repo-ferry
//!
//! This crate scrapes repository metadata into ferry records, replays those
//! records into a target repository, and runs the label suggestion engine
//! over a repository's unlabeled issues.

mod actions;
pub mod api;
pub mod autolabel;
mod client;
mod commits;
mod discussions;
mod error;
mod issues;
pub mod populate;
pub mod progress;
mod pulls;

#[cfg(test)]
mod fake;
#[cfg(test)]
mod test_support;

pub use api::{NewIssue, RemoteComment, RemoteIssue, RepoApi};
pub use autolabel::{autolabel, AutolabelOptions, AutolabelSummary};
pub use client::{parse_github_url, GitHubClient};
pub use error::{Error, Result};
pub use populate::{populate_issues, populate_labels, IssueOptions, IssueSummary, LabelSummary};
pub use progress::{IssueOutcome, LabelOutcome, LabelingOutcome, ProgressHandler, Silent};
