//! Console output for scrape and job progress

use std::time::Duration;

use ferry_core::records::{IssueRecord, LabelRecord};
use ferry_core::DataFile;
use ferry_github::{
    Error, IssueOutcome, LabelOutcome, LabelingOutcome, ProgressHandler, RemoteIssue,
};

/// Prints one line per handled item to stdout
#[derive(Debug, Default)]
pub struct PrintProgress;

impl ProgressHandler for PrintProgress {
    fn on_fetched(&mut self, file: DataFile, item: &str) {
        println!("Fetched {} {}", kind(file), item);
    }

    fn on_discussions_disabled(&mut self) {
        println!("Discussions are not enabled for this repository.");
    }

    fn on_target_labels(&mut self, count: usize) {
        println!("Found {} labels in the target repository.", count);
        if count == 0 {
            println!("Warning: No labels found in the target repository.");
        }
    }

    fn on_target_labels_failed(&mut self, error: &Error) {
        println!(
            "Error fetching labels from target repo: {}. Issues will be created without labels.",
            error
        );
    }

    fn on_label(&mut self, label: &LabelRecord, outcome: &LabelOutcome) {
        match outcome {
            LabelOutcome::Nameless => println!("Skipping label data with no name."),
            LabelOutcome::Exists => {
                println!("Label '{}' already exists. Skipping creation.", label.name)
            }
            LabelOutcome::Created => println!(
                "Created label '{}' (Color: {})",
                label.name, label.color
            ),
            LabelOutcome::Rejected(message) => println!(
                "Label '{}' might already exist or has invalid data: {}",
                label.name, message
            ),
            LabelOutcome::Forbidden(_) => println!(
                "Permission denied: the GitHub token cannot create labels. \
                 Ensure it has the 'repo' scope."
            ),
            LabelOutcome::Failed(error) => {
                println!("Unexpected error creating label '{}': {}", label.name, error)
            }
            LabelOutcome::CheckFailed(error) => println!(
                "Error checking existence of label '{}': {}",
                label.name, error
            ),
        }
    }

    fn on_issue(&mut self, record: &IssueRecord, title: &str, outcome: &IssueOutcome) {
        match outcome {
            IssueOutcome::PullRequest => {
                println!("Skipping original #{}: it is a pull request", record.number)
            }
            IssueOutcome::Created { number } => println!(
                "Created issue #{} from original #{}: '{}'",
                number, record.number, title
            ),
            IssueOutcome::Forbidden(_) => println!(
                "Permission denied (403): the GitHub token cannot create issues. \
                 Ensure it has the 'repo' scope or write access to issues."
            ),
            IssueOutcome::Invalid(message) => {
                println!("Validation failed (422) for issue '{}': {}", title, message)
            }
            IssueOutcome::Disabled(message) => println!(
                "Issues are disabled (410) for the target repository: {}",
                message
            ),
            IssueOutcome::Failed(error) => {
                println!("Unexpected error creating issue '{}': {}", title, error)
            }
        }
    }

    fn on_labels_replay_failed(&mut self, number: u64, labels: &[String], error: &Error) {
        println!(
            "    Error adding labels {:?} to issue #{}: {}",
            labels, number, error
        );
    }

    fn on_comment_replay_failed(&mut self, number: u64, comment_id: u64, error: &Error) {
        println!(
            "    Error adding comment (original ID {}) to issue #{}: {}",
            comment_id, number, error
        );
    }

    fn on_candidates(&mut self, count: usize) {
        println!("Found {} unlabeled issues.", count);
    }

    fn on_labeling(&mut self, issue: &RemoteIssue, outcome: &LabelingOutcome) {
        println!("\nIssue #{}: '{}'", issue.number, issue.title);
        match outcome {
            LabelingOutcome::Applied(labels) => println!("  Applied labels: {}", labels.join(", ")),
            LabelingOutcome::WouldApply(labels) => {
                println!("  Would apply labels: {}", labels.join(", "))
            }
            LabelingOutcome::NoSuggestion => println!("  No suitable labels suggested."),
            LabelingOutcome::Exhausted {
                attempts,
                last_error,
            } => println!("  Giving up after {} attempts: {}", attempts, last_error),
            LabelingOutcome::CommentsFailed(error) => {
                println!("  Error fetching comments: {}", error)
            }
            LabelingOutcome::ApplyFailed { labels, error } => println!(
                "  Error applying labels {}: {}",
                labels.join(", "),
                error
            ),
        }
    }

    fn on_rate_limit_pause(&mut self, slept: Duration) {
        println!(
            "Rate limit almost reached. Slept for {:.2} seconds.",
            slept.as_secs_f64()
        );
    }
}

fn kind(file: DataFile) -> &'static str {
    match file {
        DataFile::Issues => "issue",
        DataFile::Labels => "label",
        DataFile::PullRequests => "PR",
        DataFile::Commits => "commit",
        DataFile::Discussions => "discussion",
        DataFile::WorkflowRuns => "workflow",
        DataFile::StructureAnalysis => "entry",
    }
}
