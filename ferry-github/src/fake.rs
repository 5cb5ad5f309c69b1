//! In-memory [`RepoApi`] used by the job tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ferry_core::records::LabelRecord;
use ferry_core::{RateLimitSource, RateLimitState};

use crate::api::{NewIssue, RemoteComment, RemoteIssue, RepoApi};
use crate::{Error, Result};

#[derive(Default)]
pub(crate) struct FakeState {
    pub labels: Vec<LabelRecord>,
    pub issues: Vec<RemoteIssue>,
    pub comments: HashMap<u64, Vec<RemoteComment>>,
    pub search_results: Vec<u64>,
    pub queries: Vec<String>,
    pub created_issues: Vec<(u64, NewIssue)>,
    pub created_comments: Vec<(u64, String)>,
    pub applied_labels: Vec<(u64, Vec<String>)>,
    /// Label name -> status returned by `create_label`
    pub label_failures: HashMap<String, u16>,
    /// Issue title -> status returned by `create_issue`
    pub issue_failures: HashMap<String, u16>,
    /// Status returned by `label_exists` for every name
    pub existence_failure: Option<u16>,
    /// Status returned by `add_labels` for every issue
    pub add_labels_failure: Option<u16>,
    /// Status returned by the rate-limit query
    pub rate_limit_failure: Option<u16>,
    pub rate_limit_checks: usize,
}

pub(crate) struct FakeRepo {
    pub state: Mutex<FakeState>,
    rate: RateLimitState,
}

fn status_error(status: u16) -> Error {
    Error::from_status(status, format!("status {}", status))
        .unwrap_or_else(|| Error::Other(format!("status {}", status)))
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::with_rate_limit(5000, DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn with_rate_limit(remaining: u64, reset: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
            rate: RateLimitState { remaining, reset },
        }
    }

    pub fn with_labels(self, names: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for name in names {
                state.labels.push(label(name));
            }
        }
        self
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

pub(crate) fn label(name: &str) -> LabelRecord {
    LabelRecord {
        name: name.to_string(),
        color: "ededed".to_string(),
        description: None,
    }
}

#[async_trait]
impl RateLimitSource for FakeRepo {
    type Error = Error;

    async fn rate_limit(&self) -> Result<RateLimitState> {
        let mut state = self.state();
        state.rate_limit_checks += 1;
        if let Some(status) = state.rate_limit_failure {
            return Err(status_error(status));
        }
        Ok(self.rate)
    }
}

#[async_trait]
impl RepoApi for FakeRepo {
    fn full_name(&self) -> String {
        "kcharvi/firecrawl-with-ai-agents".to_string()
    }

    async fn list_labels(&self) -> Result<Vec<LabelRecord>> {
        Ok(self.state().labels.clone())
    }

    async fn label_exists(&self, name: &str) -> Result<bool> {
        let state = self.state();
        if let Some(status) = state.existence_failure {
            return Err(status_error(status));
        }
        Ok(state.labels.iter().any(|l| l.name == name))
    }

    async fn create_label(&self, label: &LabelRecord) -> Result<()> {
        let mut state = self.state();
        if let Some(status) = state.label_failures.get(&label.name) {
            return Err(status_error(*status));
        }
        state.labels.push(label.clone());
        Ok(())
    }

    async fn search_issue_numbers(&self, query: &str) -> Result<Vec<u64>> {
        let mut state = self.state();
        state.queries.push(query.to_string());
        Ok(state.search_results.clone())
    }

    async fn get_issue(&self, number: u64) -> Result<RemoteIssue> {
        self.state()
            .issues
            .iter()
            .find(|i| i.number == number)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("issue {}", number)))
    }

    async fn list_comments(&self, number: u64) -> Result<Vec<RemoteComment>> {
        Ok(self.state().comments.get(&number).cloned().unwrap_or_default())
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        let mut state = self.state();
        if let Some(status) = state.add_labels_failure {
            return Err(status_error(status));
        }
        state.applied_labels.push((number, labels.to_vec()));
        if let Some(issue) = state.issues.iter_mut().find(|i| i.number == number) {
            issue.labels.extend(labels.iter().cloned());
        }
        Ok(())
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<u64> {
        let mut state = self.state();
        if let Some(status) = state.issue_failures.get(&issue.title) {
            return Err(status_error(*status));
        }
        let number = 100 + state.created_issues.len() as u64;
        state.created_issues.push((number, issue.clone()));
        Ok(number)
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        self.state().created_comments.push((number, body.to_string()));
        Ok(())
    }
}
