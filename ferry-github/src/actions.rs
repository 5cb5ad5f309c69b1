//! GitHub Actions workflow run scraping

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ferry_core::records::{JobRecord, WorkflowRunRecord};
use ferry_core::{Clock, DataFile, RateLimitGuard};
use serde::Deserialize;
use tracing::{info, warn};

use crate::progress::{self, ProgressHandler};
use crate::{GitHubClient, Result};

const UNKNOWN: &str = "N/A";

#[derive(Debug, Deserialize)]
struct Login {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RunsPage {
    workflow_runs: Vec<ApiRun>,
}

#[derive(Debug, Deserialize)]
struct ApiRun {
    id: u64,
    run_number: u64,
    name: Option<String>,
    display_title: Option<String>,
    status: Option<String>,
    conclusion: Option<String>,
    event: String,
    head_branch: Option<String>,
    head_sha: String,
    actor: Option<Login>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    run_started_at: Option<DateTime<Utc>>,
    html_url: String,
    workflow_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiWorkflow {
    name: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct JobsPage {
    jobs: Vec<ApiJob>,
}

#[derive(Debug, Deserialize)]
struct ApiJob {
    id: u64,
    name: String,
    status: String,
    conclusion: Option<String>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    html_url: Option<String>,
    #[serde(default)]
    steps: Vec<serde_json::Value>,
}

impl From<ApiJob> for JobRecord {
    fn from(job: ApiJob) -> Self {
        JobRecord {
            job_id: job.id,
            job_name: job.name,
            status: job.status,
            conclusion: job.conclusion,
            started_at: job.started_at,
            completed_at: job.completed_at,
            html_url: job.html_url,
            steps_count: job.steps.len(),
        }
    }
}

fn run_record(run: ApiRun, workflow: Option<&ApiWorkflow>) -> WorkflowRunRecord {
    WorkflowRunRecord {
        run_id: run.id,
        run_number: run.run_number,
        run_name: run.name,
        run_display_title: run.display_title,
        status: run.status,
        conclusion: run.conclusion,
        event: run.event,
        branch: run.head_branch,
        commit_sha: run.head_sha,
        actor: run.actor.map(|a| a.login).unwrap_or_else(|| UNKNOWN.to_string()),
        created_at: run.created_at,
        updated_at: run.updated_at,
        run_started_at: run.run_started_at,
        html_url: run.html_url,
        workflow_id: run.workflow_id,
        workflow_path: workflow.map_or_else(|| UNKNOWN.to_string(), |w| w.path.clone()),
        workflow_name: workflow.map_or_else(|| UNKNOWN.to_string(), |w| w.name.clone()),
        jobs: Vec::new(),
    }
}

impl GitHubClient {
    /// Fetch workflow runs with their workflow file and jobs
    ///
    /// Workflow lookups are cached per workflow id; a failed lookup leaves the
    /// path and name as `N/A`. Failed listings keep what they returned
    /// before the failure. `guard` runs after every run.
    pub async fn scrape_workflow_runs<H>(
        &self,
        limit: Option<usize>,
        guard: &RateLimitGuard,
        clock: &dyn Clock,
        handler: &mut H,
    ) -> Result<Vec<WorkflowRunRecord>>
    where
        H: ProgressHandler + ?Sized,
    {
        info!(repo = %self.full_name(), "Fetching workflow runs");

        let runs: Vec<ApiRun> = self
            .get_all_pages_with(
                &self.repo_route("actions/runs"),
                &[],
                limit,
                |page: RunsPage| page.workflow_runs,
            )
            .await
            .keep_partial("workflow runs");

        let mut workflows: HashMap<u64, Option<ApiWorkflow>> = HashMap::new();
        let mut records = Vec::with_capacity(runs.len());

        for run in runs {
            let workflow_id = run.workflow_id;
            if !workflows.contains_key(&workflow_id) {
                let route = self.repo_route(&format!("actions/workflows/{}", workflow_id));
                let workflow = match self.get_json::<ApiWorkflow>(&route).await {
                    Ok(w) => Some(w),
                    Err(e) => {
                        warn!(workflow_id, error = %e, "Could not fetch workflow details");
                        None
                    }
                };
                workflows.insert(workflow_id, workflow);
            }

            let run_id = run.id;
            let workflow = workflows.get(&workflow_id).and_then(Option::as_ref);
            let mut record = run_record(run, workflow);
            record.jobs = self.run_jobs(run_id).await;

            handler.on_fetched(
                DataFile::WorkflowRuns,
                &format!(
                    "run {} ({}, {} jobs)",
                    run_id,
                    record.workflow_name,
                    record.jobs.len()
                ),
            );
            records.push(record);

            progress::guard(guard, self, clock, handler).await?;
        }

        info!(count = records.len(), "Fetched workflow runs");
        Ok(records)
    }

    async fn run_jobs(&self, run_id: u64) -> Vec<JobRecord> {
        let route = self.repo_route(&format!("actions/runs/{}/jobs", run_id));
        self.get_all_pages_with(&route, &[], None, |page: JobsPage| page.jobs)
            .await
            .keep_partial("jobs")
            .into_iter()
            .map(JobRecord::from)
            .collect()
    }
}
