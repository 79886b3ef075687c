use crate::{
    error::GitHubApiError,
    models::{Commit, Job, RunEvent, WorkflowRun},
};

pub mod gh_cli;
pub mod rest;

pub use gh_cli::{GhCli, GhStatus};
pub use rest::RestApi;

/// Filters for listing the runs of one workflow.
#[derive(Clone, Debug)]
pub struct RunQuery<'a> {
    pub repo: &'a str,
    pub workflow: &'a str,
    pub event: Option<RunEvent>,
    pub branch: Option<&'a str>,
    pub limit: u32,
}

/// Everything the checker needs from GitHub. Each method maps to exactly one external call.
pub trait DataSource {
    /// Runs of a workflow, most recent first.
    fn list_runs(&self, query: &RunQuery) -> Result<Vec<WorkflowRun>, GitHubApiError>;

    fn list_jobs(&self, repo: &str, run_id: u64) -> Result<Vec<Job>, GitHubApiError>;

    /// The raw text log of one job.
    fn job_log(&self, repo: &str, job_id: u64) -> Result<String, GitHubApiError>;

    fn latest_commit(&self, repo: &str, branch: &str) -> Result<Commit, GitHubApiError>;
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn list_runs(&self, query: &RunQuery) -> Result<Vec<WorkflowRun>, GitHubApiError> {
        (**self).list_runs(query)
    }

    fn list_jobs(&self, repo: &str, run_id: u64) -> Result<Vec<Job>, GitHubApiError> {
        (**self).list_jobs(repo, run_id)
    }

    fn job_log(&self, repo: &str, job_id: u64) -> Result<String, GitHubApiError> {
        (**self).job_log(repo, job_id)
    }

    fn latest_commit(&self, repo: &str, branch: &str) -> Result<Commit, GitHubApiError> {
        (**self).latest_commit(repo, branch)
    }
}
