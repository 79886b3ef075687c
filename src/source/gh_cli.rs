use std::{io, process::Command};

use log::debug;
use serde::de::DeserializeOwned;

use crate::{
    error::GitHubApiError,
    models::{Commit, Job, JobList, WorkflowRun},
};

use super::{DataSource, RunQuery};

const RUN_FIELDS: &str =
    "databaseId,number,headBranch,headSha,status,conclusion,createdAt,updatedAt,event";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhStatus {
    Missing,
    Unauthenticated,
    Ready,
}

/// Fetches data by shelling out to the GitHub CLI, which handles authentication.
#[derive(Clone, Debug)]
pub struct GhCli {
    program: String,
}

impl Default for GhCli {
    fn default() -> Self {
        Self::with_program("gh")
    }
}

impl GhCli {
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// Check whether gh is installed and logged in.
    pub fn probe(&self) -> GhStatus {
        match Command::new(&self.program).arg("--version").output() {
            Ok(output) if output.status.success() => {}
            _ => return GhStatus::Missing,
        }

        match Command::new(&self.program).args(["auth", "status"]).output() {
            Ok(output) if output.status.success() => GhStatus::Ready,
            _ => GhStatus::Unauthenticated,
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, GitHubApiError> {
        debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => GitHubApiError::NotInstalled,
                _ => GitHubApiError::Io(e),
            })?;

        if !output.status.success() {
            return Err(GitHubApiError::from_gh_stderr(&String::from_utf8_lossy(
                &output.stderr,
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, GitHubApiError> {
        Ok(serde_json::from_str(&self.run(args)?)?)
    }
}

impl DataSource for GhCli {
    fn list_runs(&self, query: &RunQuery) -> Result<Vec<WorkflowRun>, GitHubApiError> {
        let limit = query.limit.to_string();
        let mut args = vec![
            "run",
            "list",
            "--repo",
            query.repo,
            "--workflow",
            query.workflow,
            "--limit",
            &limit,
            "--json",
            RUN_FIELDS,
        ];
        if let Some(event) = &query.event {
            args.extend(["--event", event.as_str()]);
        }
        if let Some(branch) = query.branch {
            args.extend(["--branch", branch]);
        }

        self.run_json(&args)
    }

    fn list_jobs(&self, repo: &str, run_id: u64) -> Result<Vec<Job>, GitHubApiError> {
        let run_id = run_id.to_string();
        let list: JobList =
            self.run_json(&["run", "view", &run_id, "--repo", repo, "--json", "jobs"])?;
        Ok(list.jobs)
    }

    fn job_log(&self, repo: &str, job_id: u64) -> Result<String, GitHubApiError> {
        self.run(&["api", &format!("repos/{repo}/actions/jobs/{job_id}/logs")])
    }

    fn latest_commit(&self, repo: &str, branch: &str) -> Result<Commit, GitHubApiError> {
        self.run_json(&[
            "api",
            &format!("repos/{repo}/commits?sha={branch}&per_page=1"),
            "--jq",
            ".[0] | {sha: .sha, date: .commit.author.date}",
        ])
    }
}
