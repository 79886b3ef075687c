use chrono::{DateTime, Utc};
use log::debug;
use reqwest::{
    blocking::{Client, Response},
    header::{ACCEPT, USER_AGENT},
    StatusCode,
};
use serde::Deserialize;

use crate::{
    error::GitHubApiError,
    models::{Commit, Job, JobList, WorkflowRun},
};

use super::{DataSource, RunQuery};

const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Talks to the GitHub REST API directly. Unauthenticated requests are heavily rate limited,
/// so a `GITHUB_TOKEN` from the environment is used when present.
pub struct RestApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct RunList {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Deserialize)]
struct RestCommit {
    sha: String,
    commit: RestCommitDetail,
}

#[derive(Deserialize)]
struct RestCommitDetail {
    author: RestCommitAuthor,
}

#[derive(Deserialize)]
struct RestCommitAuthor {
    date: DateTime<Utc>,
}

impl RestApi {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_env() -> Self {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());
        Self::new(DEFAULT_BASE_URL, token)
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, GitHubApiError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {url} {query:?}");

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(
                USER_AGENT,
                concat!("xarray-upstream-checker/", env!("CARGO_PKG_VERSION")),
            )
            .query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok());
        check_status(response.status(), remaining, url)?;
        Ok(response)
    }
}

/// Map an error status to the matching error. GitHub answers 403 both for an exhausted
/// quota and for missing permissions; only the former carries a zero remaining quota.
fn check_status(
    status: StatusCode,
    rate_limit_remaining: Option<&str>,
    url: String,
) -> Result<(), GitHubApiError> {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Err(GitHubApiError::RateLimited),
        StatusCode::FORBIDDEN if rate_limit_remaining == Some("0") => {
            Err(GitHubApiError::RateLimited)
        }
        StatusCode::NOT_FOUND => Err(GitHubApiError::NotFound(url)),
        status if !status.is_success() => Err(GitHubApiError::Status {
            status: status.as_u16(),
            url,
        }),
        _ => Ok(()),
    }
}

impl DataSource for RestApi {
    fn list_runs(&self, query: &RunQuery) -> Result<Vec<WorkflowRun>, GitHubApiError> {
        let mut params = vec![("per_page", query.limit.to_string())];
        if let Some(event) = &query.event {
            params.push(("event", event.as_str().to_string()));
        }
        if let Some(branch) = query.branch {
            params.push(("branch", branch.to_string()));
        }

        let path = format!(
            "repos/{}/actions/workflows/{}/runs",
            query.repo, query.workflow
        );
        Ok(self.get(&path, &params)?.json::<RunList>()?.workflow_runs)
    }

    fn list_jobs(&self, repo: &str, run_id: u64) -> Result<Vec<Job>, GitHubApiError> {
        let path = format!("repos/{repo}/actions/runs/{run_id}/jobs");
        Ok(self.get(&path, &[])?.json::<JobList>()?.jobs)
    }

    fn job_log(&self, repo: &str, job_id: u64) -> Result<String, GitHubApiError> {
        /* Responds with a redirect to the log blob, which the client follows */
        let path = format!("repos/{repo}/actions/jobs/{job_id}/logs");
        Ok(self.get(&path, &[])?.text()?)
    }

    fn latest_commit(&self, repo: &str, branch: &str) -> Result<Commit, GitHubApiError> {
        let path = format!("repos/{repo}/commits");
        let commits = self
            .get(
                &path,
                &[("sha", branch.to_string()), ("per_page", "1".to_string())],
            )?
            .json::<Vec<RestCommit>>()?;

        commits
            .into_iter()
            .next()
            .map(|c| Commit {
                sha: c.sha,
                date: c.commit.author.date,
            })
            .ok_or_else(|| GitHubApiError::NotFound(format!("{repo}@{branch}")))
    }
}
