use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    analysis::{
        classify::{categorize_all, classify, CategorizedFailure, Classified},
        freshness::{assess, FreshnessCheck},
        log_parser::{parse, ParsedLog},
        selection::{candidates, select_job, select_run, Pass},
    },
    config::CheckerConfig,
    error::GitHubApiError,
    models::{Conclusion, Job, RunEvent, WorkflowRun},
    source::{DataSource, RunQuery},
};

/// Overall verdict for the inspected job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckStatus {
    Passed,
    DependencyFailures,
    OtherFailures,
    MixedFailures,
    /// The job failed but no FAILED lines could be found in its log.
    FailedUnknown,
    /// The log was empty or could not be fetched, so neither the version nor failures could
    /// be determined.
    LogUnavailable,
}

impl CheckStatus {
    pub fn derive(conclusion: &Conclusion, classified: &Classified) -> Self {
        match (
            classified.dependency_related.is_empty(),
            classified.other.is_empty(),
        ) {
            (false, true) => CheckStatus::DependencyFailures,
            (true, false) => CheckStatus::OtherFailures,
            (false, false) => CheckStatus::MixedFailures,
            (true, true) if *conclusion == Conclusion::Failure => CheckStatus::FailedUnknown,
            (true, true) => CheckStatus::Passed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckResult {
    pub run: WorkflowRun,
    pub job: Job,
    pub dependency_version: Option<String>,
    pub failures: Vec<CategorizedFailure>,
    pub error_types: Vec<String>,
    pub status: CheckStatus,
    pub freshness: Option<FreshnessCheck>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum CheckOutcome {
    Checked(CheckResult),
    /// No run in either pass had executed.
    NoEligibleRun,
    /// Runs had executed, but none had an upstream-dev test job that ran. Carries the most
    /// recent such run.
    NoMatchingJob { run: WorkflowRun },
}

enum Search {
    Found(WorkflowRun, Job),
    NoJob(WorkflowRun),
    NoCandidates,
}

pub struct Checker<'a, S: DataSource + ?Sized> {
    config: &'a CheckerConfig,
    source: &'a S,
}

impl<'a, S: DataSource + ?Sized> Checker<'a, S> {
    pub fn new(config: &'a CheckerConfig, source: &'a S) -> Self {
        Self { config, source }
    }

    pub fn run(&self) -> Result<CheckOutcome, GitHubApiError> {
        let (run, job) = match self.find_run_with_tests()? {
            Search::Found(run, job) => (run, job),
            Search::NoJob(run) => return Ok(CheckOutcome::NoMatchingJob { run }),
            Search::NoCandidates => return Ok(CheckOutcome::NoEligibleRun),
        };

        info!("Getting logs for upstream-dev job {}", job.id);
        let log = match self.source.job_log(&self.config.repo, job.id) {
            Ok(log) => log,
            Err(e) => {
                warn!("Could not access logs for job {}: {e}", job.id);
                String::new()
            }
        };

        let log_available = !log.trim().is_empty();
        let parsed = if log_available {
            info!("Analyzing {} characters of log data", log.len());
            parse(&log)
        } else {
            warn!("No log text for job {}", job.id);
            ParsedLog::default()
        };
        let classified = classify(&parsed.failures);
        let status = if log_available {
            CheckStatus::derive(&job.conclusion, &classified)
        } else {
            CheckStatus::LogUnavailable
        };

        info!(
            "Found {} test failures and {} error types",
            parsed.failures.len(),
            parsed.error_types.len()
        );

        let freshness = self.freshness(&run);

        Ok(CheckOutcome::Checked(CheckResult {
            failures: categorize_all(&parsed.failures),
            dependency_version: parsed.version,
            error_types: parsed.error_types,
            status,
            freshness,
            run,
            job,
        }))
    }

    /// Find the most recent run where the upstream-dev tests actually executed.
    fn find_run_with_tests(&self) -> Result<Search, GitHubApiError> {
        let priority = self.fetch_runs(Pass::Priority)?;
        if let Some((run, job)) = self.first_with_tests(&priority, Pass::Priority)? {
            return Ok(Search::Found(run, job));
        }

        info!("No scheduled runs with tests found, searching all recent runs");
        let fallback = self.fetch_runs(Pass::Fallback)?;
        if let Some((run, job)) = self.first_with_tests(&fallback, Pass::Fallback)? {
            return Ok(Search::Found(run, job));
        }

        Ok(
            match select_run(&priority, &fallback, &self.config.main_branch) {
                Some(run) => Search::NoJob(run.clone()),
                None => Search::NoCandidates,
            },
        )
    }

    fn first_with_tests(
        &self,
        runs: &[WorkflowRun],
        pass: Pass,
    ) -> Result<Option<(WorkflowRun, Job)>, GitHubApiError> {
        let candidates = candidates(runs, pass, &self.config.main_branch);
        info!("Found {} {pass} runs to check", candidates.len());

        for (i, run) in candidates.iter().enumerate() {
            debug!(
                "Checking run {}/{}: {} ({} event)",
                i + 1,
                candidates.len(),
                run.id,
                run.event
            );

            let jobs = self.source.list_jobs(&self.config.repo, run.id)?;
            match select_job(&jobs) {
                Some(job) if job.conclusion.executed() => {
                    info!("Found run with tests: {} ({} event)", run.id, run.event);
                    return Ok(Some(((*run).clone(), job.clone())));
                }
                Some(job) => debug!("  upstream-dev job concluded: {}", job.conclusion),
                None => debug!("  no upstream-dev job found"),
            }
        }

        Ok(None)
    }

    fn fetch_runs(&self, pass: Pass) -> Result<Vec<WorkflowRun>, GitHubApiError> {
        let query = RunQuery {
            repo: &self.config.repo,
            workflow: &self.config.workflow,
            event: None,
            branch: None,
            limit: self.config.fallback_limit,
        };

        match pass {
            Pass::Priority => {
                let mut runs = vec![];
                for event in [RunEvent::Schedule, RunEvent::WorkflowDispatch] {
                    runs.extend(self.source.list_runs(&RunQuery {
                        event: Some(event),
                        branch: Some(self.config.main_branch.as_str()),
                        limit: self.config.priority_limit,
                        ..query.clone()
                    })?);
                }
                Ok(runs)
            }
            Pass::Fallback => self.source.list_runs(&query),
        }
    }

    fn freshness(&self, run: &WorkflowRun) -> Option<FreshnessCheck> {
        match self
            .source
            .latest_commit(&self.config.dependency_repo, &self.config.main_branch)
        {
            Ok(commit) => Some(FreshnessCheck {
                freshness: assess(run.created_at, commit.date),
                commit,
            }),
            Err(e) => {
                warn!("Could not get latest commit of {}: {e}", self.config.dependency_repo);
                None
            }
        }
    }
}
