use crate::models::{Job, RunEvent, WorkflowRun};

const JOB_PREFIX: &str = "upstream-dev";
const JOB_EXCLUSIONS: [&str; 2] = ["detect", "mypy"];

/// Which set of runs is being searched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    /// Scheduled or manually dispatched runs on the main branch.
    Priority,
    /// Any recent run.
    Fallback,
}

impl Pass {
    pub fn admits(self, run: &WorkflowRun, main_branch: &str) -> bool {
        match self {
            Pass::Priority => {
                matches!(run.event, RunEvent::Schedule | RunEvent::WorkflowDispatch)
                    && run.branch == main_branch
            }
            Pass::Fallback => true,
        }
    }
}

impl std::fmt::Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Pass::Priority => "scheduled/dispatch",
            Pass::Fallback => "recent",
        })
    }
}

/// Runs of one pass that actually executed, most recent first.
///
/// Skipped and pending runs never appear, however recent they are.
pub fn candidates<'a>(
    runs: &'a [WorkflowRun],
    pass: Pass,
    main_branch: &str,
) -> Vec<&'a WorkflowRun> {
    let mut candidates: Vec<_> = runs
        .iter()
        .filter(|run| pass.admits(run, main_branch) && run.conclusion.executed())
        .collect();
    candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    candidates
}

/// Pick the most recent executed run, preferring the priority pass over the fallback.
pub fn select_run<'a>(
    priority: &'a [WorkflowRun],
    fallback: &'a [WorkflowRun],
    main_branch: &str,
) -> Option<&'a WorkflowRun> {
    candidates(priority, Pass::Priority, main_branch)
        .into_iter()
        .next()
        .or_else(|| {
            candidates(fallback, Pass::Fallback, main_branch)
                .into_iter()
                .next()
        })
}

/// Whether a job is the upstream-dev test job, as opposed to its detection or mypy siblings.
pub fn is_upstream_test_job(job: &Job) -> bool {
    let name = job.name.to_lowercase();
    name.starts_with(JOB_PREFIX) && !JOB_EXCLUSIONS.iter().any(|e| name.contains(e))
}

pub fn select_job(jobs: &[Job]) -> Option<&Job> {
    jobs.iter().find(|job| is_upstream_test_job(job))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::Conclusion;

    fn run(id: u64, hour: u32, event: RunEvent, conclusion: Conclusion) -> WorkflowRun {
        WorkflowRun {
            id,
            number: id,
            event,
            branch: "main".to_string(),
            head_sha: String::new(),
            conclusion,
            created_at: Utc.with_ymd_and_hms(2025, 9, 30, hour, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    fn job(id: u64, name: &str) -> Job {
        Job {
            id,
            name: name.to_string(),
            conclusion: Conclusion::Failure,
        }
    }

    #[test]
    fn test_skips_more_recent_skipped_run() {
        let runs = vec![
            run(3, 12, RunEvent::Schedule, Conclusion::Skipped),
            run(2, 6, RunEvent::Schedule, Conclusion::Failure),
            run(1, 0, RunEvent::Schedule, Conclusion::Success),
        ];

        assert_eq!(select_run(&runs, &[], "main").map(|r| r.id), Some(2));
    }

    #[test]
    fn test_orders_by_creation_time() {
        let runs = vec![
            run(1, 0, RunEvent::WorkflowDispatch, Conclusion::Success),
            run(2, 9, RunEvent::Schedule, Conclusion::Failure),
            run(3, 4, RunEvent::Schedule, Conclusion::Pending),
        ];

        let ids: Vec<_> = candidates(&runs, Pass::Priority, "main")
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_falls_back_when_priority_pass_never_executed() {
        let priority = vec![
            run(4, 12, RunEvent::Schedule, Conclusion::Skipped),
            run(3, 8, RunEvent::Schedule, Conclusion::Pending),
        ];
        let fallback = vec![
            run(6, 14, RunEvent::PullRequest, Conclusion::Skipped),
            run(5, 10, RunEvent::PullRequest, Conclusion::Failure),
        ];

        assert_eq!(
            select_run(&priority, &fallback, "main").map(|r| r.id),
            Some(5)
        );
    }

    #[test]
    fn test_priority_pass_requires_main_branch_and_event() {
        let mut on_branch = run(1, 0, RunEvent::Schedule, Conclusion::Success);
        on_branch.branch = "backport".to_string();
        let pull_request = run(2, 1, RunEvent::PullRequest, Conclusion::Success);

        assert!(!Pass::Priority.admits(&on_branch, "main"));
        assert!(!Pass::Priority.admits(&pull_request, "main"));
        assert!(Pass::Fallback.admits(&on_branch, "main"));
        assert_eq!(select_run(&[on_branch, pull_request], &[], "main"), None);
    }

    #[test]
    fn test_pass_display() {
        assert_eq!(
            format!("Found 3 {} runs to check", Pass::Priority),
            "Found 3 scheduled/dispatch runs to check"
        );
        assert_eq!(Pass::Fallback.to_string(), "recent");
    }

    #[test]
    fn test_nothing_executed() {
        let runs = vec![run(1, 0, RunEvent::Schedule, Conclusion::Skipped)];
        assert_eq!(select_run(&runs, &runs, "main"), None);
    }

    #[test]
    fn test_select_job_ignores_mypy_and_detect() {
        let jobs = vec![
            job(1, "detect-ci-trigger"),
            job(2, "upstream-dev-detect-trigger"),
            job(3, "upstream-dev-mypy"),
            job(4, "upstream-dev-tests"),
            job(5, "upstream-dev (ubuntu, 3.13)"),
        ];

        assert_eq!(select_job(&jobs).map(|j| j.id), Some(4));
    }

    #[test]
    fn test_select_job_is_case_insensitive() {
        let jobs = vec![job(1, "Upstream-Dev (ubuntu-latest, 3.12)")];
        assert_eq!(select_job(&jobs).map(|j| j.id), Some(1));
        assert_eq!(select_job(&[job(2, "upstream-dev-mypy")]), None);
    }
}
