use colored::{ColoredString, Colorize};

use crate::{
    analysis::{
        classify::{short_name, Category},
        freshness::{Freshness, FreshnessCheck},
    },
    checker::{CheckOutcome, CheckResult, CheckStatus},
    config::CheckerConfig,
    models::{Conclusion, WorkflowRun},
};

/// How many failures of each category are listed before summarising the rest.
const SHOWN_FAILURES: usize = 3;

/// Render a check outcome for the terminal.
pub fn render(outcome: &CheckOutcome, config: &CheckerConfig) -> String {
    let mut lines = vec![];

    match outcome {
        CheckOutcome::Checked(result) => render_result(&mut lines, result, config),
        CheckOutcome::NoEligibleRun => {
            section(&mut lines, "Summary");
            lines.push(
                format!(
                    "No runs of {} found where the workflow actually executed",
                    config.workflow
                )
                .yellow()
                .bold()
                .to_string(),
            );
        }
        CheckOutcome::NoMatchingJob { run } => {
            render_run(&mut lines, run, config);
            section(&mut lines, "Summary");
            lines.push(
                "No run found where the upstream-dev tests executed (likely no changes detected)"
                    .yellow()
                    .bold()
                    .to_string(),
            );
        }
    }

    lines.join("\n")
}

fn section(lines: &mut Vec<String>, title: &str) {
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!("== {title} ==").blue().bold().to_string());
}

fn conclusion_colored(conclusion: &Conclusion) -> ColoredString {
    match conclusion {
        Conclusion::Success => conclusion.as_str().green(),
        Conclusion::Failure => conclusion.as_str().red(),
        _ => conclusion.as_str().yellow(),
    }
}

fn render_run(lines: &mut Vec<String>, run: &WorkflowRun, config: &CheckerConfig) {
    section(lines, "Most Recent Run With Tests");
    lines.push(format!(
        "Workflow Status: {}",
        conclusion_colored(&run.conclusion).bold()
    ));

    let completed = run
        .updated_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "N/A".to_string());
    let rows = [
        ("Workflow ID", run.id.to_string()),
        ("Run Number", run.number.to_string()),
        ("Branch", run.branch.clone()),
        ("Commit", run.short_sha().to_string()),
        ("Event Type", run.event.to_string()),
        ("Started", run.created_at.to_rfc3339()),
        ("Completed", completed),
        ("URL", config.run_url(run.id)),
    ];
    for (name, value) in rows {
        lines.push(format!("  {} {value}", format!("{name:<12}").cyan()));
    }
}

fn render_result(lines: &mut Vec<String>, result: &CheckResult, config: &CheckerConfig) {
    render_run(lines, &result.run, config);

    section(lines, "Upstream-dev Job");
    lines.push(match result.job.conclusion {
        Conclusion::Success => format!("{} ran successfully", result.job.name)
            .green()
            .bold()
            .to_string(),
        _ => format!("{} failed", result.job.name).red().bold().to_string(),
    });

    if let Some(version) = &result.dependency_version {
        section(lines, "Version Info");
        lines.push(format!("Zarr version tested: {}", version.green().bold()));
    }

    let job_failed = result.job.conclusion == Conclusion::Failure;
    if !result.failures.is_empty() {
        render_failures(lines, result);
    } else if result.status == CheckStatus::FailedUnknown
        || (result.status == CheckStatus::LogUnavailable && job_failed)
    {
        section(lines, "Test Failures");
        lines.push(
            "Tests failed, but could not access logs to determine specific failures."
                .yellow()
                .bold()
                .to_string(),
        );
        lines.push(format!(
            "Check the workflow logs manually: {}",
            config.run_url(result.run.id)
        ));
    } else if result.status == CheckStatus::LogUnavailable {
        section(lines, "Job Log");
        lines.push(
            "Job log unavailable; could not determine zarr version or test results."
                .yellow()
                .bold()
                .to_string(),
        );
        lines.push(format!(
            "Check the workflow logs manually: {}",
            config.run_url(result.run.id)
        ));
    }

    if let Some(check) = &result.freshness {
        render_freshness(lines, check, result);
    }

    section(lines, "Summary");
    lines.push(summary(result).to_string());
}

fn render_failures(lines: &mut Vec<String>, result: &CheckResult) {
    section(
        lines,
        &format!("Test Failures ({} total)", result.failures.len()),
    );

    for (category, label) in [
        (Category::DependencyRelated, "Zarr-related"),
        (Category::Other, "Other upstream"),
    ] {
        let tests: Vec<_> = result
            .failures
            .iter()
            .filter(|f| f.category == category)
            .collect();
        if tests.is_empty() {
            continue;
        }

        lines.push(format!("  {} ({})", label.cyan(), tests.len()));
        for failure in tests.iter().take(SHOWN_FAILURES) {
            lines.push(format!("    {}", short_name(&failure.test)));
        }
        if tests.len() > SHOWN_FAILURES {
            lines.push(format!("    ... and {} more", tests.len() - SHOWN_FAILURES));
        }
    }

    if !result.error_types.is_empty() {
        lines.push(format!(
            "  {} ({}): {}",
            "Error Types".cyan(),
            result.error_types.len(),
            result.error_types.join(", ")
        ));
    }

    section(lines, "Failure Analysis");
    lines.push(match result.status {
        CheckStatus::DependencyFailures => "All failures appear to be zarr-related".yellow().bold(),
        CheckStatus::OtherFailures => "All failures appear to be from other upstream dependencies"
            .blue()
            .bold(),
        CheckStatus::MixedFailures => "Mixed failures: both zarr and other upstream issues"
            .magenta()
            .bold(),
        _ => "Could not categorize test failures".red().bold(),
    }
    .to_string());
}

fn render_freshness(lines: &mut Vec<String>, check: &FreshnessCheck, result: &CheckResult) {
    section(lines, "Freshness Check");
    lines.push(match check.freshness {
        Freshness::Current => "Workflow is current with latest zarr commits"
            .green()
            .bold()
            .to_string(),
        Freshness::SlightlyBehind { hours } => format!(
            "Workflow may be slightly outdated ({hours:.1} hours behind zarr)"
        )
        .yellow()
        .bold()
        .to_string(),
        Freshness::Outdated { days } => {
            format!("Workflow appears outdated ({days:.1} days behind zarr)")
                .red()
                .bold()
                .to_string()
        }
    });
    lines.push(format!(
        "Latest zarr commit: {} ({})",
        check.commit.short_sha(),
        check.commit.date.to_rfc3339()
    ));
    lines.push(format!(
        "Workflow started: {}",
        result.run.created_at.to_rfc3339()
    ));
}

fn summary(result: &CheckResult) -> ColoredString {
    match (result.status, &result.dependency_version) {
        (CheckStatus::Passed, Some(version)) => {
            format!("All upstream-dev tests passed with zarr {version}")
                .green()
                .bold()
        }
        (CheckStatus::Passed, None) => "All upstream-dev tests passed (zarr version not detected)"
            .green()
            .bold(),
        (CheckStatus::LogUnavailable, _) => {
            "Could not determine zarr version or test failures: the job log was unavailable"
                .yellow()
                .bold()
        }
        _ => "Upstream-dev tests ran but failed".red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        analysis::classify::CategorizedFailure,
        models::{Commit, Job, RunEvent},
    };

    fn result(status: CheckStatus, failures: Vec<CategorizedFailure>) -> CheckResult {
        CheckResult {
            run: WorkflowRun {
                id: 17893421,
                number: 2841,
                event: RunEvent::Schedule,
                branch: "main".to_string(),
                head_sha: "62d1a6abc0f1".to_string(),
                conclusion: Conclusion::Failure,
                created_at: Utc.with_ymd_and_hms(2025, 9, 30, 0, 0, 0).unwrap(),
                updated_at: None,
            },
            job: Job {
                id: 1,
                name: "upstream-dev".to_string(),
                conclusion: Conclusion::Failure,
            },
            dependency_version: Some("3.1.3.dev23+g62d1a6abc".to_string()),
            failures,
            error_types: vec!["AssertionError".to_string()],
            status,
            freshness: Some(FreshnessCheck {
                commit: Commit {
                    sha: "0123456789abcdef".to_string(),
                    date: Utc.with_ymd_and_hms(2025, 9, 25, 0, 0, 0).unwrap(),
                },
                freshness: Freshness::Outdated { days: 5.0 },
            }),
        }
    }

    fn failure(test: &str, category: Category) -> CategorizedFailure {
        CategorizedFailure {
            test: test.to_string(),
            category,
        }
    }

    #[test]
    fn test_render_mixed() {
        colored::control::set_override(false);

        let mut failures: Vec<_> = (0..5)
            .map(|i| failure(&format!("t.py::TestZarr::test_{i}"), Category::DependencyRelated))
            .collect();
        failures.push(failure("t.py::test_plot", Category::Other));
        let outcome = CheckOutcome::Checked(result(CheckStatus::MixedFailures, failures));

        let text = render(&outcome, &CheckerConfig::default());

        assert!(text.contains("https://github.com/pydata/xarray/actions/runs/17893421"));
        assert!(text.contains("Commit       62d1a6ab"));
        assert!(text.contains("Zarr version tested: 3.1.3.dev23+g62d1a6abc"));
        assert!(text.contains("Test Failures (6 total)"));
        assert!(text.contains("TestZarr::test_2"));
        assert!(!text.contains("TestZarr::test_3"));
        assert!(text.contains("... and 2 more"));
        assert!(text.contains("Other upstream (1)"));
        assert!(text.contains("Error Types (1): AssertionError"));
        assert!(text.contains("Mixed failures"));
        assert!(text.contains("Workflow appears outdated (5.0 days behind zarr)"));
        assert!(text.contains("Upstream-dev tests ran but failed"));
    }

    #[test]
    fn test_render_failed_without_details() {
        colored::control::set_override(false);

        let outcome = CheckOutcome::Checked(result(CheckStatus::FailedUnknown, vec![]));
        let text = render(&outcome, &CheckerConfig::default());

        assert!(text.contains("could not access logs"));
        assert!(!text.contains("Failure Analysis"));
    }

    #[test]
    fn test_render_unavailable_log_of_passing_job() {
        colored::control::set_override(false);

        let mut passed = result(CheckStatus::LogUnavailable, vec![]);
        passed.job.conclusion = Conclusion::Success;
        passed.dependency_version = None;
        passed.error_types = vec![];
        let text = render(&CheckOutcome::Checked(passed), &CheckerConfig::default());

        assert!(!text.contains("Tests failed"));
        assert!(text.contains("upstream-dev ran successfully"));
        assert!(text.contains("Job log unavailable"));
        assert!(text.contains("https://github.com/pydata/xarray/actions/runs/17893421"));
        assert!(text.contains("the job log was unavailable"));
    }

    #[test]
    fn test_render_unavailable_log_of_failed_job() {
        colored::control::set_override(false);

        let mut failed = result(CheckStatus::LogUnavailable, vec![]);
        failed.dependency_version = None;
        let text = render(&CheckOutcome::Checked(failed), &CheckerConfig::default());

        assert!(text.contains("Tests failed, but could not access logs"));
        assert!(!text.contains("Job log unavailable"));
    }

    #[test]
    fn test_render_no_eligible_run() {
        colored::control::set_override(false);

        let text = render(&CheckOutcome::NoEligibleRun, &CheckerConfig::default());
        assert!(text.contains("No runs of upstream-dev-ci.yaml found"));
    }
}
