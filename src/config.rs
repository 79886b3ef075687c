use clap::ValueEnum;
use log::{info, warn};

use crate::source::{DataSource, GhCli, GhStatus, RestApi};

/// Where GitHub data comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ApiPreference {
    /// Use gh if it is installed and logged in, otherwise the REST API
    Auto,
    /// Always use the gh CLI
    #[default]
    Gh,
    /// Always use the REST API directly (set GITHUB_TOKEN to raise the rate limit)
    Rest,
}

#[derive(Clone, Debug)]
pub struct CheckerConfig {
    pub repo: String,
    pub workflow: String,
    pub dependency_repo: String,
    pub main_branch: String,
    /// Runs fetched per event type in the scheduled/dispatch pass.
    pub priority_limit: u32,
    /// Runs fetched in the unrestricted pass.
    pub fallback_limit: u32,
    pub api: ApiPreference,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            repo: "pydata/xarray".to_string(),
            workflow: "upstream-dev-ci.yaml".to_string(),
            dependency_repo: "zarr-developers/zarr-python".to_string(),
            main_branch: "main".to_string(),
            priority_limit: 10,
            fallback_limit: 20,
            api: ApiPreference::default(),
        }
    }
}

impl CheckerConfig {
    pub fn run_url(&self, run_id: u64) -> String {
        format!("https://github.com/{}/actions/runs/{run_id}", self.repo)
    }

    pub fn open_source(&self) -> Box<dyn DataSource> {
        match self.api {
            ApiPreference::Gh => Box::new(GhCli::default()),
            ApiPreference::Rest => {
                info!("Using direct GitHub REST API (as requested)");
                Box::new(RestApi::from_env())
            }
            ApiPreference::Auto => {
                let gh = GhCli::default();
                match gh.probe() {
                    GhStatus::Ready => {
                        info!("Using gh CLI (authenticated)");
                        Box::new(gh)
                    }
                    GhStatus::Unauthenticated => {
                        warn!("gh CLI found but not authenticated, using direct API");
                        Box::new(RestApi::from_env())
                    }
                    GhStatus::Missing => {
                        warn!("gh CLI not available, using direct GitHub API (rate limited)");
                        Box::new(RestApi::from_env())
                    }
                }
            }
        }
    }
}
