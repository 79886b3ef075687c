use anyhow::Result;
use clap::Args;

use crate::{
    checker::Checker,
    config::{ApiPreference, CheckerConfig},
    report::render,
};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Where to get GitHub data from.
    #[arg(long, value_enum, env = "XARRAY_UPSTREAM_API", default_value_t = ApiPreference::Gh)]
    api: ApiPreference,

    /// Print the result as JSON instead of a formatted report.
    #[arg(long)]
    json: bool,

    /// Repository whose CI is inspected.
    #[arg(long, default_value = "pydata/xarray")]
    repo: String,

    /// Workflow file of the upstream-dev CI.
    #[arg(long, default_value = "upstream-dev-ci.yaml")]
    workflow: String,
}

impl CheckArgs {
    fn config(&self) -> CheckerConfig {
        CheckerConfig {
            repo: self.repo.clone(),
            workflow: self.workflow.clone(),
            api: self.api,
            ..CheckerConfig::default()
        }
    }

    pub fn run(&self) -> Result<()> {
        let config = self.config();
        let source = config.open_source();

        let outcome = Checker::new(&config, &source).run()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            println!("{}", render(&outcome, &config));
        }

        Ok(())
    }
}
