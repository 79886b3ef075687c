mod analysis;
mod checker;
mod cmd_check;
mod config;
mod error;
mod models;
mod report;
mod source;

use anyhow::Result;
use clap::Parser;
use cmd_check::CheckArgs;
use std::env;

/// Monitor xarray's upstream-dev CI for zarr compatibility.
///
/// Finds the most recent upstream-dev-ci.yaml run where the upstream-dev tests actually
/// executed, reports the zarr version it tested and sorts its test failures into zarr-related
/// and other upstream breakage. Requires the gh CLI to be installed and authenticated, unless
/// `--api rest` is used.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    #[command(flatten)]
    check: CheckArgs,
}

fn main() -> Result<()> {
    // Set up logging, with a default verbosity of "info"
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args = Args::parse();

    args.check.run()
}
