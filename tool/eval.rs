#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::Context;
use burn::prelude::*;
use clap::Parser;

use depth_eval::{
    InferenceBackend,
    config::EvalConfig,
    harness::{self, EvalPaths},
};

#[derive(Parser, Debug)]
#[command(name = "depth-eval")]
#[command(about = "Evaluate depth-estimation snapshots against a ground-truth image set")]
#[command(version)]
struct Cli {
    /// Directory with input "colors" images
    input_dir: PathBuf,

    /// Directory with matching ground-truth depth maps
    gt_dir: PathBuf,

    /// Base output directory (an `<output>_abs` sibling is created too)
    output: PathBuf,

    /// Directory with snapshot config/weight pairs
    snaps: PathBuf,

    /// Undo log-depth encoding on the model output
    #[arg(long)]
    log: bool,

    /// Enable debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(level).init();

    let config = EvalConfig {
        log_depth: cli.log,
        ..EvalConfig::default()
    };
    let paths = EvalPaths {
        input_dir: cli.input_dir,
        gt_dir: cli.gt_dir,
        output: cli.output,
        snaps: cli.snaps,
    };

    let device = <InferenceBackend as Backend>::Device::default();
    let table = harness::run::<InferenceBackend>(&config, &paths, &device)
        .context("evaluation run failed")?;

    table.print_top5();
    Ok(())
}
