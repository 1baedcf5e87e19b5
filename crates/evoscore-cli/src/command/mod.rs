use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use evoscore_scoring::ScorerConfig;
use evoscore_table::CTable;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use self::{best::BestArg, canonical::CanonicalArg, score::ScoreArg};
use crate::util;

mod best;
mod canonical;
mod score;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v: info, -vv: debug, -vvv: trace); `RUST_LOG` overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Score a candidate program against a dataset
    Score(#[clap(flatten)] ScoreArg),
    /// Print the best possible behavioral score and the minimum improvement
    Best(#[clap(flatten)] BestArg),
    /// Synthesize the canonical best candidate of a precision scorer
    Canonical(#[clap(flatten)] CanonicalArg),
}

/// Inputs shared by every subcommand.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ScorerInputArg {
    /// Dataset JSON file
    #[arg(long)]
    table: PathBuf,
    /// Scorer configuration JSON file
    #[arg(long)]
    scorer: PathBuf,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ScorerInputArg {
    pub(crate) fn load(&self) -> anyhow::Result<(Arc<CTable>, ScorerConfig)> {
        let table = util::read_dataset_file(&self.table)?
            .into_table()
            .with_context(|| format!("Invalid dataset: {}", self.table.display()))?;
        let config = util::read_scorer_config_file(&self.scorer)?;
        tracing::info!(
            rows = table.len(),
            observations = table.uncompressed_size(),
            output_type = %table.output_type(),
            "loaded dataset"
        );
        Ok((Arc::new(table), config))
    }

    pub(crate) fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::Score(arg) => score::run(&arg)?,
        Mode::Best(arg) => best::run(&arg)?,
        Mode::Canonical(arg) => canonical::run(&arg)?,
    }
    Ok(())
}
