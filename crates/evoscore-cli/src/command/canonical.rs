use anyhow::Context;
use chrono::Utc;
use evoscore_scoring::BScore as _;

use crate::{command::ScorerInputArg, schema::report::ScoreReport, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct CanonicalArg {
    #[clap(flatten)]
    pub(crate) input: ScorerInputArg,
}

pub(crate) fn run(arg: &CanonicalArg) -> anyhow::Result<()> {
    let (table, config) = arg.input.load()?;
    let scorer = config
        .build_precision(table)
        .context("Canonical candidates can only be synthesized by a precision scorer")??;

    let candidate = scorer.gen_canonical_best_candidate();
    let scored = scorer.score(&candidate)?;
    let report = ScoreReport {
        candidate: candidate.to_string(),
        complexity: candidate.complexity(),
        aggregate: scored.score(),
        bscore: scored.bscore,
        complexity_penalty: scored.complexity_penalty,
        generated_at: Utc::now(),
    };
    util::save_json(&report, arg.input.output())?;

    eprintln!("Canonical candidate: {}", report.candidate);
    eprintln!("  Complexity: {}", report.complexity);

    Ok(())
}
