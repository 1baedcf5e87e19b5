use std::path::PathBuf;

use chrono::Utc;

use crate::{command::ScorerInputArg, schema::report::ScoreReport, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ScoreArg {
    #[clap(flatten)]
    pub(crate) input: ScorerInputArg,
    /// Candidate program JSON file
    #[arg(long)]
    pub(crate) candidate: PathBuf,
}

pub(crate) fn run(arg: &ScoreArg) -> anyhow::Result<()> {
    let ScoreArg { input, candidate } = arg;
    let (table, config) = input.load()?;
    let candidate = util::read_candidate_file(candidate)?;
    let scorer = config.build(table)?;

    let scored = scorer.score(&candidate)?;
    let report = ScoreReport {
        candidate: candidate.to_string(),
        complexity: candidate.complexity(),
        aggregate: scored.score(),
        bscore: scored.bscore,
        complexity_penalty: scored.complexity_penalty,
        generated_at: Utc::now(),
    };
    util::save_json(&report, input.output())?;

    eprintln!("Scored {}", report.candidate);
    eprintln!("  Components: {}", report.bscore.len());
    eprintln!("  Penalty:    {:.6}", report.complexity_penalty);
    eprintln!("  Aggregate:  {:.6}", report.aggregate);

    Ok(())
}
