use chrono::Utc;

use crate::{command::ScorerInputArg, schema::report::BestReport, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct BestArg {
    #[clap(flatten)]
    pub(crate) input: ScorerInputArg,
}

pub(crate) fn run(arg: &BestArg) -> anyhow::Result<()> {
    let (table, config) = arg.input.load()?;
    let scorer = config.build(table)?;

    let report = BestReport {
        best_possible_bscore: scorer.best_possible_bscore(),
        min_improv: scorer.min_improv(),
        complexity_ratio: Some(scorer.complexity_penalty().ratio()).filter(|r| r.is_finite()),
        generated_at: Utc::now(),
    };
    util::save_json(&report, arg.input.output())?;
    Ok(())
}
