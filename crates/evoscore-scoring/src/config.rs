//! Serializable scorer configuration.
//!
//! A [`ScorerConfig`] names the scorer kind with its parameters and, optionally, how to
//! calibrate the complexity penalty:
//!
//! ```json
//! {
//!   "kind": "precision",
//!   "min_activation": 0.2,
//!   "max_activation": 0.6,
//!   "complexity": { "noise": { "alphabet_size": 4, "noise": 0.1 } }
//! }
//! ```
//!
//! Parameters left out take their defaults.

use std::sync::Arc;

use evoscore_table::CTable;
use serde::{Deserialize, Serialize};

use crate::{
    BScore, BScoreConfigError, CTruthTableBScore, ContinBScore, DiscretizeContinBScore,
    DiscretizeParams, EnumEffectiveBScore, EnumFilterBScore, EnumFilterParams, EnumGradedBScore,
    EnumTableBScore, GradingParams, InterestingPredicateBScore, InterestingPredicateParams,
    PrecisionBScore, PrecisionParams, PrerecBScore, RecallBScore, ThresholdParams,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    #[serde(flatten)]
    pub kind: ScorerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<ComplexityCalibration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScorerKind {
    Recall(ThresholdParams),
    Prerec(ThresholdParams),
    Precision(PrecisionParams),
    DiscretizeContin(DiscretizeParams),
    EnumTable,
    EnumFilter(EnumFilterParams),
    EnumGraded(GradingParams),
    EnumEffective(GradingParams),
    InterestingPredicate(InterestingPredicateParams),
    CtruthTable,
    Contin,
}

/// The two mutually exclusive ways to calibrate the Occam's razor penalty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityCalibration {
    /// From the output alphabet size and a noise level (a probability for discrete
    /// outputs, a standard deviation for contin ones).
    Noise { alphabet_size: usize, noise: f64 },
    /// From a target complexity ratio.
    Ratio { ratio: f64 },
}

impl ComplexityCalibration {
    pub fn apply(&self, scorer: &mut dyn BScore) -> Result<(), BScoreConfigError> {
        match *self {
            Self::Noise {
                alphabet_size,
                noise,
            } => {
                if alphabet_size < 2 {
                    return Err(BScoreConfigError::InvalidAlphabetSize { alphabet_size });
                }
                scorer.set_complexity_coef(alphabet_size, noise);
            }
            Self::Ratio { ratio } => scorer.set_complexity_ratio(ratio),
        }
        Ok(())
    }
}

impl ScorerConfig {
    #[must_use]
    pub fn new(kind: ScorerKind) -> Self {
        Self {
            kind,
            complexity: None,
        }
    }

    #[must_use]
    pub fn with_complexity(self, complexity: ComplexityCalibration) -> Self {
        Self {
            complexity: Some(complexity),
            ..self
        }
    }

    /// Builds and calibrates the configured scorer over `table`.
    pub fn build(&self, table: Arc<CTable>) -> Result<Box<dyn BScore>, BScoreConfigError> {
        let mut scorer: Box<dyn BScore> = match &self.kind {
            ScorerKind::Recall(p) => Box::new(RecallBScore::new(table, p)?),
            ScorerKind::Prerec(p) => Box::new(PrerecBScore::new(table, p)?),
            ScorerKind::Precision(p) => Box::new(PrecisionBScore::new(table, p)?),
            ScorerKind::DiscretizeContin(p) => Box::new(DiscretizeContinBScore::new(table, p)?),
            ScorerKind::EnumTable => Box::new(EnumTableBScore::new(table)?),
            ScorerKind::EnumFilter(p) => Box::new(EnumFilterBScore::new(table, p)?),
            ScorerKind::EnumGraded(p) => Box::new(EnumGradedBScore::new(table, p)?),
            ScorerKind::EnumEffective(p) => Box::new(EnumEffectiveBScore::new(table, p)?),
            ScorerKind::InterestingPredicate(p) => {
                Box::new(InterestingPredicateBScore::new(table, p)?)
            }
            ScorerKind::CtruthTable => Box::new(CTruthTableBScore::new(table)?),
            ScorerKind::Contin => Box::new(ContinBScore::new(table)?),
        };
        self.calibrate(scorer.as_mut())?;
        Ok(scorer)
    }

    /// Builds the configured precision scorer, which alone can synthesize a canonical
    /// best candidate. Returns `None` for every other kind.
    pub fn build_precision(
        &self,
        table: Arc<CTable>,
    ) -> Option<Result<PrecisionBScore, BScoreConfigError>> {
        let ScorerKind::Precision(params) = &self.kind else {
            return None;
        };
        Some(PrecisionBScore::new(table, params).and_then(|mut scorer| {
            self.calibrate(&mut scorer)?;
            Ok(scorer)
        }))
    }

    fn calibrate(&self, scorer: &mut dyn BScore) -> Result<(), BScoreConfigError> {
        match &self.complexity {
            Some(calibration) => calibration.apply(scorer),
            None => Ok(()),
        }
    }
}
