use chrono::{DateTime, Utc};
use evoscore_scoring::BehavioralScore;
use serde::{Deserialize, Serialize};

/// Result of scoring one candidate program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Candidate program in its textual form
    pub candidate: String,
    /// Complexity of the candidate program
    pub complexity: usize,
    /// Per-component behavioral score
    pub bscore: BehavioralScore,
    /// Occam's razor penalty charged for the candidate's complexity
    pub complexity_penalty: f64,
    /// Sum of the components minus the complexity penalty
    pub aggregate: f64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestReport {
    pub best_possible_bscore: BehavioralScore,
    pub min_improv: f64,
    /// Complexity ratio implied by the calibrated penalty, absent when disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_ratio: Option<f64>,
    pub generated_at: DateTime<Utc>,
}
