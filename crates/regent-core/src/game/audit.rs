//! End-of-game audit.

use serde::{Deserialize, Serialize};

/// The server's verdict on a finished playthrough.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalAudit {
    pub reputation: String,
    pub final_score: f64,
    pub total_decisions: u32,
    pub violent_decisions: u32,
    pub deceptive_decisions: u32,
    pub fair_decisions: u32,
    pub promises_made: u32,
    pub promises_broken: u32,
    pub promise_reliability: f64,
    pub secrets_leaked: u32,
    pub leverages_held: u32,
    pub violence_ratio: f64,
    pub deception_ratio: f64,
    pub fairness_ratio: f64,
    pub summary: Option<String>,
}
