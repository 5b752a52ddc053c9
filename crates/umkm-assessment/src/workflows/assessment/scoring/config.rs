use serde::{Deserialize, Serialize};

/// How questions without a scorable range (text and unsupported types) enter the mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscorablePolicy {
    /// Count the weight in the denominator with a zero score, pulling the mean toward zero.
    Dilute,
    /// Leave the question out of both numerator and denominator.
    Exclude,
}

/// Scoring knobs. The default reproduces the production scoring path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub default_scale_max: f64,
    pub honor_scale_max_override: bool,
    pub unscorable_questions: UnscorablePolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_scale_max: 5.0,
            honor_scale_max_override: false,
            unscorable_questions: UnscorablePolicy::Dilute,
        }
    }
}
