mod coerce;
mod config;

pub use config::{ScoringConfig, UnscorablePolicy};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{CategoryId, Response};

/// Stateless engine reducing a response set to a weighted percentage score.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Weighted mean of per-question percentages plus per-category buckets.
    ///
    /// Never fails: malformed answers score zero, empty input yields a zero total and no
    /// categories.
    pub fn calculate_score(&self, responses: &[Response]) -> ScoringResult {
        let mut total_weighted_score = 0.0;
        let mut total_weight = 0.0;
        let mut category_scores: BTreeMap<CategoryId, CategoryScore> = BTreeMap::new();

        for response in responses {
            let question = &response.question;
            let weight = coerce::effective_weight(question.weight);

            let max_raw_score = coerce::max_raw_score(question, &self.config);
            if max_raw_score <= 0.0 {
                debug!(
                    question_id = %question.id,
                    kind = question.kind.label(),
                    policy = ?self.config.unscorable_questions,
                    "question has no scorable range"
                );
                if self.config.unscorable_questions == UnscorablePolicy::Exclude {
                    continue;
                }
            }

            // Excluded questions never open a category bucket.
            let bucket = category_scores
                .entry(question.category_id().clone())
                .or_insert_with(|| CategoryScore::empty(question.category.name.clone()));

            let raw_score = coerce::raw_score(question, response.answer_value.as_ref());
            let normalized_score = coerce::normalized_score(raw_score, max_raw_score);

            total_weighted_score += normalized_score * weight;
            total_weight += weight;
            bucket.score += normalized_score * weight;
            bucket.max_score += 100.0 * weight;
        }

        let total_score = if total_weight > 0.0 {
            total_weighted_score / total_weight
        } else {
            0.0
        };

        ScoringResult {
            total_score,
            category_scores,
        }
    }
}

/// Weighted points earned in a category against the points available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: String,
    pub score: f64,
    pub max_score: f64,
}

impl CategoryScore {
    fn empty(name: String) -> Self {
        Self {
            name,
            score: 0.0,
            max_score: 0.0,
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.max_score > 0.0 {
            (self.score / self.max_score) * 100.0
        } else {
            0.0
        }
    }
}

/// Engine output. `total_score` lies in `[0, 100]` and every bucket keeps `score <= max_score`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringResult {
    pub total_score: f64,
    pub category_scores: BTreeMap<CategoryId, CategoryScore>,
}

impl ScoringResult {
    pub fn category(&self, id: &CategoryId) -> Option<&CategoryScore> {
        self.category_scores.get(id)
    }
}
