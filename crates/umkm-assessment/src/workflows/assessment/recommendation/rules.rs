use std::collections::HashMap;

use super::super::domain::{AssessmentId, CategoryId, Recommendation, RecommendationRule};
use super::super::scoring::ScoringResult;

pub(crate) const GENERAL_CATEGORY: &str = "General";

/// Inclusive range test; a `None` bound is unbounded on that side.
pub fn matches_range(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

/// Category rules test the category percentage, general rules the total score. A category
/// with no responses in this assessment never matches.
pub(crate) fn rule_matches(rule: &RecommendationRule, score: &ScoringResult) -> bool {
    let value = match &rule.category_id {
        Some(category_id) => match score.category(category_id) {
            Some(category) => category.percentage(),
            None => return false,
        },
        None => score.total_score,
    };

    matches_range(value, rule.min_score, rule.max_score)
}

/// One recommendation per matching rule, in rule order.
pub fn evaluate_rules(
    assessment_id: &AssessmentId,
    rules: &[RecommendationRule],
    category_names: &HashMap<CategoryId, String>,
    score: &ScoringResult,
) -> Vec<Recommendation> {
    rules
        .iter()
        .filter(|rule| rule_matches(rule, score))
        .map(|rule| Recommendation {
            assessment_id: assessment_id.clone(),
            title: rule.title.clone(),
            description: rule.description.clone(),
            priority: rule.priority,
            category: rule
                .category_id
                .as_ref()
                .and_then(|id| category_names.get(id))
                .cloned()
                .unwrap_or_else(|| GENERAL_CATEGORY.to_string()),
            action_items: rule.action_items.clone(),
            resources: rule.resources.clone(),
        })
        .collect()
}
