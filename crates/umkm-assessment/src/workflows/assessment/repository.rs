use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AssessmentId, AssessmentStatus, AssessmentTemplate, Category, CategoryId, Recommendation,
    RecommendationRule, Response, TemplateId, UserId,
};
use super::level::BusinessLevel;
use super::scoring::{CategoryScore, ScoringResult};

/// Repository record tracking ownership and lifecycle of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub user_id: UserId,
    pub template_id: TemplateId,
    pub status: AssessmentStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl AssessmentRecord {
    pub fn is_completed(&self) -> bool {
        self.status == AssessmentStatus::Completed
    }

    pub fn view(&self, answered: usize) -> AssessmentView {
        AssessmentView {
            assessment_id: self.id.clone(),
            template_id: self.template_id.clone(),
            status: self.status.label(),
            answered_questions: answered,
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

/// Persisted score row. Scores are rounded to two decimals for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub assessment_id: AssessmentId,
    pub total_score: f64,
    pub category_scores: BTreeMap<CategoryId, CategoryScore>,
    pub level: BusinessLevel,
    pub confidence_score: f64,
    pub calculated_at: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn from_result(
        assessment_id: AssessmentId,
        result: &ScoringResult,
        level: BusinessLevel,
        confidence_score: f64,
        calculated_at: DateTime<Utc>,
    ) -> Self {
        let category_scores = result
            .category_scores
            .iter()
            .map(|(id, category)| {
                let rounded = CategoryScore {
                    name: category.name.clone(),
                    score: round2(category.score),
                    max_score: round2(category.max_score),
                };
                (id.clone(), rounded)
            })
            .collect();

        Self {
            assessment_id,
            total_score: round2(result.total_score),
            category_scores,
            level,
            confidence_score: round2(confidence_score),
            calculated_at,
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Storage abstraction for assessments, templates, responses and score rows.
pub trait AssessmentRepository: Send + Sync {
    fn insert_assessment(
        &self,
        record: AssessmentRecord,
    ) -> Result<AssessmentRecord, RepositoryError>;
    fn update_assessment(&self, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn fetch_assessment(
        &self,
        id: &AssessmentId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn fetch_template(
        &self,
        id: &TemplateId,
    ) -> Result<Option<AssessmentTemplate>, RepositoryError>;
    fn categories(&self) -> Result<Vec<Category>, RepositoryError>;
    /// Replace answers by question id, keeping answers to other questions.
    fn upsert_responses(
        &self,
        id: &AssessmentId,
        responses: Vec<Response>,
    ) -> Result<(), RepositoryError>;
    fn responses(&self, id: &AssessmentId) -> Result<Vec<Response>, RepositoryError>;
    fn save_score(&self, score: ScoreRecord) -> Result<ScoreRecord, RepositoryError>;
    fn latest_score(&self, id: &AssessmentId) -> Result<Option<ScoreRecord>, RepositoryError>;
}

/// Storage abstraction for the rule table and generated recommendations.
pub trait RecommendationRepository: Send + Sync {
    fn rules_for_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<Vec<RecommendationRule>, RepositoryError>;
    fn delete_for_assessment(&self, id: &AssessmentId) -> Result<usize, RepositoryError>;
    fn insert_many(&self, recommendations: Vec<Recommendation>) -> Result<(), RepositoryError>;
    fn for_assessment(&self, id: &AssessmentId) -> Result<Vec<Recommendation>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Public projection of an assessment for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub assessment_id: AssessmentId,
    pub template_id: TemplateId,
    pub status: &'static str,
    pub answered_questions: usize,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn score_record_rounds_for_display() {
        let mut category_scores = BTreeMap::new();
        category_scores.insert(
            CategoryId::new("keuangan"),
            CategoryScore {
                name: "Keuangan".to_string(),
                score: 260.0 / 3.0,
                max_score: 100.0,
            },
        );
        let result = ScoringResult {
            total_score: 260.0 / 3.0,
            category_scores,
        };
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();

        let record = ScoreRecord::from_result(
            AssessmentId::new("asm-1"),
            &result,
            BusinessLevel::Menengah,
            2.0 / 3.0 * 100.0,
            at,
        );

        assert_eq!(record.total_score, 86.67);
        assert_eq!(record.confidence_score, 66.67);
        assert_eq!(
            record.category_scores[&CategoryId::new("keuangan")].score,
            86.67
        );
        assert_eq!(record.calculated_at, at);
    }
}
