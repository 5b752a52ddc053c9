mod rules;

pub use rules::{evaluate_rules, matches_range};

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::domain::{AssessmentId, Recommendation, TemplateId};
use super::repository::{AssessmentRepository, RecommendationRepository, RepositoryError};
use super::scoring::ScoringResult;

/// Generates and persists recommendations for a scored assessment.
pub struct RecommendationService<A, R> {
    assessments: Arc<A>,
    recommendations: Arc<R>,
}

impl<A, R> RecommendationService<A, R>
where
    A: AssessmentRepository + 'static,
    R: RecommendationRepository + 'static,
{
    pub fn new(assessments: Arc<A>, recommendations: Arc<R>) -> Self {
        Self {
            assessments,
            recommendations,
        }
    }

    /// Match the template's rule table against `score` and bulk-insert the result.
    ///
    /// Does not clear earlier recommendations; callers regenerating an assessment delete
    /// them first.
    pub fn generate_recommendations(
        &self,
        assessment_id: &AssessmentId,
        score: &ScoringResult,
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        let generated = self.match_rules(assessment_id, score)?;
        self.store(&generated)?;
        Ok(generated)
    }

    /// Read-only half of [`RecommendationService::generate_recommendations`].
    pub fn match_rules(
        &self,
        assessment_id: &AssessmentId,
        score: &ScoringResult,
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        let assessment = self
            .assessments
            .fetch_assessment(assessment_id)?
            .ok_or_else(|| RecommendationError::AssessmentNotFound(assessment_id.clone()))?;
        let template = self
            .assessments
            .fetch_template(&assessment.template_id)?
            .ok_or_else(|| RecommendationError::TemplateNotFound(assessment.template_id.clone()))?;

        let rules = self.recommendations.rules_for_template(&template.id)?;
        let category_names: HashMap<_, _> = self
            .assessments
            .categories()?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect();

        let generated = evaluate_rules(assessment_id, &rules, &category_names, score);
        debug!(
            assessment_id = %assessment_id,
            rules = rules.len(),
            matched = generated.len(),
            "evaluated recommendation rules"
        );
        Ok(generated)
    }

    /// Bulk insert; an empty list is a no-op.
    pub fn store(&self, recommendations: &[Recommendation]) -> Result<(), RecommendationError> {
        if !recommendations.is_empty() {
            self.recommendations.insert_many(recommendations.to_vec())?;
        }
        Ok(())
    }
}

/// Error raised while generating recommendations.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("assessment {0} not found")]
    AssessmentNotFound(AssessmentId),
    #[error("assessment template {0} not found")]
    TemplateNotFound(TemplateId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
