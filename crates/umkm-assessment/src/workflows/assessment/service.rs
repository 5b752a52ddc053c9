use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::domain::{
    AnswerSubmission, AssessmentId, AssessmentStatus, AssessmentTemplate, QuestionId,
    Recommendation, Response, ResponseId, TemplateId, UserId,
};
use super::level::{determine_level, LevelDetails};
use super::recommendation::{RecommendationError, RecommendationService};
use super::repository::{
    AssessmentRecord, AssessmentRepository, AssessmentView, RecommendationRepository,
    RepositoryError, ScoreRecord,
};
use super::scoring::{ScoringConfig, ScoringEngine};

/// Service composing storage, the scoring engine and the recommendation generator.
pub struct AssessmentService<A, R> {
    assessments: Arc<A>,
    recommendations: Arc<R>,
    engine: ScoringEngine,
    generator: RecommendationService<A, R>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static RESPONSE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asm-{id:06}"))
}

fn next_response_id() -> ResponseId {
    let id = RESPONSE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ResponseId(format!("rsp-{id:08}"))
}

impl<A, R> AssessmentService<A, R>
where
    A: AssessmentRepository + 'static,
    R: RecommendationRepository + 'static,
{
    pub fn new(assessments: Arc<A>, recommendations: Arc<R>, config: ScoringConfig) -> Self {
        let generator = RecommendationService::new(assessments.clone(), recommendations.clone());
        Self {
            assessments,
            recommendations,
            engine: ScoringEngine::new(config),
            generator,
        }
    }

    /// Open a new assessment for `user_id` against an existing template.
    pub fn start(
        &self,
        user_id: &UserId,
        template_id: &TemplateId,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        self.template(template_id)?;

        let record = AssessmentRecord {
            id: next_assessment_id(),
            user_id: user_id.clone(),
            template_id: template_id.clone(),
            status: AssessmentStatus::InProgress,
            started_at: Utc::now(),
            completed_at: None,
        };

        let stored = self.assessments.insert_assessment(record)?;
        info!(assessment_id = %stored.id, template_id = %stored.template_id, "assessment started");
        Ok(stored)
    }

    /// Record answers against the template's questions. Later answers to the same question
    /// replace earlier ones.
    pub fn record_responses(
        &self,
        user_id: &UserId,
        assessment_id: &AssessmentId,
        answers: Vec<AnswerSubmission>,
    ) -> Result<AssessmentView, AssessmentServiceError> {
        let record = self.owned(user_id, assessment_id)?;
        if record.is_completed() {
            return Err(AssessmentServiceError::AlreadyCompleted(record.id));
        }

        let template = self.template(&record.template_id)?;
        let responses = answers
            .into_iter()
            .map(|answer| {
                let question = template
                    .question(&answer.question_id)
                    .cloned()
                    .ok_or_else(|| AssessmentServiceError::UnknownQuestion(answer.question_id))?;
                Ok(Response {
                    id: next_response_id(),
                    question,
                    answer_value: answer.answer_value,
                })
            })
            .collect::<Result<Vec<_>, AssessmentServiceError>>()?;

        self.assessments.upsert_responses(&record.id, responses)?;
        let answered = self.assessments.responses(&record.id)?.len();
        Ok(record.view(answered))
    }

    /// Score a finished questionnaire. At most once per assessment; use
    /// [`AssessmentService::recalculate`] to re-run a completed one.
    pub fn submit(
        &self,
        user_id: &UserId,
        assessment_id: &AssessmentId,
    ) -> Result<AssessmentResult, AssessmentServiceError> {
        let record = self.owned(user_id, assessment_id)?;
        if record.is_completed() {
            return Err(AssessmentServiceError::AlreadyCompleted(record.id));
        }

        let result = self.evaluate(&record)?;

        let mut completed = record;
        completed.status = AssessmentStatus::Completed;
        completed.completed_at = Some(result.score.calculated_at);
        self.assessments.update_assessment(completed)?;

        info!(
            assessment_id = %result.assessment_id,
            total_score = result.score.total_score,
            level = result.score.level.as_str(),
            recommendations = result.recommendations.len(),
            "assessment submitted"
        );
        Ok(result)
    }

    /// Re-score a completed assessment, replacing its score and recommendations wholesale.
    pub fn recalculate(
        &self,
        user_id: &UserId,
        assessment_id: &AssessmentId,
    ) -> Result<AssessmentResult, AssessmentServiceError> {
        let record = self.owned(user_id, assessment_id)?;
        if !record.is_completed() {
            return Err(AssessmentServiceError::NotCompleted(record.id));
        }

        let result = self.evaluate(&record)?;
        info!(
            assessment_id = %result.assessment_id,
            total_score = result.score.total_score,
            "assessment recalculated"
        );
        Ok(result)
    }

    /// Latest score with its level metadata and stored recommendations.
    pub fn result(
        &self,
        user_id: &UserId,
        assessment_id: &AssessmentId,
    ) -> Result<AssessmentResult, AssessmentServiceError> {
        let record = self.owned(user_id, assessment_id)?;
        let score = self
            .assessments
            .latest_score(&record.id)?
            .ok_or_else(|| AssessmentServiceError::NotScored(record.id.clone()))?;
        let recommendations = self.recommendations.for_assessment(&record.id)?;

        Ok(AssessmentResult {
            assessment_id: record.id,
            level_details: score.level.details(),
            score,
            recommendations,
        })
    }

    fn evaluate(
        &self,
        record: &AssessmentRecord,
    ) -> Result<AssessmentResult, AssessmentServiceError> {
        let template = self.template(&record.template_id)?;
        let responses = self.assessments.responses(&record.id)?;

        let scoring = self.engine.calculate_score(&responses);
        let level = determine_level(scoring.total_score);
        let confidence = confidence_score(&template, &responses);

        // All reads happen before the first write.
        let recommendations = self.generator.match_rules(&record.id, &scoring)?;

        let score = self.assessments.save_score(ScoreRecord::from_result(
            record.id.clone(),
            &scoring,
            level,
            confidence,
            Utc::now(),
        ))?;

        self.recommendations.delete_for_assessment(&record.id)?;
        self.generator.store(&recommendations)?;

        Ok(AssessmentResult {
            assessment_id: record.id.clone(),
            level_details: level.details(),
            score,
            recommendations,
        })
    }

    fn owned(
        &self,
        user_id: &UserId,
        assessment_id: &AssessmentId,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self
            .assessments
            .fetch_assessment(assessment_id)?
            .ok_or(RepositoryError::NotFound)?;

        if &record.user_id != user_id {
            return Err(AssessmentServiceError::Forbidden(record.id));
        }
        Ok(record)
    }

    fn template(&self, id: &TemplateId) -> Result<AssessmentTemplate, AssessmentServiceError> {
        self.assessments
            .fetch_template(id)?
            .ok_or_else(|| AssessmentServiceError::TemplateNotFound(id.clone()))
    }
}

/// Share of the template's questions that received an answer, as a percentage.
fn confidence_score(template: &AssessmentTemplate, responses: &[Response]) -> f64 {
    if template.questions.is_empty() {
        return 0.0;
    }

    let answered: HashSet<&QuestionId> = responses
        .iter()
        .filter(|response| response.answer_value.is_some())
        .map(|response| &response.question.id)
        .filter(|id| template.question(id).is_some())
        .collect();

    (answered.len() as f64 / template.questions.len() as f64) * 100.0
}

/// Score, level metadata and recommendations returned after scoring.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResult {
    pub assessment_id: AssessmentId,
    pub score: ScoreRecord,
    pub level_details: LevelDetails,
    pub recommendations: Vec<Recommendation>,
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("assessment {0} belongs to another user")]
    Forbidden(AssessmentId),
    #[error("assessment {0} is already completed")]
    AlreadyCompleted(AssessmentId),
    #[error("assessment {0} has not been submitted yet")]
    NotCompleted(AssessmentId),
    #[error("assessment {0} has no score yet")]
    NotScored(AssessmentId),
    #[error("assessment template {0} not found")]
    TemplateNotFound(TemplateId),
    #[error("question {0} is not part of this assessment")]
    UnknownQuestion(QuestionId),
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
