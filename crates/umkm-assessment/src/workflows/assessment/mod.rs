//! Assessment scoring pipeline: responses are reduced to a weighted score, mapped to a
//! business level, and matched against the template's recommendation rule table.

pub mod domain;
pub mod level;
pub mod recommendation;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod seed;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AnswerSubmission, AnswerValue, AssessmentId, AssessmentStatus, AssessmentTemplate, Category,
    CategoryId, ChoiceAnswer, ChoiceOption, Question, QuestionId, QuestionKind, QuestionOptions,
    Recommendation, RecommendationPriority, RecommendationRule, Response, ResponseId, RuleId,
    TemplateId, UserId,
};
pub use level::{determine_level, level_details, BusinessLevel, LevelDetails};
pub use recommendation::{
    evaluate_rules, matches_range, RecommendationError, RecommendationService,
};
pub use repository::{
    AssessmentRecord, AssessmentRepository, AssessmentView, RecommendationRepository,
    RepositoryError, ScoreRecord,
};
pub use router::assessment_router;
pub use scoring::{CategoryScore, ScoringConfig, ScoringEngine, ScoringResult, UnscorablePolicy};
pub use seed::{standard_rules, standard_template, standard_template_id, STANDARD_TEMPLATE_ID};
pub use service::{AssessmentResult, AssessmentService, AssessmentServiceError};
