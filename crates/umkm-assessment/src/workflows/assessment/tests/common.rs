use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response as HttpResponse;
use serde_json::Value;

use crate::workflows::assessment::domain::{
    AnswerSubmission, AnswerValue, AssessmentId, AssessmentTemplate, Category, CategoryId,
    ChoiceAnswer, ChoiceOption, Question, QuestionId, QuestionKind, QuestionOptions,
    Recommendation, RecommendationPriority, RecommendationRule, Response, ResponseId, RuleId,
    TemplateId, UserId,
};
use crate::workflows::assessment::repository::{
    AssessmentRecord, AssessmentRepository, RecommendationRepository, RepositoryError,
    ScoreRecord,
};
use crate::workflows::assessment::{assessment_router, AssessmentService, ScoringConfig};

pub(super) const TEMPLATE: &str = "tpl-umkm";

pub(super) fn category(id: &str, name: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_string(),
    }
}

pub(super) fn keuangan() -> Category {
    category("keuangan", "Keuangan")
}

pub(super) fn pemasaran() -> Category {
    category("pemasaran", "Pemasaran")
}

pub(super) fn digital() -> Category {
    category("digital", "Digital")
}

pub(super) fn question(id: &str, kind: QuestionKind, weight: f64, category: Category) -> Question {
    Question {
        id: QuestionId::new(id),
        kind,
        weight,
        category,
        options: None,
    }
}

pub(super) fn choice_question(id: &str, weight: f64, category: Category) -> Question {
    let choices = [("Tidak ada", 0.0), ("Jarang", 1.0), ("Kadang", 2.0), ("Sering", 3.0), ("Terjadwal", 4.0)]
        .into_iter()
        .map(|(label, value)| ChoiceOption {
            label: label.to_string(),
            value: Some(value),
        })
        .collect();

    Question {
        options: Some(QuestionOptions { max: None, choices }),
        ..question(id, QuestionKind::MultipleChoice, weight, category)
    }
}

pub(super) fn response(question: Question, answer: AnswerValue) -> Response {
    Response {
        id: ResponseId(format!("rsp-{}", question.id)),
        question,
        answer_value: Some(answer),
    }
}

pub(super) fn choice(value: f64) -> AnswerValue {
    AnswerValue::Choice(ChoiceAnswer {
        value: Some(value),
        label: None,
    })
}

/// Cash management (scale, weight 2), bookkeeping (boolean), social media cadence
/// (choice, max 4) and website presence (boolean).
pub(super) fn template() -> AssessmentTemplate {
    AssessmentTemplate {
        id: TemplateId::new(TEMPLATE),
        name: "Kesiapan UMKM".to_string(),
        description: "Penilaian kesiapan usaha".to_string(),
        questions: vec![
            question("q-kas", QuestionKind::Scale, 2.0, keuangan()),
            question("q-pembukuan", QuestionKind::Boolean, 1.0, keuangan()),
            choice_question("q-medsos", 1.0, pemasaran()),
            question("q-website", QuestionKind::Boolean, 1.0, digital()),
        ],
    }
}

fn rule(
    id: &str,
    category_id: Option<&str>,
    min_score: Option<f64>,
    max_score: Option<f64>,
    priority: RecommendationPriority,
) -> RecommendationRule {
    RecommendationRule {
        id: RuleId::new(id),
        template_id: TemplateId::new(TEMPLATE),
        category_id: category_id.map(CategoryId::new),
        min_score,
        max_score,
        title: format!("title {id}"),
        description: format!("description {id}"),
        priority,
        action_items: vec![format!("action {id}")],
        resources: vec![format!("https://umkm.example/{id}")],
    }
}

pub(super) fn rules() -> Vec<RecommendationRule> {
    vec![
        rule("general-low", None, None, Some(40.0), RecommendationPriority::High),
        rule("general-high", None, Some(70.0), None, RecommendationPriority::Low),
        rule("keuangan", Some("keuangan"), None, Some(50.0), RecommendationPriority::High),
        rule("digital", Some("digital"), None, Some(50.0), RecommendationPriority::Medium),
        rule("ekspor", Some("ekspor"), None, None, RecommendationPriority::Low),
        rule(
            "pemasaran-mid",
            Some("pemasaran"),
            Some(50.0),
            Some(80.0),
            RecommendationPriority::Medium,
        ),
    ]
}

pub(super) fn answer(question_id: &str, value: AnswerValue) -> AnswerSubmission {
    AnswerSubmission {
        question_id: QuestionId::new(question_id),
        answer_value: Some(value),
    }
}

/// Total 13: kas 1/5 (w2), no bookkeeping, social media 1/4, no website.
pub(super) fn weak_answers() -> Vec<AnswerSubmission> {
    vec![
        answer("q-kas", AnswerValue::Number(1.0)),
        answer("q-pembukuan", AnswerValue::Boolean(false)),
        answer("q-medsos", choice(1.0)),
        answer("q-website", AnswerValue::Text("false".to_string())),
    ]
}

pub(super) fn strong_answers() -> Vec<AnswerSubmission> {
    vec![
        answer("q-kas", AnswerValue::Number(5.0)),
        answer("q-pembukuan", AnswerValue::Boolean(true)),
        answer("q-medsos", choice(4.0)),
        answer("q-website", AnswerValue::Text("true".to_string())),
    ]
}

pub(super) fn owner() -> UserId {
    UserId::new("user-siti")
}

pub(super) fn stranger() -> UserId {
    UserId::new("user-budi")
}

#[derive(Default, Clone)]
pub(super) struct MemoryAssessments {
    pub(super) assessments: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
    pub(super) templates: Arc<Mutex<HashMap<TemplateId, AssessmentTemplate>>>,
    pub(super) responses: Arc<Mutex<HashMap<AssessmentId, Vec<Response>>>>,
    pub(super) scores: Arc<Mutex<HashMap<AssessmentId, ScoreRecord>>>,
}

impl MemoryAssessments {
    pub(super) fn with_template(template: AssessmentTemplate) -> Self {
        let repository = Self::default();
        repository
            .templates
            .lock()
            .expect("template mutex poisoned")
            .insert(template.id.clone(), template);
        repository
    }

    pub(super) fn remove_template(&self, id: &TemplateId) {
        self.templates
            .lock()
            .expect("template mutex poisoned")
            .remove(id);
    }
}

impl AssessmentRepository for MemoryAssessments {
    fn insert_assessment(
        &self,
        record: AssessmentRecord,
    ) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update_assessment(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch_assessment(
        &self,
        id: &AssessmentId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.assessments.lock().expect("assessment mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_template(
        &self,
        id: &TemplateId,
    ) -> Result<Option<AssessmentTemplate>, RepositoryError> {
        let guard = self.templates.lock().expect("template mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let guard = self.templates.lock().expect("template mutex poisoned");
        let mut categories: Vec<Category> = Vec::new();
        for category in guard.values().flat_map(|template| template.categories()) {
            if !categories.iter().any(|known| known.id == category.id) {
                categories.push(category);
            }
        }
        Ok(categories)
    }

    fn upsert_responses(
        &self,
        id: &AssessmentId,
        responses: Vec<Response>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.responses.lock().expect("response mutex poisoned");
        let stored = guard.entry(id.clone()).or_default();
        for response in responses {
            stored.retain(|existing| existing.question.id != response.question.id);
            stored.push(response);
        }
        Ok(())
    }

    fn responses(&self, id: &AssessmentId) -> Result<Vec<Response>, RepositoryError> {
        let guard = self.responses.lock().expect("response mutex poisoned");
        Ok(guard.get(id).cloned().unwrap_or_default())
    }

    fn save_score(&self, score: ScoreRecord) -> Result<ScoreRecord, RepositoryError> {
        let mut guard = self.scores.lock().expect("score mutex poisoned");
        guard.insert(score.assessment_id.clone(), score.clone());
        Ok(score)
    }

    fn latest_score(&self, id: &AssessmentId) -> Result<Option<ScoreRecord>, RepositoryError> {
        let guard = self.scores.lock().expect("score mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRecommendations {
    pub(super) rules: Arc<Mutex<Vec<RecommendationRule>>>,
    pub(super) stored: Arc<Mutex<Vec<Recommendation>>>,
    pub(super) insert_calls: Arc<Mutex<usize>>,
    pub(super) rules_offline: Arc<Mutex<bool>>,
}

impl MemoryRecommendations {
    pub(super) fn with_rules(rules: Vec<RecommendationRule>) -> Self {
        let repository = Self::default();
        *repository.rules.lock().expect("rule mutex poisoned") = rules;
        repository
    }

    pub(super) fn insert_calls(&self) -> usize {
        *self.insert_calls.lock().expect("counter mutex poisoned")
    }

    pub(super) fn set_rules_offline(&self, offline: bool) {
        *self.rules_offline.lock().expect("flag mutex poisoned") = offline;
    }

    pub(super) fn stored(&self) -> Vec<Recommendation> {
        self.stored.lock().expect("recommendation mutex poisoned").clone()
    }
}

impl RecommendationRepository for MemoryRecommendations {
    fn rules_for_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<Vec<RecommendationRule>, RepositoryError> {
        if *self.rules_offline.lock().expect("flag mutex poisoned") {
            return Err(RepositoryError::Unavailable("rule table offline".to_string()));
        }
        let guard = self.rules.lock().expect("rule mutex poisoned");
        Ok(guard
            .iter()
            .filter(|rule| &rule.template_id == template_id)
            .cloned()
            .collect())
    }

    fn delete_for_assessment(&self, id: &AssessmentId) -> Result<usize, RepositoryError> {
        let mut guard = self.stored.lock().expect("recommendation mutex poisoned");
        let before = guard.len();
        guard.retain(|recommendation| &recommendation.assessment_id != id);
        Ok(before - guard.len())
    }

    fn insert_many(&self, recommendations: Vec<Recommendation>) -> Result<(), RepositoryError> {
        *self.insert_calls.lock().expect("counter mutex poisoned") += 1;
        self.stored
            .lock()
            .expect("recommendation mutex poisoned")
            .extend(recommendations);
        Ok(())
    }

    fn for_assessment(&self, id: &AssessmentId) -> Result<Vec<Recommendation>, RepositoryError> {
        let guard = self.stored.lock().expect("recommendation mutex poisoned");
        Ok(guard
            .iter()
            .filter(|recommendation| &recommendation.assessment_id == id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRecommendations;

impl RecommendationRepository for UnavailableRecommendations {
    fn rules_for_template(
        &self,
        _template_id: &TemplateId,
    ) -> Result<Vec<RecommendationRule>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_for_assessment(&self, _id: &AssessmentId) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_many(&self, _recommendations: Vec<Recommendation>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_assessment(&self, _id: &AssessmentId) -> Result<Vec<Recommendation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type MemoryService = AssessmentService<MemoryAssessments, MemoryRecommendations>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<MemoryAssessments>,
    Arc<MemoryRecommendations>,
) {
    let assessments = Arc::new(MemoryAssessments::with_template(template()));
    let recommendations = Arc::new(MemoryRecommendations::with_rules(rules()));
    let service = AssessmentService::new(
        assessments.clone(),
        recommendations.clone(),
        ScoringConfig::default(),
    );
    (service, assessments, recommendations)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    assessment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: HttpResponse) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
