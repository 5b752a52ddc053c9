use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use umkm_assessment::config::CatalogConfig;
use umkm_assessment::error::AppError;
use umkm_assessment::workflows::assessment::{
    standard_rules, standard_template, AnswerSubmission, AssessmentId, AssessmentRecord,
    AssessmentRepository, AssessmentService, AssessmentTemplate, Category, Recommendation,
    RecommendationRepository, RecommendationRule, RepositoryError, Response, ScoreRecord,
    ScoringConfig, TemplateId,
};
use umkm_assessment::workflows::rule_catalog::RuleCatalogImporter;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type InMemoryAssessmentService =
    AssessmentService<InMemoryAssessmentRepository, InMemoryRecommendationRepository>;

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{what} store lock poisoned")))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    assessments: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
    templates: Arc<Mutex<HashMap<TemplateId, AssessmentTemplate>>>,
    responses: Arc<Mutex<HashMap<AssessmentId, Vec<Response>>>>,
    scores: Arc<Mutex<HashMap<AssessmentId, Vec<ScoreRecord>>>>,
}

impl InMemoryAssessmentRepository {
    pub(crate) fn with_templates(
        templates: impl IntoIterator<Item = AssessmentTemplate>,
    ) -> Self {
        let templates = templates
            .into_iter()
            .map(|template| (template.id.clone(), template))
            .collect();
        Self {
            templates: Arc::new(Mutex::new(templates)),
            ..Self::default()
        }
    }
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert_assessment(
        &self,
        record: AssessmentRecord,
    ) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = lock(&self.assessments, "assessment")?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update_assessment(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.assessments, "assessment")?;
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch_assessment(
        &self,
        id: &AssessmentId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = lock(&self.assessments, "assessment")?;
        Ok(guard.get(id).cloned())
    }

    fn fetch_template(
        &self,
        id: &TemplateId,
    ) -> Result<Option<AssessmentTemplate>, RepositoryError> {
        let guard = lock(&self.templates, "template")?;
        Ok(guard.get(id).cloned())
    }

    fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let guard = lock(&self.templates, "template")?;
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
        let mut guard = lock(&self.responses, "response")?;
        let stored = guard.entry(id.clone()).or_default();
        for response in responses {
            stored.retain(|existing| existing.question.id != response.question.id);
            stored.push(response);
        }
        Ok(())
    }

    fn responses(&self, id: &AssessmentId) -> Result<Vec<Response>, RepositoryError> {
        let guard = lock(&self.responses, "response")?;
        Ok(guard.get(id).cloned().unwrap_or_default())
    }

    fn save_score(&self, score: ScoreRecord) -> Result<ScoreRecord, RepositoryError> {
        let mut guard = lock(&self.scores, "score")?;
        guard
            .entry(score.assessment_id.clone())
            .or_default()
            .push(score.clone());
        Ok(score)
    }

    fn latest_score(&self, id: &AssessmentId) -> Result<Option<ScoreRecord>, RepositoryError> {
        let guard = lock(&self.scores, "score")?;
        Ok(guard
            .get(id)
            .and_then(|history| history.iter().max_by_key(|score| score.calculated_at))
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRecommendationRepository {
    rules: Arc<Vec<RecommendationRule>>,
    recommendations: Arc<Mutex<Vec<Recommendation>>>,
}

impl InMemoryRecommendationRepository {
    pub(crate) fn with_rules(rules: Vec<RecommendationRule>) -> Self {
        Self {
            rules: Arc::new(rules),
            ..Self::default()
        }
    }
}

impl RecommendationRepository for InMemoryRecommendationRepository {
    fn rules_for_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<Vec<RecommendationRule>, RepositoryError> {
        Ok(self
            .rules
            .iter()
            .filter(|rule| &rule.template_id == template_id)
            .cloned()
            .collect())
    }

    fn delete_for_assessment(&self, id: &AssessmentId) -> Result<usize, RepositoryError> {
        let mut guard = lock(&self.recommendations, "recommendation")?;
        let before = guard.len();
        guard.retain(|recommendation| &recommendation.assessment_id != id);
        Ok(before - guard.len())
    }

    fn insert_many(&self, recommendations: Vec<Recommendation>) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.recommendations, "recommendation")?;
        guard.extend(recommendations);
        Ok(())
    }

    fn for_assessment(&self, id: &AssessmentId) -> Result<Vec<Recommendation>, RepositoryError> {
        let guard = lock(&self.recommendations, "recommendation")?;
        Ok(guard
            .iter()
            .filter(|recommendation| &recommendation.assessment_id == id)
            .cloned()
            .collect())
    }
}

/// Rule table from `path` when given, otherwise the bundled catalog.
pub(crate) fn load_rules(path: Option<&Path>) -> Result<Vec<RecommendationRule>, AppError> {
    let rules = match path {
        Some(path) => RuleCatalogImporter::from_path(path)?,
        None => standard_rules()?,
    };
    Ok(rules)
}

pub(crate) fn catalog_rules(catalog: &CatalogConfig) -> Result<Vec<RecommendationRule>, AppError> {
    load_rules(catalog.rules_csv.as_deref())
}

pub(crate) fn in_memory_service(
    rules: Vec<RecommendationRule>,
    scoring: ScoringConfig,
) -> Result<InMemoryAssessmentService, AppError> {
    let template = standard_template()?;
    let assessments = Arc::new(InMemoryAssessmentRepository::with_templates([template]));
    let recommendations = Arc::new(InMemoryRecommendationRepository::with_rules(rules));
    Ok(AssessmentService::new(assessments, recommendations, scoring))
}

/// Accepts either a bare answer list or `{ "answers": [...] }`.
pub(crate) fn parse_answers(raw: &str) -> Result<Vec<AnswerSubmission>, AppError> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum AnswerFile {
        List(Vec<AnswerSubmission>),
        Wrapped { answers: Vec<AnswerSubmission> },
    }

    let answers = match serde_json::from_str::<AnswerFile>(raw)? {
        AnswerFile::List(answers) | AnswerFile::Wrapped { answers } => answers,
    };
    Ok(answers)
}
