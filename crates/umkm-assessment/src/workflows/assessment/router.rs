use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AnswerSubmission, AssessmentId, TemplateId, UserId};
use super::level::level_details;
use super::recommendation::RecommendationError;
use super::repository::{AssessmentRepository, RecommendationRepository, RepositoryError};
use super::service::{AssessmentService, AssessmentServiceError};

pub const USER_HEADER: &str = "x-user-id";

#[derive(Debug, Deserialize)]
pub struct StartAssessmentRequest {
    pub template_id: TemplateId,
}

#[derive(Debug, Deserialize)]
pub struct RecordResponsesRequest {
    pub answers: Vec<AnswerSubmission>,
}

/// Router builder exposing the assessment lifecycle and level lookup endpoints.
pub fn assessment_router<A, R>(service: Arc<AssessmentService<A, R>>) -> Router
where
    A: AssessmentRepository + 'static,
    R: RecommendationRepository + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(start_handler::<A, R>))
        .route(
            "/api/v1/assessments/:assessment_id/responses",
            put(responses_handler::<A, R>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/submit",
            post(submit_handler::<A, R>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/recalculate",
            post(recalculate_handler::<A, R>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/result",
            get(result_handler::<A, R>),
        )
        .route("/api/v1/levels/:level", get(level_handler))
        .with_state(service)
}

pub(crate) async fn start_handler<A, R>(
    State(service): State<Arc<AssessmentService<A, R>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<StartAssessmentRequest>,
) -> Response
where
    A: AssessmentRepository + 'static,
    R: RecommendationRepository + 'static,
{
    let Some(user_id) = caller(&headers) else {
        return unauthenticated();
    };

    match service.start(&user_id, &request.template_id) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view(0))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn responses_handler<A, R>(
    State(service): State<Arc<AssessmentService<A, R>>>,
    Path(assessment_id): Path<String>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<RecordResponsesRequest>,
) -> Response
where
    A: AssessmentRepository + 'static,
    R: RecommendationRepository + 'static,
{
    let Some(user_id) = caller(&headers) else {
        return unauthenticated();
    };

    let id = AssessmentId(assessment_id);
    match service.record_responses(&user_id, &id, request.answers) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<A, R>(
    State(service): State<Arc<AssessmentService<A, R>>>,
    Path(assessment_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    A: AssessmentRepository + 'static,
    R: RecommendationRepository + 'static,
{
    let Some(user_id) = caller(&headers) else {
        return unauthenticated();
    };

    match service.submit(&user_id, &AssessmentId(assessment_id)) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recalculate_handler<A, R>(
    State(service): State<Arc<AssessmentService<A, R>>>,
    Path(assessment_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    A: AssessmentRepository + 'static,
    R: RecommendationRepository + 'static,
{
    let Some(user_id) = caller(&headers) else {
        return unauthenticated();
    };

    match service.recalculate(&user_id, &AssessmentId(assessment_id)) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn result_handler<A, R>(
    State(service): State<Arc<AssessmentService<A, R>>>,
    Path(assessment_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    A: AssessmentRepository + 'static,
    R: RecommendationRepository + 'static,
{
    let Some(user_id) = caller(&headers) else {
        return unauthenticated();
    };

    match service.result(&user_id, &AssessmentId(assessment_id)) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn level_handler(Path(level): Path<String>) -> Response {
    let details = level_details(&level);
    (StatusCode::OK, axum::Json(details)).into_response()
}

fn caller(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(UserId::new)
}

fn unauthenticated() -> Response {
    let payload = json!({
        "error": format!("missing {USER_HEADER} header"),
    });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = match &error {
        AssessmentServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        AssessmentServiceError::AlreadyCompleted(_) | AssessmentServiceError::NotCompleted(_) => {
            StatusCode::CONFLICT
        }
        AssessmentServiceError::UnknownQuestion(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::NotScored(_)
        | AssessmentServiceError::TemplateNotFound(_)
        | AssessmentServiceError::Repository(RepositoryError::NotFound)
        | AssessmentServiceError::Recommendation(
            RecommendationError::AssessmentNotFound(_) | RecommendationError::TemplateNotFound(_),
        ) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AssessmentServiceError::Repository(RepositoryError::Unavailable(_))
        | AssessmentServiceError::Recommendation(RecommendationError::Repository(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
