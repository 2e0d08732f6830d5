use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::workflows::eligibility::RuleId;
use crate::workflows::intake::QuestionId;
use crate::workflows::scope::{CaseType, Jurisdiction, Product};
use crate::workflows::source::DefinitionError;

use super::domain::CaseId;
use super::repository::{CaseRepository, RepositoryError};
use super::service::{CaseService, CaseServiceError};

/// Router builder exposing the case lifecycle over HTTP. Gate checks return
/// 200 whether or not the case clears; a denial is a read-out, not a fault.
pub fn case_router<R>(service: Arc<CaseService<R>>) -> Router
where
    R: CaseRepository + 'static,
{
    Router::new()
        .route("/api/v1/cases", post(open_handler::<R>))
        .route("/api/v1/cases/:case_id", get(status_handler::<R>))
        .route("/api/v1/cases/:case_id/next", get(next_handler::<R>))
        .route("/api/v1/cases/:case_id/answers", post(answer_handler::<R>))
        .route("/api/v1/cases/:case_id/guidance", get(guidance_handler::<R>))
        .route(
            "/api/v1/cases/:case_id/selection",
            post(selection_handler::<R>),
        )
        .route("/api/v1/cases/:case_id/gate", get(gate_handler::<R>))
        .route("/api/v1/cases/:case_id/export", post(export_handler::<R>))
        .route("/api/v1/cases/:case_id/ledger", post(ledger_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct OpenCaseRequest {
    pub product: Product,
    pub jurisdiction: Jurisdiction,
    pub case_type: CaseType,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_id: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub rule_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LedgerImportRequest {
    pub csv: String,
}

pub(crate) async fn open_handler<R>(
    State(service): State<Arc<CaseService<R>>>,
    axum::Json(request): axum::Json<OpenCaseRequest>,
) -> Response
where
    R: CaseRepository + 'static,
{
    match service.open(request.product, request.jurisdiction, request.case_type) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<CaseService<R>>>,
    Path(case_id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
{
    match service.status(&CaseId(case_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn next_handler<R>(
    State(service): State<Arc<CaseService<R>>>,
    Path(case_id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
{
    match service.next_step(&CaseId(case_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn answer_handler<R>(
    State(service): State<Arc<CaseService<R>>>,
    Path(case_id): Path<String>,
    axum::Json(request): axum::Json<AnswerRequest>,
) -> Response
where
    R: CaseRepository + 'static,
{
    let question_id = QuestionId(request.question_id);
    match service.answer(&CaseId(case_id), &question_id, &request.value) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn guidance_handler<R>(
    State(service): State<Arc<CaseService<R>>>,
    Path(case_id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
{
    match service.guidance(&CaseId(case_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn selection_handler<R>(
    State(service): State<Arc<CaseService<R>>>,
    Path(case_id): Path<String>,
    axum::Json(request): axum::Json<SelectionRequest>,
) -> Response
where
    R: CaseRepository + 'static,
{
    let rule_id = RuleId(request.rule_id);
    match service.select_outcome(&CaseId(case_id), &rule_id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn gate_handler<R>(
    State(service): State<Arc<CaseService<R>>>,
    Path(case_id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
{
    match service.check_gate(&CaseId(case_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<CaseService<R>>>,
    Path(case_id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
{
    match service.export(&CaseId(case_id)) {
        Ok(bundle) => (StatusCode::OK, axum::Json(bundle)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn ledger_handler<R>(
    State(service): State<Arc<CaseService<R>>>,
    Path(case_id): Path<String>,
    axum::Json(request): axum::Json<LedgerImportRequest>,
) -> Response
where
    R: CaseRepository + 'static,
{
    match service.import_rent_ledger(&CaseId(case_id), &request.csv) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: CaseServiceError) -> Response {
    let status = match &error {
        CaseServiceError::UnknownCase(_) => StatusCode::NOT_FOUND,
        CaseServiceError::Definition(DefinitionError::NotFound { .. }) => StatusCode::NOT_FOUND,
        CaseServiceError::Definition(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CaseServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        CaseServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        CaseServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        CaseServiceError::Answer(_) | CaseServiceError::Ledger(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CaseServiceError::OutcomeNotAvailable(_) => StatusCode::CONFLICT,
        CaseServiceError::ExportBlocked { .. } => StatusCode::CONFLICT,
    };

    let body = match &error {
        CaseServiceError::ExportBlocked { reasons } => json!({
            "error": error.to_string(),
            "reasons": reasons,
        }),
        _ => json!({
            "error": error.to_string(),
        }),
    };
    (status, axum::Json(body)).into_response()
}
