use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use noticeworks::error::AppError;
use noticeworks::workflows::cases::{case_router, CaseRepository, CaseService, CaseServiceError};
use noticeworks::workflows::intake::{parse_ledger, RentLedgerSummary};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct LedgerPreviewRequest {
    pub(crate) csv: String,
}

/// Summary of a rent ledger before any case exists, so a landlord can see
/// what the import would conclude without committing to the questionnaire.
#[derive(Debug, Serialize)]
pub(crate) struct LedgerPreviewResponse {
    pub(crate) in_arrears: bool,
    pub(crate) summary: RentLedgerSummary,
}

pub(crate) fn with_case_routes<R>(service: Arc<CaseService<R>>) -> axum::Router
where
    R: CaseRepository + 'static,
{
    case_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/ledger/preview",
            axum::routing::post(ledger_preview_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn ledger_preview_endpoint(
    Json(payload): Json<LedgerPreviewRequest>,
) -> Result<Json<LedgerPreviewResponse>, AppError> {
    let summary =
        parse_ledger(Cursor::new(payload.csv.into_bytes())).map_err(CaseServiceError::from)?;

    Ok(Json(LedgerPreviewResponse {
        in_arrears: summary.in_arrears(),
        summary,
    }))
}
