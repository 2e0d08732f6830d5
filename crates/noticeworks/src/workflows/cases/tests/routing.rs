use super::common::*;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::workflows::cases::router::{self, case_router, OpenCaseRequest};
use crate::workflows::cases::service::CaseService;
use crate::workflows::catalog::EmbeddedDefinitions;
use crate::workflows::scope::{CaseType, Jurisdiction, Product};

fn post_json(uri: &str, body: Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::get(uri)
        .body(axum::body::Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn open_route_creates_cases() {
    let (service, _) = build_service();
    let router = case_router(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/cases",
            json!({
                "product": "notice_builder",
                "jurisdiction": "england",
                "case_type": "eviction",
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert!(payload["case_id"]
        .as_str()
        .unwrap_or_default()
        .starts_with("case-"));
    assert_eq!(payload["jurisdiction_label"], json!("England"));
    assert_eq!(payload["progress"]["percent"], json!(0));
}

#[tokio::test]
async fn open_route_maps_missing_definitions_to_not_found() {
    let (service, _) = build_service();
    let router = case_router(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/cases",
            json!({
                "product": "notice_builder",
                "jurisdiction": "northern_ireland",
                "case_type": "eviction",
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("no definition is configured"));
}

#[tokio::test]
async fn unknown_cases_are_not_found() {
    let (service, _) = build_service();
    let router = case_router(service);

    let response = router
        .oneshot(get("/api/v1/cases/case-999999"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("not found"));
}

#[tokio::test]
async fn answer_route_validates_payloads() {
    let (service, _) = build_service();
    let case_id = open_england_case(&service);
    let router = case_router(service);
    let uri = format!("/api/v1/cases/{case_id}/answers");

    let rejected = router
        .clone()
        .oneshot(post_json(
            &uri,
            json!({"question_id": "tenancy_type", "value": 42}),
        ))
        .await
        .expect("route executes");
    assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let accepted = router
        .oneshot(post_json(
            &uri,
            json!({"question_id": "tenancy_type", "value": "assured_shorthold"}),
        ))
        .await
        .expect("route executes");
    assert_eq!(accepted.status(), StatusCode::OK);
    let payload = read_json_body(accepted).await;
    assert_eq!(
        payload["receipt"]["updated_paths"],
        json!(["tenancy.type"])
    );
    assert_eq!(payload["next"]["question"]["id"], json!("tenancy_start"));
}

#[tokio::test]
async fn gate_route_reports_denials_with_ok() {
    let (service, _) = build_service();
    let case_id = open_england_case(&service);
    let router = case_router(service);

    let response = router
        .oneshot(get(&format!("/api/v1/cases/{case_id}/gate")))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["allowed"], json!(false));
    assert_eq!(payload["reasons"][0]["kind"], json!("no_outcome_selected"));
    assert!(payload["reason_messages"][0]
        .as_str()
        .unwrap_or_default()
        .contains("no outcome"));
}

#[tokio::test]
async fn export_route_maps_blocked_to_conflict() {
    let (service, _) = build_service();
    let case_id = open_england_case(&service);
    complete_arrears_walk(&service, &case_id);
    let router = case_router(service);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/cases/{case_id}/export"),
            json!({}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("export blocked"));
    assert!(payload["reasons"].is_array());
}

#[tokio::test]
async fn selection_route_maps_unavailable_outcomes_to_conflict() {
    let (service, _) = build_service();
    let case_id = open_england_case(&service);
    let router = case_router(service);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/cases/{case_id}/selection"),
            json!({"rule_id": "ground8_serious_arrears"}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn ledger_route_rejects_unparseable_rows() {
    let (service, _) = build_service();
    let case_id = open_england_case(&service);
    let router = case_router(service);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/cases/{case_id}/ledger"),
            json!({"csv": "Due Date,Amount Due,Amount Paid,Paid Date\nnot-a-date,950,,\n"}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("row 1"));
}

#[tokio::test]
async fn ledger_route_imports_summaries() {
    let (service, _) = build_service();
    let case_id = open_england_case(&service);
    let router = case_router(service);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/cases/{case_id}/ledger"),
            json!({"csv": SAMPLE_LEDGER}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["summary"]["arrears_amount"], json!(1500.0));
    assert_eq!(payload["receipts"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn status_handler_returns_case_views() {
    let (service, _) = build_service();
    let case_id = open_england_case(&service);

    let response = router::status_handler::<MemoryRepository>(
        State(service),
        axum::extract::Path(case_id.0.clone()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["case_id"], json!(case_id.0));
    assert_eq!(payload["product_label"], json!("Notice Builder"));
}

#[tokio::test]
async fn open_handler_maps_repository_failures_to_internal_error() {
    let service = Arc::new(CaseService::new(
        Arc::new(UnavailableRepository),
        Arc::new(EmbeddedDefinitions),
    ));

    let response = router::open_handler::<UnavailableRepository>(
        State(service),
        axum::Json(OpenCaseRequest {
            product: Product::NoticeBuilder,
            jurisdiction: Jurisdiction::England,
            case_type: CaseType::Eviction,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
