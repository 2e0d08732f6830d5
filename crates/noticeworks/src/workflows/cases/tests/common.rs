use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::{json, Value};

use crate::workflows::cases::domain::{CaseId, CaseRecord};
use crate::workflows::cases::repository::{CaseRepository, RepositoryError};
use crate::workflows::cases::service::CaseService;
use crate::workflows::cases::views::AnswerOutcomeView;
use crate::workflows::catalog::EmbeddedDefinitions;
use crate::workflows::intake::QuestionId;
use crate::workflows::scope::{CaseType, Jurisdiction, Product};

/// Three monthly charges of £950: one paid on time, one short-paid late,
/// one missed entirely. £1,500 behind, 1.58 months at the mean charge.
pub(super) const SAMPLE_LEDGER: &str = "Due Date,Amount Due,Amount Paid,Paid Date\n\
    2025-03-01,950,950,2025-03-01\n\
    2025-04-01,950,400,2025-04-09\n\
    2025-05-01,950,,\n";

pub(super) fn build_service() -> (Arc<CaseService<MemoryRepository>>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(CaseService::new(
        repository.clone(),
        Arc::new(EmbeddedDefinitions),
    ));
    (service, repository)
}

pub(super) fn open_england_case(service: &CaseService<MemoryRepository>) -> CaseId {
    service
        .open(
            Product::NoticeBuilder,
            Jurisdiction::England,
            CaseType::Eviction,
        )
        .expect("case opens")
        .case_id
}

pub(super) fn answer(
    service: &CaseService<MemoryRepository>,
    case_id: &CaseId,
    question_id: &str,
    value: Value,
) -> AnswerOutcomeView {
    service
        .answer(case_id, &QuestionId::from(question_id), &value)
        .unwrap_or_else(|err| panic!("answer '{question_id}' failed: {err}"))
}

/// Every applicable England question, in declaration order, for a serious
/// arrears case with the deposit and compliance paperwork in order.
pub(super) fn arrears_walk() -> Vec<(&'static str, Value)> {
    vec![
        ("tenancy_type", json!("assured_shorthold")),
        ("tenancy_start", json!("2022-06-01")),
        ("fixed_term", json!(false)),
        ("rent_amount", json!(950)),
        ("rent_period", json!("monthly")),
        ("deposit_taken", json!(true)),
        ("deposit_protected", json!(true)),
        ("prescribed_info", json!(true)),
        ("has_arrears", json!(true)),
        ("arrears_months", json!(4)),
        ("arrears_amount", json!(3800)),
        ("persistent_delay", json!(true)),
        ("antisocial", json!(false)),
        ("breach_of_tenancy", json!(false)),
        ("gas_safety", json!(true)),
        ("epc", json!(true)),
        ("how_to_rent", json!(true)),
        ("licensing_required", json!(false)),
        ("planned_service_date", json!("2025-11-03")),
        ("service_method", json!("first_class_post")),
    ]
}

pub(super) fn complete_arrears_walk(service: &CaseService<MemoryRepository>, case_id: &CaseId) {
    for (question_id, value) in arrears_walk() {
        answer(service, case_id, question_id, value);
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<CaseId, CaseRecord>>>,
}

impl CaseRepository for MemoryRepository {
    fn insert(&self, record: CaseRecord) -> Result<CaseRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.case_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.case_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: CaseRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.case_id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.case_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &CaseId) -> Result<Option<CaseRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct UnavailableRepository;

impl CaseRepository for UnavailableRepository {
    fn insert(&self, _record: CaseRecord) -> Result<CaseRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: CaseRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &CaseId) -> Result<Option<CaseRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
