//! Case lifecycle: open a case, drive the questionnaire, read the decision,
//! select an outcome, and export once the gate clears.
//!
//! The service layer is generic over [`CaseRepository`] so hosts can plug in
//! their own persistence. Views are the only shapes serialized to callers;
//! the wizard state and fact tree never leave the crate unwrapped.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{CaseId, CaseRecord};
pub use repository::{CaseRepository, RepositoryError};
pub use router::{case_router, AnswerRequest, LedgerImportRequest, OpenCaseRequest, SelectionRequest};
pub use service::{CaseService, CaseServiceError};
pub use views::{
    AnswerOutcomeView, CaseStatusView, DecisionView, ExportBundle, GateView, LedgerImportView,
    NextStepView, QuestionView, RecommendedOutcomeView,
};
