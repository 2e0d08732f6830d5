//! Rule-driven eligibility decisions for possession routes.
//!
//! A rule set is a priority-ordered decision table plus blocking checks and
//! advisories. The engine turns it and the current facts into a read-out of
//! recommended routes; the gate re-runs that read-out fail-closed before any
//! notice is generated or served.

pub mod definition;
pub mod engine;
pub mod gate;
pub mod loader;
pub mod timeline;

#[cfg(test)]
mod tests;

pub use definition::{
    Advisory, BlockingCheck, GroundClassification, GroundRef, RouteOutcome, RuleDefinition,
    RuleId, RuleSet, SuccessLikelihood,
};
pub use engine::{evaluate, BlockingIssue, DecisionResult, RecommendedOutcome};
pub use gate::{check_gate, GateReason, GatingResult, SelectedOutcome};
pub use loader::RuleSetLoader;
pub use timeline::{notice_timeline, NoticeTimeline, PLANNED_SERVICE_DATE};
