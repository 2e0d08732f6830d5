//! Serialisable shapes the API hands back to clients. Views flatten the
//! engine's results with the labels and form references a front end needs,
//! without exposing internal state.

use crate::facts::FactPath;
use crate::workflows::cases::domain::CaseId;
use crate::workflows::eligibility::{
    BlockingIssue, DecisionResult, GateReason, GatingResult, GroundRef, NoticeTimeline,
    RecommendedOutcome, RouteOutcome, RuleId,
};
use crate::workflows::intake::{
    AnswerReceipt, QuestionDefinition, QuestionKind, QuestionSet, RentLedgerSummary,
    WizardProgress,
};
use crate::workflows::scope::{CaseType, Jurisdiction, NoticeRoute, Product};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CaseStatusView {
    pub case_id: CaseId,
    pub product: Product,
    pub product_label: &'static str,
    pub jurisdiction: Jurisdiction,
    pub jurisdiction_label: &'static str,
    pub case_type: CaseType,
    pub progress: WizardProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_route: Option<NoticeRoute>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub prompt: String,
    pub kind: QuestionKind,
    pub required: bool,
    pub section_id: String,
    pub section_title: String,
}

impl QuestionView {
    pub fn for_question(set: &QuestionSet, question: &QuestionDefinition) -> Self {
        let section = set.section_of(&question.id);
        Self {
            id: question.id.0.clone(),
            prompt: question.prompt.clone(),
            kind: question.kind.clone(),
            required: question.required,
            section_id: section.map(|s| s.id.clone()).unwrap_or_default(),
            section_title: section.map(|s| s.title.clone()).unwrap_or_default(),
        }
    }
}

/// What the client renders after asking "what next": either the next
/// question or completion, plus progress either way.
#[derive(Debug, Clone, Serialize)]
pub struct NextStepView {
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    pub progress: WizardProgress,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendedOutcomeView {
    pub rule_id: RuleId,
    pub priority: i32,
    pub route: NoticeRoute,
    pub route_label: &'static str,
    pub form_reference: &'static str,
    pub grounds: Vec<GroundRef>,
    pub classification_label: &'static str,
    pub notice_period_days: u16,
    pub success_likelihood_label: &'static str,
}

impl RecommendedOutcomeView {
    fn from_outcome(recommended: &RecommendedOutcome) -> Self {
        let RouteOutcome {
            route,
            grounds,
            classification,
            notice_period_days,
            success_likelihood,
        } = &recommended.outcome;
        Self {
            rule_id: recommended.rule_id.clone(),
            priority: recommended.priority,
            route: *route,
            route_label: route.label(),
            form_reference: route.form_reference(),
            grounds: grounds.clone(),
            classification_label: classification.label(),
            notice_period_days: *notice_period_days,
            success_likelihood_label: success_likelihood.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<RecommendedOutcomeView>,
    pub recommended: Vec<RecommendedOutcomeView>,
    pub blocking_issues: Vec<BlockingIssue>,
    pub missing_facts: Vec<FactPath>,
    pub warnings: Vec<String>,
}

impl DecisionView {
    pub fn from_decision(decision: &DecisionResult) -> Self {
        let recommended: Vec<RecommendedOutcomeView> = decision
            .recommended
            .iter()
            .map(RecommendedOutcomeView::from_outcome)
            .collect();
        Self {
            primary: recommended.first().cloned(),
            recommended,
            blocking_issues: decision.blocking_issues.clone(),
            missing_facts: decision.missing_facts.clone(),
            warnings: decision.warnings.clone(),
        }
    }
}

/// Result of applying one answer: the receipt, where the wizard goes next,
/// and an interim decision read-out when a checkpoint section was completed.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcomeView {
    pub receipt: AnswerReceipt,
    pub next: NextStepView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<DecisionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GateView {
    pub allowed: bool,
    pub reasons: Vec<GateReason>,
    /// Human-readable renderings of `reasons`, in the same order.
    pub reason_messages: Vec<String>,
}

impl GateView {
    pub fn from_result(result: &GatingResult) -> Self {
        Self {
            allowed: result.allowed,
            reason_messages: result.reasons.iter().map(|r| r.to_string()).collect(),
            reasons: result.reasons.clone(),
        }
    }
}

/// The bundle a downstream document generator consumes. Only produced when
/// the gate allows.
#[derive(Debug, Clone, Serialize)]
pub struct ExportBundle {
    pub case_id: CaseId,
    pub jurisdiction: Jurisdiction,
    pub route: NoticeRoute,
    pub form_reference: &'static str,
    pub outcome: RouteOutcome,
    pub facts: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<NoticeTimeline>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerImportView {
    pub summary: RentLedgerSummary,
    pub receipts: Vec<AnswerReceipt>,
    pub next: NextStepView,
}
