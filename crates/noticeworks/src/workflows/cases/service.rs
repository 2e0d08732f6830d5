use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::domain::{CaseId, CaseRecord};
use super::repository::{CaseRepository, RepositoryError};
use super::views::{
    AnswerOutcomeView, CaseStatusView, DecisionView, ExportBundle, GateView, LedgerImportView,
    NextStepView, QuestionView,
};
use crate::workflows::eligibility::{
    check_gate, evaluate, notice_timeline, GateReason, GatingResult, RuleId, RuleSet,
    RuleSetLoader, SelectedOutcome,
};
use crate::workflows::intake::{
    self, parse_ledger, AnswerError, LedgerError, QuestionId, QuestionSet, QuestionSetLoader,
};
use crate::workflows::scope::{CaseType, Jurisdiction, Product};
use crate::workflows::source::{DefinitionError, DefinitionSource};

/// Orchestrates the wizard, the decision engine, and the gate for persisted
/// cases. Definitions come from one shared source; loaded sets are cached
/// inside the loaders.
pub struct CaseService<R> {
    repository: Arc<R>,
    question_sets: QuestionSetLoader,
    rule_sets: RuleSetLoader,
}

static CASE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_case_id() -> CaseId {
    let id = CASE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CaseId(format!("case-{id:06}"))
}

impl<R> CaseService<R>
where
    R: CaseRepository + 'static,
{
    pub fn new(repository: Arc<R>, source: Arc<dyn DefinitionSource>) -> Self {
        Self {
            repository,
            question_sets: QuestionSetLoader::new(Arc::clone(&source)),
            rule_sets: RuleSetLoader::new(source),
        }
    }

    /// Opens a case. Fails up front when no questionnaire is published for
    /// the product and jurisdiction.
    pub fn open(
        &self,
        product: Product,
        jurisdiction: Jurisdiction,
        case_type: CaseType,
    ) -> Result<CaseStatusView, CaseServiceError> {
        let set = self.question_sets.load(product, jurisdiction)?;
        let record = CaseRecord::new(next_case_id(), product, jurisdiction, case_type);
        let stored = self.repository.insert(record)?;
        Ok(status_view(&stored, &set))
    }

    pub fn status(&self, case_id: &CaseId) -> Result<CaseStatusView, CaseServiceError> {
        let record = self.fetch(case_id)?;
        let set = self.question_set_for(&record)?;
        Ok(status_view(&record, &set))
    }

    /// The next question to ask, or completion.
    pub fn next_step(&self, case_id: &CaseId) -> Result<NextStepView, CaseServiceError> {
        let record = self.fetch(case_id)?;
        let set = self.question_set_for(&record)?;
        Ok(next_step_view(&record, &set))
    }

    /// Validates and applies one answer, persists the updated case, and
    /// returns the receipt together with where the wizard goes next. When
    /// the answer completes a checkpoint section, the current decision
    /// read-out rides along.
    pub fn answer(
        &self,
        case_id: &CaseId,
        question_id: &QuestionId,
        raw: &serde_json::Value,
    ) -> Result<AnswerOutcomeView, CaseServiceError> {
        let mut record = self.fetch(case_id)?;
        let set = self.question_set_for(&record)?;

        let receipt = intake::apply_answer(&set, &mut record.wizard, question_id, raw)?;

        let guidance = match set.section_of(question_id) {
            Some(section)
                if section.checkpoint && intake::section_complete(section, &record.wizard) =>
            {
                self.interim_guidance(&record)?
            }
            _ => None,
        };

        self.repository.update(record.clone())?;
        Ok(AnswerOutcomeView {
            receipt,
            next: next_step_view(&record, &set),
            guidance,
        })
    }

    /// Full decision read-out for the case's jurisdiction and case type.
    pub fn guidance(&self, case_id: &CaseId) -> Result<DecisionView, CaseServiceError> {
        let record = self.fetch(case_id)?;
        let rule_set = self
            .rule_sets
            .load(record.jurisdiction, record.case_type)?;
        let decision = evaluate(&rule_set, record.wizard.facts());
        Ok(DecisionView::from_decision(&decision))
    }

    /// Commits the landlord to one recommended outcome. Only outcomes the
    /// engine currently recommends can be selected.
    pub fn select_outcome(
        &self,
        case_id: &CaseId,
        rule_id: &RuleId,
    ) -> Result<CaseStatusView, CaseServiceError> {
        let mut record = self.fetch(case_id)?;
        let set = self.question_set_for(&record)?;
        let rule_set = self
            .rule_sets
            .load(record.jurisdiction, record.case_type)?;

        let decision = evaluate(&rule_set, record.wizard.facts());
        let recommended = decision
            .recommended
            .iter()
            .find(|outcome| &outcome.rule_id == rule_id)
            .ok_or_else(|| CaseServiceError::OutcomeNotAvailable(rule_id.clone()))?;

        let route = recommended.outcome.route;
        record.selected_outcome = Some(SelectedOutcome {
            rule_id: rule_id.clone(),
            route,
        });
        record.wizard.select_route(Some(route));
        self.repository.update(record.clone())?;
        Ok(status_view(&record, &set))
    }

    /// Re-runs the gate from scratch. Denial is a normal result carrying
    /// every reason, including definitions being unavailable.
    pub fn check_gate(&self, case_id: &CaseId) -> Result<GateView, CaseServiceError> {
        let record = self.fetch(case_id)?;
        let (result, _) = self.gating(&record);
        Ok(GateView::from_result(&result))
    }

    /// Produces the document-generation bundle, refusing unless the gate
    /// allows at this very moment.
    pub fn export(&self, case_id: &CaseId) -> Result<ExportBundle, CaseServiceError> {
        let record = self.fetch(case_id)?;
        let (result, rule_set) = self.gating(&record);
        if !result.allowed {
            return Err(CaseServiceError::ExportBlocked {
                reasons: result.reasons,
            });
        }
        let (selected, rule_set) = match (&record.selected_outcome, rule_set) {
            (Some(selected), Some(rule_set)) => (selected, rule_set),
            _ => {
                return Err(CaseServiceError::ExportBlocked {
                    reasons: vec![GateReason::NoOutcomeSelected],
                })
            }
        };
        let rule = rule_set
            .rule(&selected.rule_id)
            .ok_or_else(|| CaseServiceError::OutcomeNotAvailable(selected.rule_id.clone()))?;

        Ok(ExportBundle {
            case_id: record.case_id.clone(),
            jurisdiction: record.jurisdiction,
            route: selected.route,
            form_reference: selected.route.form_reference(),
            outcome: rule.outcome.clone(),
            facts: record.wizard.facts().snapshot(),
            timeline: notice_timeline(&rule.outcome, record.wizard.facts()),
        })
    }

    /// Imports a rent ledger export and answers the arrears questions from
    /// it. Only mapped for England questionnaires so far.
    pub fn import_rent_ledger(
        &self,
        case_id: &CaseId,
        csv_text: &str,
    ) -> Result<LedgerImportView, CaseServiceError> {
        let mut record = self.fetch(case_id)?;
        if record.jurisdiction != Jurisdiction::England {
            return Err(CaseServiceError::Ledger(
                LedgerError::UnsupportedJurisdiction(record.jurisdiction.label()),
            ));
        }
        let set = self.question_set_for(&record)?;
        let summary = parse_ledger(Cursor::new(csv_text.as_bytes()))?;

        let mut answers: Vec<(QuestionId, serde_json::Value)> = Vec::new();
        answers.push((
            QuestionId::from("has_arrears"),
            serde_json::Value::Bool(summary.in_arrears()),
        ));
        if summary.in_arrears() {
            answers.push((
                QuestionId::from("arrears_months"),
                serde_json::json!(summary.months_equivalent),
            ));
            answers.push((
                QuestionId::from("arrears_amount"),
                serde_json::json!(summary.arrears_amount),
            ));
        }
        answers.push((
            QuestionId::from("persistent_delay"),
            serde_json::Value::Bool(summary.persistent_lateness),
        ));

        let mut receipts = Vec::with_capacity(answers.len());
        for (question_id, value) in &answers {
            receipts.push(intake::apply_answer(
                &set,
                &mut record.wizard,
                question_id,
                value,
            )?);
        }

        self.repository.update(record.clone())?;
        Ok(LedgerImportView {
            summary,
            receipts,
            next: next_step_view(&record, &set),
        })
    }

    fn fetch(&self, case_id: &CaseId) -> Result<CaseRecord, CaseServiceError> {
        self.repository
            .fetch(case_id)?
            .ok_or_else(|| CaseServiceError::UnknownCase(case_id.clone()))
    }

    fn question_set_for(&self, record: &CaseRecord) -> Result<Arc<QuestionSet>, CaseServiceError> {
        Ok(self
            .question_sets
            .load(record.product, record.jurisdiction)?)
    }

    /// Checkpoint guidance is best effort: a jurisdiction without published
    /// rules simply yields none.
    fn interim_guidance(
        &self,
        record: &CaseRecord,
    ) -> Result<Option<DecisionView>, CaseServiceError> {
        match self.rule_sets.load(record.jurisdiction, record.case_type) {
            Ok(rule_set) => {
                let decision = evaluate(&rule_set, record.wizard.facts());
                Ok(Some(DecisionView::from_decision(&decision)))
            }
            Err(DefinitionError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn gating(&self, record: &CaseRecord) -> (GatingResult, Option<Arc<RuleSet>>) {
        let selected = match &record.selected_outcome {
            Some(selected) => selected,
            None => {
                return (
                    GatingResult::denied_for(GateReason::NoOutcomeSelected),
                    None,
                )
            }
        };
        match self.rule_sets.load(record.jurisdiction, record.case_type) {
            Ok(rule_set) => {
                let result = check_gate(&rule_set, record.wizard.facts(), selected);
                (result, Some(rule_set))
            }
            Err(err) => (
                GatingResult::denied_for(GateReason::RuleSetUnavailable {
                    detail: err.to_string(),
                }),
                None,
            ),
        }
    }
}

fn status_view(record: &CaseRecord, set: &QuestionSet) -> CaseStatusView {
    CaseStatusView {
        case_id: record.case_id.clone(),
        product: record.product,
        product_label: record.product.label(),
        jurisdiction: record.jurisdiction,
        jurisdiction_label: record.jurisdiction.label(),
        case_type: record.case_type,
        progress: intake::progress(set, &record.wizard),
        selected_route: record.selected_outcome.as_ref().map(|s| s.route),
    }
}

fn next_step_view(record: &CaseRecord, set: &QuestionSet) -> NextStepView {
    let question =
        intake::next_question(set, &record.wizard).map(|q| QuestionView::for_question(set, q));
    NextStepView {
        complete: question.is_none(),
        question,
        progress: intake::progress(set, &record.wizard),
    }
}

fn format_reasons(reasons: &[GateReason]) -> String {
    reasons
        .iter()
        .map(|reason| reason.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum CaseServiceError {
    #[error("case '{0}' not found")]
    UnknownCase(CaseId),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("outcome '{0}' is not recommended on the current facts")]
    OutcomeNotAvailable(RuleId),
    #[error("export blocked: {}", format_reasons(.reasons))]
    ExportBlocked { reasons: Vec<GateReason> },
}
