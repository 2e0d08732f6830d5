//! Drives a question set one answer at a time.
//!
//! The functions here are pure over `(&QuestionSet, &WizardState)`: the same
//! inputs always produce the same next question, receipts, and progress.
//! Facts only change through [`apply_answer`], which also clears every fact
//! invalidated by the change before returning.

use crate::facts::{FactPath, FactStore};
use crate::workflows::intake::answers::{validate_answer, AnswerError};
use crate::workflows::intake::definition::{
    QuestionDefinition, QuestionId, QuestionSection, QuestionSet,
};
use crate::workflows::scope::NoticeRoute;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Everything the wizard knows about one case in flight. Facts and the
/// answered set are only mutated through [`apply_answer`] and
/// [`WizardState::select_route`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    facts: FactStore,
    answered: BTreeSet<QuestionId>,
    selected_route: Option<NoticeRoute>,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    pub fn selected_route(&self) -> Option<NoticeRoute> {
        self.selected_route
    }

    /// Records the route chosen for the case, opening up any questions
    /// scoped to it. Clearing the route hides them again; their facts are
    /// kept.
    pub fn select_route(&mut self, route: Option<NoticeRoute>) {
        self.selected_route = route;
    }

    pub fn is_answered(&self, id: &QuestionId) -> bool {
        self.answered.contains(id)
    }

    pub fn answered_count(&self) -> usize {
        self.answered.len()
    }
}

/// Result of applying one answer: the paths written and every dependent path
/// cleared as a consequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerReceipt {
    pub question_id: QuestionId,
    pub updated_paths: Vec<FactPath>,
    pub cleared_paths: Vec<FactPath>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardProgress {
    pub answered: usize,
    pub applicable: usize,
    /// Whole-percent completion, floored; only reaches 100 when every
    /// applicable question is answered.
    pub percent: u8,
}

fn applicable(question: &QuestionDefinition, state: &WizardState) -> bool {
    question.in_scope(state.selected_route) && question.is_visible(&state.facts)
}

/// The first applicable unanswered question in declaration order, or `None`
/// when the wizard is complete for the current facts and route.
pub fn next_question<'a>(set: &'a QuestionSet, state: &WizardState) -> Option<&'a QuestionDefinition> {
    set.questions()
        .find(|question| !state.is_answered(&question.id) && applicable(question, state))
}

pub fn is_complete(set: &QuestionSet, state: &WizardState) -> bool {
    next_question(set, state).is_none()
}

/// Validates and applies one answer.
///
/// When the stored value actually changes, every dependent fact is cleared
/// transitively: facts whose questions watch the changed paths, those
/// questions' own dependents, and so on to a fixed point. Questions whose
/// facts were cleared drop back to unanswered.
pub fn apply_answer(
    set: &QuestionSet,
    state: &mut WizardState,
    question_id: &QuestionId,
    raw: &serde_json::Value,
) -> Result<AnswerReceipt, AnswerError> {
    let question = set
        .question(question_id)
        .ok_or_else(|| AnswerError::UnknownQuestion(question_id.to_string()))?;
    if !applicable(question, state) {
        return Err(AnswerError::NotApplicable(question_id.to_string()));
    }

    let value = validate_answer(&question.kind, raw)?;

    let mut changed = false;
    let mut updated_paths = Vec::with_capacity(question.targets.len());
    for target in &question.targets {
        if state.facts.get(target) != Some(&value) {
            changed = true;
        }
        state.facts.set(target, value.clone());
        updated_paths.push(target.clone());
    }

    let mut cleared_paths = Vec::new();
    if changed {
        clear_dependents(set, state, question, &mut cleared_paths);
    }
    state.answered.insert(question.id.clone());

    Ok(AnswerReceipt {
        question_id: question.id.clone(),
        updated_paths,
        cleared_paths,
    })
}

/// Clears the transitive closure of dependents starting from a changed
/// question. The visited set guarantees termination; each producer whose
/// fact is invalidated becomes unanswered and contributes its own
/// dependents to the frontier.
fn clear_dependents(
    set: &QuestionSet,
    state: &mut WizardState,
    changed: &QuestionDefinition,
    cleared: &mut Vec<FactPath>,
) {
    let mut visited: BTreeSet<FactPath> = BTreeSet::new();
    let mut frontier: VecDeque<FactPath> = changed.dependents.iter().cloned().collect();

    while let Some(path) = frontier.pop_front() {
        if !visited.insert(path.clone()) {
            continue;
        }
        if state.facts.unset(&path) {
            cleared.push(path.clone());
        }
        if let Some(producer) = set.producer_of(&path) {
            state.answered.remove(&producer.id);
            for next in &producer.dependents {
                frontier.push_back(next.clone());
            }
        }
    }
}

/// Progress across currently applicable questions. A set with nothing
/// applicable reports 100 percent.
pub fn progress(set: &QuestionSet, state: &WizardState) -> WizardProgress {
    let mut applicable_count = 0;
    let mut answered_count = 0;
    for question in set.questions() {
        if applicable(question, state) {
            applicable_count += 1;
            if state.is_answered(&question.id) {
                answered_count += 1;
            }
        }
    }
    let percent = if applicable_count == 0 {
        100
    } else {
        ((answered_count * 100) / applicable_count) as u8
    };
    WizardProgress {
        answered: answered_count,
        applicable: applicable_count,
        percent,
    }
}

/// Whether every applicable question in `section` has been answered.
pub fn section_complete(section: &QuestionSection, state: &WizardState) -> bool {
    section
        .questions
        .iter()
        .filter(|question| applicable(question, state))
        .all(|question| state.is_answered(&question.id))
}
