use std::sync::Arc;

use serde_json::{json, Value};

use crate::facts::FactPath;
use crate::workflows::intake::definition::{QuestionId, QuestionSet};
use crate::workflows::intake::loader::QuestionSetLoader;
use crate::workflows::intake::wizard::{self, AnswerReceipt, WizardState};
use crate::workflows::scope::{Jurisdiction, Product};
use crate::workflows::source::StaticSource;

pub(super) const ENGLAND_QUESTIONS: &str = "questions/notice_builder/england";

/// A small questionnaire exercising visibility chains, route scoping,
/// checkpoints, and explicit clearing. Fact dependencies:
/// `deposit_taken -> deposit_protected -> scheme_name` and
/// `has_arrears -> arrears_months`; `tenancy_type` clears the planned
/// service date on change.
pub(super) fn sample_document() -> &'static str {
    r#"{
        "product": "notice_builder",
        "jurisdiction": "england",
        "version": "test.1",
        "schema_version": 1,
        "sections": [
            {
                "id": "property",
                "title": "Property and deposit",
                "questions": [
                    {
                        "id": "tenancy_type",
                        "prompt": "What kind of tenancy is in place?",
                        "kind": { "single_choice": { "options": ["assured_shorthold", "assured", "other"] } },
                        "targets": ["tenancy.type"],
                        "also_clears": ["notice.plannedServiceDate"]
                    },
                    {
                        "id": "deposit_taken",
                        "prompt": "Did you take a deposit?",
                        "kind": "boolean",
                        "targets": ["deposit.taken"]
                    },
                    {
                        "id": "deposit_protected",
                        "prompt": "Is the deposit protected?",
                        "kind": "boolean",
                        "targets": ["deposit.protected"],
                        "visible_when": [
                            { "path": "deposit.taken", "test": { "equals": true } }
                        ]
                    },
                    {
                        "id": "scheme_name",
                        "prompt": "Which scheme holds the deposit?",
                        "kind": { "text": { "max_length": 60 } },
                        "targets": ["deposit.scheme"],
                        "visible_when": [
                            { "path": "deposit.protected", "test": { "equals": true } }
                        ]
                    },
                    {
                        "id": "planned_date",
                        "prompt": "When do you plan to serve the notice?",
                        "kind": { "date": {} },
                        "targets": ["notice.plannedServiceDate"]
                    }
                ]
            },
            {
                "id": "arrears",
                "title": "Rent arrears",
                "checkpoint": true,
                "questions": [
                    {
                        "id": "has_arrears",
                        "prompt": "Is the tenant behind on rent?",
                        "kind": "boolean",
                        "targets": ["arrears.hasArrears"]
                    },
                    {
                        "id": "arrears_months",
                        "prompt": "How many months are outstanding?",
                        "kind": { "number": { "min": 0, "max": 120 } },
                        "targets": ["arrears.months"],
                        "visible_when": [
                            { "path": "arrears.hasArrears", "test": { "equals": true } }
                        ]
                    }
                ]
            },
            {
                "id": "service",
                "title": "Serving the notice",
                "questions": [
                    {
                        "id": "hearing_preference",
                        "prompt": "Will you use the accelerated procedure?",
                        "kind": { "single_choice": { "options": ["accelerated_no_hearing", "standard_hearing"] } },
                        "targets": ["notice.hearingPreference"],
                        "route_scope": ["section_twenty_one"]
                    }
                ]
            }
        ]
    }"#
}

pub(super) fn loader_for(document: &str) -> QuestionSetLoader {
    let source = StaticSource::new().with_document(ENGLAND_QUESTIONS, document);
    QuestionSetLoader::new(Arc::new(source))
}

pub(super) fn sample_set() -> Arc<QuestionSet> {
    loader_for(sample_document())
        .load(Product::NoticeBuilder, Jurisdiction::England)
        .expect("sample questionnaire loads")
}

pub(super) fn path(raw: &str) -> FactPath {
    raw.parse().expect("valid fact path")
}

pub(super) fn answer(
    set: &QuestionSet,
    state: &mut WizardState,
    question_id: &str,
    value: Value,
) -> AnswerReceipt {
    wizard::apply_answer(set, state, &QuestionId::from(question_id), &value)
        .unwrap_or_else(|err| panic!("answer to '{question_id}' applies: {err}"))
}

/// Answers every question on the happy path through the sample set: deposit
/// taken and protected, arrears of four months.
pub(super) fn answer_all_applicable(set: &QuestionSet, state: &mut WizardState) {
    answer(set, state, "tenancy_type", json!("assured_shorthold"));
    answer(set, state, "deposit_taken", json!(true));
    answer(set, state, "deposit_protected", json!(true));
    answer(set, state, "scheme_name", json!("TDS Custodial"));
    answer(set, state, "planned_date", json!("2025-11-03"));
    answer(set, state, "has_arrears", json!(true));
    answer(set, state, "arrears_months", json!(4));
}

pub(super) fn violations_of(err: crate::workflows::source::DefinitionError) -> Vec<String> {
    match err {
        crate::workflows::source::DefinitionError::Invalid { violations, .. } => violations,
        other => panic!("expected a validation failure, got: {other}"),
    }
}
