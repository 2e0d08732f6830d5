use super::common::*;

use crate::facts::FactValue;
use crate::workflows::eligibility::definition::RuleId;
use crate::workflows::eligibility::gate::{check_gate, GateReason, SelectedOutcome};
use crate::workflows::scope::NoticeRoute;

fn select(rule_id: &str, route: NoticeRoute) -> SelectedOutcome {
    SelectedOutcome {
        rule_id: RuleId::from(rule_id),
        route,
    }
}

#[test]
fn allows_when_selection_still_holds() {
    let rule_set = sample_rule_set();
    let result = check_gate(
        &rule_set,
        &arrears_case_facts(),
        &select("serious_arrears", NoticeRoute::SectionEight),
    );

    assert!(result.allowed);
    assert!(result.reasons.is_empty());
}

#[test]
fn missing_required_fact_denies() {
    let rule_set = sample_rule_set();
    let mut store = arrears_case_facts();
    store.unset(&path("arrears.amount"));

    let result = check_gate(
        &rule_set,
        &store,
        &select("serious_arrears", NoticeRoute::SectionEight),
    );

    assert!(!result.allowed);
    assert_eq!(
        result.reasons,
        vec![GateReason::MissingRequiredFact {
            path: path("arrears.amount")
        }]
    );
}

#[test]
fn blank_required_fact_denies() {
    let rule_set = sample_rule_set();
    let mut store = arrears_case_facts();
    store.set(&path("arrears.amount"), text("  "));

    let result = check_gate(
        &rule_set,
        &store,
        &select("serious_arrears", NoticeRoute::SectionEight),
    );

    assert!(!result.allowed);
    assert_eq!(
        result.reasons,
        vec![GateReason::EmptyRequiredFact {
            path: path("arrears.amount")
        }]
    );
}

#[test]
fn unknown_rule_denies() {
    let rule_set = sample_rule_set();
    let result = check_gate(
        &rule_set,
        &arrears_case_facts(),
        &select("retired_rule", NoticeRoute::SectionEight),
    );

    assert!(!result.allowed);
    assert!(matches!(
        result.reasons.as_slice(),
        [GateReason::UnknownRule { .. }]
    ));
}

#[test]
fn selection_that_no_longer_matches_denies() {
    let rule_set = sample_rule_set();
    let mut store = arrears_case_facts();
    // The tenant paid down below the threshold since selection.
    store.set(&path("arrears.months"), FactValue::Number(1.0));

    let result = check_gate(
        &rule_set,
        &store,
        &select("serious_arrears", NoticeRoute::SectionEight),
    );

    assert!(!result.allowed);
    assert_eq!(
        result.reasons,
        vec![GateReason::OutcomeNotRecommended {
            rule_id: RuleId::from("serious_arrears"),
            route: NoticeRoute::SectionEight,
        }]
    );
}

#[test]
fn route_differing_from_the_rules_outcome_denies() {
    let rule_set = sample_rule_set();
    let result = check_gate(
        &rule_set,
        &arrears_case_facts(),
        &select("serious_arrears", NoticeRoute::SectionTwentyOne),
    );

    assert!(!result.allowed);
    assert!(matches!(
        result.reasons.as_slice(),
        [GateReason::OutcomeNotRecommended { .. }]
    ));
}

#[test]
fn established_block_on_the_selected_route_denies() {
    let rule_set = sample_rule_set();
    let mut store = arrears_case_facts();
    store.set(&path("deposit.protected"), FactValue::Bool(false));

    let result = check_gate(
        &rule_set,
        &store,
        &select("no_fault", NoticeRoute::SectionTwentyOne),
    );

    assert!(!result.allowed);
    assert!(matches!(
        result.reasons.as_slice(),
        [GateReason::RouteBlocked { check_id, .. }] if check_id == "deposit_unprotected"
    ));
}

#[test]
fn block_on_an_unrelated_route_does_not_deny() {
    let rule_set = sample_rule_set();
    let mut store = arrears_case_facts();
    store.set(&path("deposit.protected"), FactValue::Bool(false));

    // Section 8 is unaffected by the deposit defect.
    let result = check_gate(
        &rule_set,
        &store,
        &select("serious_arrears", NoticeRoute::SectionEight),
    );

    assert!(result.allowed);
}

#[test]
fn unknown_defects_count_against_the_landlord() {
    let rule_set = sample_rule_set();
    let mut store = arrears_case_facts();
    // With the deposit questions unanswered the check cannot stand down,
    // and the required fact is missing: two reasons, both reported.
    store.unset(&path("deposit.taken"));
    store.unset(&path("deposit.protected"));

    let result = check_gate(
        &rule_set,
        &store,
        &select("no_fault", NoticeRoute::SectionTwentyOne),
    );

    assert!(!result.allowed);
    assert_eq!(result.reasons.len(), 2);
    assert!(result
        .reasons
        .iter()
        .any(|reason| matches!(reason, GateReason::RouteBlocked { .. })));
    assert!(result.reasons.iter().any(|reason| matches!(
        reason,
        GateReason::MissingRequiredFact { path } if path == &self::path("deposit.taken")
    )));
}

#[test]
fn global_blocks_deny_any_selection() {
    let rule_set = sample_rule_set();
    let mut store = arrears_case_facts();
    store.set(&path("tenancy.type"), text("other"));

    let result = check_gate(
        &rule_set,
        &store,
        &select("serious_arrears", NoticeRoute::SectionEight),
    );

    assert!(!result.allowed);
    // The rule no longer matches and the whole regime is blocked.
    assert!(result
        .reasons
        .iter()
        .any(|reason| matches!(reason, GateReason::OutcomeNotRecommended { .. })));
    assert!(result.reasons.iter().any(|reason| matches!(
        reason,
        GateReason::RouteBlocked { check_id, .. } if check_id == "tenancy_not_assured"
    )));
}

#[test]
fn repeated_checks_agree() {
    let rule_set = sample_rule_set();
    let store = arrears_case_facts();
    let selected = select("serious_arrears", NoticeRoute::SectionEight);

    assert_eq!(
        check_gate(&rule_set, &store, &selected),
        check_gate(&rule_set, &store, &selected)
    );
}
