use crate::facts::{Condition, FactPath, FactStore, FactValue, Predicate};
use crate::workflows::eligibility::definition::{
    Advisory, BlockingCheck, GroundClassification, GroundRef, RouteOutcome, RuleDefinition,
    RuleId, RuleSet, SuccessLikelihood,
};
use crate::workflows::scope::{CaseType, Jurisdiction, NoticeRoute};

pub(super) fn path(raw: &str) -> FactPath {
    raw.parse().expect("valid fact path")
}

pub(super) fn facts(pairs: &[(&str, FactValue)]) -> FactStore {
    let mut store = FactStore::new();
    for (raw, value) in pairs {
        store.set(&path(raw), value.clone());
    }
    store
}

pub(super) fn text(value: &str) -> FactValue {
    FactValue::Text(value.to_string())
}

pub(super) fn equals(raw_path: &str, value: FactValue) -> Condition {
    Condition::new(path(raw_path), Predicate::Equals(value))
}

pub(super) fn at_least(raw_path: &str, limit: f64) -> Condition {
    Condition::new(path(raw_path), Predicate::AtLeast(limit))
}

fn outcome(
    route: NoticeRoute,
    grounds: &[(&str, &str)],
    classification: GroundClassification,
    notice_period_days: u16,
    success_likelihood: SuccessLikelihood,
) -> RouteOutcome {
    RouteOutcome {
        route,
        grounds: grounds
            .iter()
            .map(|(code, title)| GroundRef {
                code: (*code).to_string(),
                title: (*title).to_string(),
            })
            .collect(),
        classification,
        notice_period_days,
        success_likelihood,
    }
}

pub(super) fn arrears_rule() -> RuleDefinition {
    RuleDefinition {
        id: RuleId::from("serious_arrears"),
        priority: 10,
        conditions: vec![
            equals("tenancy.type", text("assured_shorthold")),
            at_least("arrears.months", 2.0),
        ],
        outcome: outcome(
            NoticeRoute::SectionEight,
            &[("8", "Serious rent arrears")],
            GroundClassification::Mandatory,
            14,
            SuccessLikelihood::High,
        ),
        required_facts: vec![
            path("tenancy.type"),
            path("arrears.months"),
            path("arrears.amount"),
        ],
    }
}

pub(super) fn no_fault_rule() -> RuleDefinition {
    RuleDefinition {
        id: RuleId::from("no_fault"),
        priority: 20,
        conditions: vec![equals("tenancy.type", text("assured_shorthold"))],
        outcome: outcome(
            NoticeRoute::SectionTwentyOne,
            &[],
            GroundClassification::Mandatory,
            56,
            SuccessLikelihood::High,
        ),
        required_facts: vec![path("tenancy.type"), path("deposit.taken")],
    }
}

pub(super) fn breach_rule() -> RuleDefinition {
    RuleDefinition {
        id: RuleId::from("tenancy_breach"),
        priority: 20,
        conditions: vec![equals("conduct.breachOfTenancy", FactValue::Bool(true))],
        outcome: outcome(
            NoticeRoute::SectionEight,
            &[("12", "Breach of a term of the tenancy")],
            GroundClassification::Discretionary,
            14,
            SuccessLikelihood::Low,
        ),
        required_facts: vec![path("conduct.breachOfTenancy")],
    }
}

pub(super) fn not_assured_check() -> BlockingCheck {
    BlockingCheck {
        id: "tenancy_not_assured".to_string(),
        blocks: None,
        conditions: vec![equals("tenancy.type", text("other"))],
        reason: "The tenancy is outside the Housing Act 1988 regime.".to_string(),
    }
}

pub(super) fn deposit_check() -> BlockingCheck {
    BlockingCheck {
        id: "deposit_unprotected".to_string(),
        blocks: Some(NoticeRoute::SectionTwentyOne),
        conditions: vec![
            equals("deposit.taken", FactValue::Bool(true)),
            equals("deposit.protected", FactValue::Bool(false)),
        ],
        reason: "The deposit is not protected, which invalidates a Section 21 notice.".to_string(),
    }
}

pub(super) fn borderline_advisory() -> Advisory {
    Advisory {
        id: "borderline_arrears".to_string(),
        conditions: vec![
            at_least("arrears.months", 2.0),
            Condition::new(path("arrears.months"), Predicate::AtMost(3.0)),
        ],
        message: "Arrears are close to the mandatory threshold; cite the discretionary grounds \
                  alongside Ground 8."
            .to_string(),
    }
}

pub(super) fn sample_rule_set() -> RuleSet {
    RuleSet {
        jurisdiction: Jurisdiction::England,
        case_type: CaseType::Eviction,
        version: "test.1".to_string(),
        schema_version: 1,
        rules: vec![arrears_rule(), no_fault_rule(), breach_rule()],
        blocking_checks: vec![not_assured_check(), deposit_check()],
        advisories: vec![borderline_advisory()],
    }
}

/// Facts for a clean Section 8 arrears case: assured shorthold, five months
/// behind, deposit taken and protected, no breach.
pub(super) fn arrears_case_facts() -> FactStore {
    facts(&[
        ("tenancy.type", text("assured_shorthold")),
        ("arrears.months", FactValue::Number(5.0)),
        ("arrears.amount", FactValue::Number(4750.0)),
        ("deposit.taken", FactValue::Bool(true)),
        ("deposit.protected", FactValue::Bool(true)),
        ("conduct.breachOfTenancy", FactValue::Bool(false)),
    ])
}
