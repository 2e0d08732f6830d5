//! Final fail-closed check before anything irreversible happens to a case.
//!
//! The gate re-evaluates the decision table from scratch on every call. A
//! denial is an ordinary result, not an error: every reason is reported so
//! the caller can show the landlord the full list of defects at once.

use crate::facts::{FactPath, FactStore};
use crate::workflows::eligibility::definition::{RuleId, RuleSet};
use crate::workflows::eligibility::engine;
use crate::workflows::scope::NoticeRoute;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The outcome a landlord has committed to, recorded when they accept a
/// recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOutcome {
    pub rule_id: RuleId,
    pub route: NoticeRoute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GateReason {
    NoOutcomeSelected,
    RuleSetUnavailable { detail: String },
    UnknownRule { rule_id: RuleId },
    OutcomeNotRecommended { rule_id: RuleId, route: NoticeRoute },
    RouteBlocked { check_id: String, reason: String },
    MissingRequiredFact { path: FactPath },
    EmptyRequiredFact { path: FactPath },
}

impl fmt::Display for GateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateReason::NoOutcomeSelected => {
                write!(f, "no outcome has been selected for this case")
            }
            GateReason::RuleSetUnavailable { detail } => {
                write!(f, "eligibility rules are unavailable: {detail}")
            }
            GateReason::UnknownRule { rule_id } => {
                write!(f, "selected outcome refers to unknown rule '{rule_id}'")
            }
            GateReason::OutcomeNotRecommended { rule_id, route } => write!(
                f,
                "rule '{rule_id}' no longer recommends {} on the current facts",
                route.label()
            ),
            GateReason::RouteBlocked { check_id, reason } => {
                write!(f, "blocked by check '{check_id}': {reason}")
            }
            GateReason::MissingRequiredFact { path } => {
                write!(f, "required fact '{path}' has not been provided")
            }
            GateReason::EmptyRequiredFact { path } => {
                write!(f, "required fact '{path}' is present but empty")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatingResult {
    pub allowed: bool,
    pub reasons: Vec<GateReason>,
}

impl GatingResult {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reasons: Vec::new(),
        }
    }

    pub fn denied(reasons: Vec<GateReason>) -> Self {
        Self {
            allowed: false,
            reasons,
        }
    }

    pub fn denied_for(reason: GateReason) -> Self {
        Self::denied(vec![reason])
    }
}

/// Re-checks a selected outcome against the current facts.
///
/// Allows only when the selected rule still matches, no blocking issue
/// touches its route, and every required fact is present with a substantive
/// value. Anything unknown counts against the landlord, never for them.
pub fn check_gate(
    rule_set: &RuleSet,
    facts: &FactStore,
    selected: &SelectedOutcome,
) -> GatingResult {
    let rule = match rule_set.rule(&selected.rule_id) {
        Some(rule) => rule,
        None => {
            return GatingResult::denied_for(GateReason::UnknownRule {
                rule_id: selected.rule_id.clone(),
            })
        }
    };

    let mut reasons = Vec::new();

    let decision = engine::evaluate(rule_set, facts);
    if rule.outcome.route != selected.route || !decision.recommends(&selected.rule_id) {
        reasons.push(GateReason::OutcomeNotRecommended {
            rule_id: selected.rule_id.clone(),
            route: selected.route,
        });
    }

    for issue in &decision.blocking_issues {
        if issue.blocks.is_none() || issue.blocks == Some(selected.route) {
            reasons.push(GateReason::RouteBlocked {
                check_id: issue.check_id.clone(),
                reason: issue.reason.clone(),
            });
        }
    }

    for path in &rule.required_facts {
        match facts.get(path) {
            None => reasons.push(GateReason::MissingRequiredFact { path: path.clone() }),
            Some(value) if !value.is_substantive() => {
                reasons.push(GateReason::EmptyRequiredFact { path: path.clone() })
            }
            Some(_) => {}
        }
    }

    if reasons.is_empty() {
        GatingResult::allowed()
    } else {
        GatingResult::denied(reasons)
    }
}
