//! Evaluates a rule set against the facts collected so far.
//!
//! Evaluation never errors and never mutates anything: the result is a pure
//! function of the rule set and the fact store, so callers can re-run it
//! after every answer and compare read-outs byte for byte.

use crate::facts::{status_of_all, ConditionStatus, FactPath, FactStore};
use crate::workflows::eligibility::definition::{
    GroundClassification, RouteOutcome, RuleId, RuleSet, SuccessLikelihood,
};
use crate::workflows::scope::NoticeRoute;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedOutcome {
    pub rule_id: RuleId,
    pub priority: i32,
    pub outcome: RouteOutcome,
}

/// A blocking check whose conditions did not fail. `unresolved_facts` lists
/// the facts that could still clear it; when empty the defect is
/// established, not merely possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingIssue {
    pub check_id: String,
    pub blocks: Option<NoticeRoute>,
    pub reason: String,
    pub unresolved_facts: Vec<FactPath>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    /// Matched rules in priority order. The first entry is the primary
    /// recommendation.
    pub recommended: Vec<RecommendedOutcome>,
    pub blocking_issues: Vec<BlockingIssue>,
    /// Facts that would let undetermined rules and checks resolve, in the
    /// order evaluation encountered them.
    pub missing_facts: Vec<FactPath>,
    pub warnings: Vec<String>,
}

impl DecisionResult {
    pub fn primary(&self) -> Option<&RecommendedOutcome> {
        self.recommended.first()
    }

    pub fn recommends(&self, rule_id: &RuleId) -> bool {
        self.recommended
            .iter()
            .any(|outcome| &outcome.rule_id == rule_id)
    }

    pub fn blocks_route(&self, route: NoticeRoute) -> bool {
        self.blocking_issues
            .iter()
            .any(|issue| issue.blocks.is_none() || issue.blocks == Some(route))
    }
}

/// Runs the full decision table. Blocking checks are evaluated fail-closed:
/// a check only stands down when one of its conditions definitely fails.
/// Rules whose conditions cannot yet be determined contribute their missing
/// required facts instead of an outcome.
pub fn evaluate(rule_set: &RuleSet, facts: &FactStore) -> DecisionResult {
    let mut result = DecisionResult::default();
    let mut missing_seen: BTreeSet<FactPath> = BTreeSet::new();

    for check in &rule_set.blocking_checks {
        let mut failed = false;
        let mut unresolved: Vec<FactPath> = Vec::new();
        for condition in &check.conditions {
            match condition.status(facts) {
                ConditionStatus::Failed => {
                    failed = true;
                    break;
                }
                ConditionStatus::Unknown => {
                    if !unresolved.contains(&condition.path) {
                        unresolved.push(condition.path.clone());
                    }
                }
                ConditionStatus::Satisfied => {}
            }
        }
        if failed {
            continue;
        }
        for path in &unresolved {
            if missing_seen.insert(path.clone()) {
                result.missing_facts.push(path.clone());
            }
        }
        result.blocking_issues.push(BlockingIssue {
            check_id: check.id.clone(),
            blocks: check.blocks,
            reason: check.reason.clone(),
            unresolved_facts: unresolved,
        });
    }

    for rule in rule_set.prioritised() {
        match status_of_all(&rule.conditions, facts) {
            ConditionStatus::Failed => {}
            ConditionStatus::Unknown => {
                for path in &rule.required_facts {
                    if !facts.has(path) && missing_seen.insert(path.clone()) {
                        result.missing_facts.push(path.clone());
                    }
                }
            }
            ConditionStatus::Satisfied => {
                if let Some(warning) = weak_route_warning(&rule.outcome) {
                    result.warnings.push(warning);
                }
                result.recommended.push(RecommendedOutcome {
                    rule_id: rule.id.clone(),
                    priority: rule.priority,
                    outcome: rule.outcome.clone(),
                });
            }
        }
    }

    for advisory in &rule_set.advisories {
        if status_of_all(&advisory.conditions, facts) == ConditionStatus::Satisfied {
            result.warnings.push(advisory.message.clone());
        }
    }

    result
}

fn weak_route_warning(outcome: &RouteOutcome) -> Option<String> {
    if outcome.classification == GroundClassification::Discretionary
        && outcome.success_likelihood == SuccessLikelihood::Low
    {
        Some(format!(
            "{} is discretionary with low success likelihood; the court may refuse possession even if the ground is made out",
            outcome.route.label()
        ))
    } else {
        None
    }
}
