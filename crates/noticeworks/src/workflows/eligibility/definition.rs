use crate::facts::{Condition, FactPath};
use crate::workflows::scope::{CaseType, Jurisdiction, NoticeRoute, RuleSetKey};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleId(pub String);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Whether a ground obliges the court to order possession once made out, or
/// leaves it to the judge's discretion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundClassification {
    Mandatory,
    Discretionary,
}

impl GroundClassification {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mandatory => "Mandatory",
            Self::Discretionary => "Discretionary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessLikelihood {
    High,
    Medium,
    Low,
}

impl SuccessLikelihood {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// A statutory ground cited on the notice, such as Ground 8 of Schedule 2 to
/// the Housing Act 1988.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundRef {
    pub code: String,
    pub title: String,
}

/// What a matched rule recommends: the route, the grounds to cite, and the
/// practical parameters a landlord weighs when choosing between routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOutcome {
    pub route: NoticeRoute,
    #[serde(default)]
    pub grounds: Vec<GroundRef>,
    pub classification: GroundClassification,
    pub notice_period_days: u16,
    pub success_likelihood: SuccessLikelihood,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: RuleId,
    /// Lower sorts first. Ties keep declaration order.
    pub priority: i32,
    pub conditions: Vec<Condition>,
    pub outcome: RouteOutcome,
    /// Facts that must be present with substantive values before the gate
    /// lets this outcome through. Always a superset of the condition paths.
    #[serde(default)]
    pub required_facts: Vec<FactPath>,
}

/// A veto. When its conditions hold, the named route (or every route when
/// `blocks` is empty) must not be served until the underlying defect is
/// fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingCheck {
    pub id: String,
    #[serde(default)]
    pub blocks: Option<NoticeRoute>,
    pub conditions: Vec<Condition>,
    pub reason: String,
}

impl BlockingCheck {
    pub fn applies_to(&self, route: NoticeRoute) -> bool {
        match self.blocks {
            Some(blocked) => blocked == route,
            None => true,
        }
    }
}

/// Advice that accompanies a recommendation without affecting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub id: String,
    pub conditions: Vec<Condition>,
    pub message: String,
}

/// A validated decision table for one jurisdiction and case type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub jurisdiction: Jurisdiction,
    pub case_type: CaseType,
    pub version: String,
    pub schema_version: u32,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    #[serde(default)]
    pub blocking_checks: Vec<BlockingCheck>,
    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

impl RuleSet {
    pub fn key(&self) -> RuleSetKey {
        RuleSetKey {
            jurisdiction: self.jurisdiction,
            case_type: self.case_type,
        }
    }

    pub fn rule(&self, id: &RuleId) -> Option<&RuleDefinition> {
        self.rules.iter().find(|rule| &rule.id == id)
    }

    /// Rules in evaluation order: ascending priority, declaration order for
    /// ties.
    pub fn prioritised(&self) -> Vec<&RuleDefinition> {
        let mut ordered: Vec<&RuleDefinition> = self.rules.iter().collect();
        ordered.sort_by_key(|rule| rule.priority);
        ordered
    }
}
