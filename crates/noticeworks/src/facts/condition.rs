use super::{FactPath, FactStore, FactValue};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A test against a single fact. Conditions never fail loudly: a fact that is
/// absent, or present with an incomparable type, evaluates to
/// [`ConditionStatus::Unknown`] rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub path: FactPath,
    pub test: Predicate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Equals(FactValue),
    NotEquals(FactValue),
    AtLeast(f64),
    AtMost(f64),
    GreaterThan(f64),
    LessThan(f64),
    OneOf(Vec<FactValue>),
    Includes(String),
    OnOrAfter(NaiveDate),
    Before(NaiveDate),
    IsPresent,
    IsAbsent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionStatus {
    Satisfied,
    Failed,
    Unknown,
}

impl Condition {
    pub fn new(path: FactPath, test: Predicate) -> Self {
        Self { path, test }
    }

    pub fn status(&self, facts: &FactStore) -> ConditionStatus {
        match facts.get(&self.path) {
            Some(value) => match self.test.holds_for(value) {
                Some(true) => ConditionStatus::Satisfied,
                Some(false) => ConditionStatus::Failed,
                None => ConditionStatus::Unknown,
            },
            None => match self.test {
                Predicate::IsPresent => ConditionStatus::Failed,
                Predicate::IsAbsent => ConditionStatus::Satisfied,
                _ => ConditionStatus::Unknown,
            },
        }
    }

    pub fn is_satisfied(&self, facts: &FactStore) -> bool {
        self.status(facts) == ConditionStatus::Satisfied
    }
}

impl Predicate {
    /// Applies the test to a present value. `None` means the value's type
    /// does not support the comparison, which callers treat as unknown.
    fn holds_for(&self, value: &FactValue) -> Option<bool> {
        match self {
            Predicate::Equals(expected) => Some(value == expected),
            Predicate::NotEquals(expected) => Some(value != expected),
            Predicate::AtLeast(limit) => value.as_number().map(|n| n >= *limit),
            Predicate::AtMost(limit) => value.as_number().map(|n| n <= *limit),
            Predicate::GreaterThan(limit) => value.as_number().map(|n| n > *limit),
            Predicate::LessThan(limit) => value.as_number().map(|n| n < *limit),
            Predicate::OneOf(allowed) => Some(allowed.contains(value)),
            Predicate::Includes(item) => match value {
                FactValue::List(items) => Some(items.iter().any(|entry| entry == item)),
                _ => None,
            },
            Predicate::OnOrAfter(bound) => value.as_date().map(|date| date >= *bound),
            Predicate::Before(bound) => value.as_date().map(|date| date < *bound),
            Predicate::IsPresent => Some(true),
            Predicate::IsAbsent => Some(false),
        }
    }
}

/// Folds a group of conditions under AND semantics: any failure wins, then
/// any unknown, then satisfied.
pub fn status_of_all<'a, I>(conditions: I, facts: &FactStore) -> ConditionStatus
where
    I: IntoIterator<Item = &'a Condition>,
{
    let mut saw_unknown = false;
    for condition in conditions {
        match condition.status(facts) {
            ConditionStatus::Failed => return ConditionStatus::Failed,
            ConditionStatus::Unknown => saw_unknown = true,
            ConditionStatus::Satisfied => {}
        }
    }
    if saw_unknown {
        ConditionStatus::Unknown
    } else {
        ConditionStatus::Satisfied
    }
}
