//! Loads, validates, and caches rule sets.
//!
//! The gate leans on one invariant established here: every fact a rule's
//! conditions read is also listed in its `required_facts`, so a rule can
//! never match while the gate is unable to see what it matched on.

use crate::workflows::eligibility::definition::{RuleSet, SUPPORTED_SCHEMA_VERSION};
use crate::workflows::scope::{CaseType, Jurisdiction, RuleSetKey};
use crate::workflows::source::{DefinitionError, DefinitionSource};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub struct RuleSetLoader {
    source: Arc<dyn DefinitionSource>,
    cache: Mutex<HashMap<RuleSetKey, Arc<RuleSet>>>,
}

impl RuleSetLoader {
    pub fn new(source: Arc<dyn DefinitionSource>) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn load(
        &self,
        jurisdiction: Jurisdiction,
        case_type: CaseType,
    ) -> Result<Arc<RuleSet>, DefinitionError> {
        let key = RuleSetKey {
            jurisdiction,
            case_type,
        };
        if let Some(cached) = self.cache.lock().expect("rule set cache poisoned").get(&key) {
            return Ok(Arc::clone(cached));
        }

        let identifier = key.identifier();
        let text = self
            .source
            .read(&identifier)
            .map_err(|err| DefinitionError::from_source(&identifier, err))?;
        let rule_set: RuleSet =
            serde_json::from_str(&text).map_err(|err| DefinitionError::Parse {
                identifier: identifier.clone(),
                reason: err.to_string(),
            })?;

        let violations = validate(&rule_set, key);
        if !violations.is_empty() {
            return Err(DefinitionError::Invalid {
                identifier,
                violations,
            });
        }

        let rule_set = Arc::new(rule_set);
        self.cache
            .lock()
            .expect("rule set cache poisoned")
            .insert(key, Arc::clone(&rule_set));
        Ok(rule_set)
    }
}

fn validate(rule_set: &RuleSet, key: RuleSetKey) -> Vec<String> {
    let mut violations = Vec::new();

    if rule_set.jurisdiction != key.jurisdiction || rule_set.case_type != key.case_type {
        violations.push(format!(
            "document declares {}/{} but is published as {}/{}",
            rule_set.jurisdiction.key(),
            rule_set.case_type.key(),
            key.jurisdiction.key(),
            key.case_type.key()
        ));
    }
    if rule_set.schema_version != SUPPORTED_SCHEMA_VERSION {
        violations.push(format!(
            "schema version {} is not supported (expected {})",
            rule_set.schema_version, SUPPORTED_SCHEMA_VERSION
        ));
    }

    let mut rule_ids = HashSet::new();
    for rule in &rule_set.rules {
        if !rule_ids.insert(rule.id.0.as_str()) {
            violations.push(format!("duplicate rule id '{}'", rule.id));
        }
        if rule.conditions.is_empty() {
            violations.push(format!("rule '{}' has no conditions", rule.id));
        }
        for condition in &rule.conditions {
            if !rule.required_facts.contains(&condition.path) {
                violations.push(format!(
                    "rule '{}' reads fact '{}' but does not list it in required_facts",
                    rule.id, condition.path
                ));
            }
        }
    }

    let mut check_ids = HashSet::new();
    for check in &rule_set.blocking_checks {
        if !check_ids.insert(check.id.as_str()) {
            violations.push(format!("duplicate blocking check id '{}'", check.id));
        }
        if check.conditions.is_empty() {
            violations.push(format!(
                "blocking check '{}' has no conditions and would always block",
                check.id
            ));
        }
        if check.reason.trim().is_empty() {
            violations.push(format!("blocking check '{}' has no reason text", check.id));
        }
    }

    let mut advisory_ids = HashSet::new();
    for advisory in &rule_set.advisories {
        if !advisory_ids.insert(advisory.id.as_str()) {
            violations.push(format!("duplicate advisory id '{}'", advisory.id));
        }
        if advisory.conditions.is_empty() {
            violations.push(format!(
                "advisory '{}' has no conditions and would always fire",
                advisory.id
            ));
        }
    }

    violations
}
