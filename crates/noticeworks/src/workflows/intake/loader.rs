//! Loads, validates, and caches question sets.
//!
//! Validation happens once at load time so the wizard can assume a
//! well-formed set: unique identifiers, no two questions writing the same
//! fact, visibility references that resolve to earlier or same-section
//! questions, and no cycles in the dependency graph. Dependents are derived
//! here too, so runtime clearing is a plain graph walk.

use crate::facts::FactPath;
use crate::workflows::intake::definition::{
    QuestionKind, QuestionSet, SUPPORTED_SCHEMA_VERSION,
};
use crate::workflows::scope::{Jurisdiction, Product, QuestionSetKey};
use crate::workflows::source::{DefinitionError, DefinitionSource};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub struct QuestionSetLoader {
    source: Arc<dyn DefinitionSource>,
    cache: Mutex<HashMap<QuestionSetKey, Arc<QuestionSet>>>,
}

impl QuestionSetLoader {
    pub fn new(source: Arc<dyn DefinitionSource>) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Loads the question set for a product and jurisdiction, validating on
    /// first use. Published definitions are immutable, so subsequent loads
    /// return the cached set.
    pub fn load(
        &self,
        product: Product,
        jurisdiction: Jurisdiction,
    ) -> Result<Arc<QuestionSet>, DefinitionError> {
        let key = QuestionSetKey {
            product,
            jurisdiction,
        };
        if let Some(cached) = self
            .cache
            .lock()
            .expect("question set cache poisoned")
            .get(&key)
        {
            return Ok(Arc::clone(cached));
        }

        let identifier = key.identifier();
        let text = self
            .source
            .read(&identifier)
            .map_err(|err| DefinitionError::from_source(&identifier, err))?;
        let mut set: QuestionSet =
            serde_json::from_str(&text).map_err(|err| DefinitionError::Parse {
                identifier: identifier.clone(),
                reason: err.to_string(),
            })?;

        let violations = validate(&set, key);
        if !violations.is_empty() {
            return Err(DefinitionError::Invalid {
                identifier,
                violations,
            });
        }
        resolve_dependents(&mut set);

        let set = Arc::new(set);
        self.cache
            .lock()
            .expect("question set cache poisoned")
            .insert(key, Arc::clone(&set));
        Ok(set)
    }
}

fn validate(set: &QuestionSet, key: QuestionSetKey) -> Vec<String> {
    let mut violations = Vec::new();

    if set.product != key.product || set.jurisdiction != key.jurisdiction {
        violations.push(format!(
            "document declares {}/{} but is published as {}/{}",
            set.product.key(),
            set.jurisdiction.key(),
            key.product.key(),
            key.jurisdiction.key()
        ));
    }
    if set.schema_version != SUPPORTED_SCHEMA_VERSION {
        violations.push(format!(
            "schema version {} is not supported (expected {})",
            set.schema_version, SUPPORTED_SCHEMA_VERSION
        ));
    }

    let mut section_ids = HashSet::new();
    for section in &set.sections {
        if !section_ids.insert(section.id.as_str()) {
            violations.push(format!("duplicate section id '{}'", section.id));
        }
    }

    let mut question_ids = HashSet::new();
    let mut producers: HashMap<&FactPath, &str> = HashMap::new();
    for question in set.questions() {
        if !question_ids.insert(question.id.0.as_str()) {
            violations.push(format!("duplicate question id '{}'", question.id));
        }
        if question.targets.is_empty() {
            violations.push(format!("question '{}' writes no facts", question.id));
        }
        for target in &question.targets {
            if let Some(previous) = producers.insert(target, question.id.0.as_str()) {
                violations.push(format!(
                    "fact '{target}' is written by both '{previous}' and '{}'",
                    question.id
                ));
            }
        }
        validate_kind(question.id.0.as_str(), &question.kind, &mut violations);
    }

    validate_references(set, &mut violations);
    validate_acyclic(set, &mut violations);

    violations
}

fn validate_kind(question_id: &str, kind: &QuestionKind, violations: &mut Vec<String>) {
    match kind {
        QuestionKind::Number {
            min: Some(min),
            max: Some(max),
        } if min > max => {
            violations.push(format!(
                "question '{question_id}' has minimum {min} above maximum {max}"
            ));
        }
        QuestionKind::Date {
            earliest: Some(earliest),
            latest: Some(latest),
        } if earliest > latest => {
            violations.push(format!(
                "question '{question_id}' has earliest date {earliest} after latest {latest}"
            ));
        }
        QuestionKind::SingleChoice { options } | QuestionKind::MultiChoice { options } => {
            if options.is_empty() {
                violations.push(format!("question '{question_id}' has no options"));
            }
            let mut seen = HashSet::new();
            for option in options {
                if !seen.insert(option.as_str()) {
                    violations.push(format!(
                        "question '{question_id}' lists option '{option}' twice"
                    ));
                }
            }
        }
        _ => {}
    }
}

/// Every visibility condition must read a fact that some question produces,
/// and that producer must sit earlier in the set or in the same section.
fn validate_references(set: &QuestionSet, violations: &mut Vec<String>) {
    let mut position: HashMap<&FactPath, (usize, usize)> = HashMap::new();
    let mut flat_index = 0usize;
    for (section_index, section) in set.sections.iter().enumerate() {
        for question in &section.questions {
            for target in &question.targets {
                position.entry(target).or_insert((section_index, flat_index));
            }
            flat_index += 1;
        }
    }

    let mut reader_index = 0usize;
    for (section_index, section) in set.sections.iter().enumerate() {
        for question in &section.questions {
            for condition in &question.visible_when {
                match position.get(&condition.path) {
                    None => violations.push(format!(
                        "question '{}' is visible on fact '{}' which no question produces",
                        question.id, condition.path
                    )),
                    Some((producer_section, producer_index)) => {
                        let earlier = *producer_index < reader_index;
                        let same_section = *producer_section == section_index;
                        if !earlier && !same_section {
                            violations.push(format!(
                                "question '{}' is visible on fact '{}' produced later in a different section",
                                question.id, condition.path
                            ));
                        }
                    }
                }
            }
            reader_index += 1;
        }
    }
}

/// Rejects cycles in the question dependency graph (edges run from a
/// producer to each question whose visibility reads one of its targets).
fn validate_acyclic(set: &QuestionSet, violations: &mut Vec<String>) {
    let questions: Vec<_> = set.questions().collect();
    let index_of: HashMap<&str, usize> = questions
        .iter()
        .enumerate()
        .map(|(index, question)| (question.id.0.as_str(), index))
        .collect();

    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); questions.len()];
    for (producer_index, producer) in questions.iter().enumerate() {
        for target in &producer.targets {
            for reader in questions.iter() {
                if reader.watches_path(target) {
                    if let Some(&reader_index) = index_of.get(reader.id.0.as_str()) {
                        edges[producer_index].push(reader_index);
                    }
                }
            }
        }
    }

    const UNSEEN: u8 = 0;
    const ACTIVE: u8 = 1;
    const DONE: u8 = 2;
    let mut marks = vec![UNSEEN; questions.len()];

    fn walk(node: usize, edges: &[Vec<usize>], marks: &mut [u8]) -> bool {
        if marks[node] == ACTIVE {
            return true;
        }
        if marks[node] == DONE {
            return false;
        }
        marks[node] = ACTIVE;
        for &next in &edges[node] {
            if walk(next, edges, marks) {
                return true;
            }
        }
        marks[node] = DONE;
        false
    }

    for start in 0..questions.len() {
        if marks[start] == UNSEEN && walk(start, &edges, &mut marks) {
            violations.push(format!(
                "dependency cycle involving question '{}'",
                questions[start].id
            ));
            return;
        }
    }
}

/// Fills in `dependents` for every question: its `also_clears` paths plus
/// the targets of every question whose visibility reads one of its targets.
/// A question's own targets never appear in its dependents.
fn resolve_dependents(set: &mut QuestionSet) {
    let questions: Vec<_> = set.questions().cloned().collect();
    let mut resolved: Vec<Vec<FactPath>> = Vec::with_capacity(questions.len());

    for producer in &questions {
        let mut dependents: Vec<FactPath> = Vec::new();
        let push_unique = |dependents: &mut Vec<FactPath>, path: &FactPath| {
            if !producer.targets.contains(path) && !dependents.contains(path) {
                dependents.push(path.clone());
            }
        };
        for path in &producer.also_clears {
            push_unique(&mut dependents, path);
        }
        for reader in &questions {
            if reader.id == producer.id {
                continue;
            }
            let watches = producer
                .targets
                .iter()
                .any(|target| reader.watches_path(target));
            if watches {
                for path in &reader.targets {
                    push_unique(&mut dependents, path);
                }
            }
        }
        resolved.push(dependents);
    }

    let mut iter = resolved.into_iter();
    for section in &mut set.sections {
        for question in &mut section.questions {
            if let Some(dependents) = iter.next() {
                question.dependents = dependents;
            }
        }
    }
}
