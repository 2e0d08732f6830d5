//! Schema-light storage for everything a case knows about the world.
//!
//! Facts are addressed by dotted [`FactPath`]s and stored as a nested tree so
//! that snapshots serialise to plain nested JSON objects. The store itself
//! enforces nothing about which paths exist; question sets and rule sets give
//! the paths their meaning.

mod condition;
mod path;

pub use condition::{status_of_all, Condition, ConditionStatus, Predicate};
pub use path::{FactPath, PathError};

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single stored fact. Dates are held as canonical `YYYY-MM-DD` text;
/// question validation canonicalises them before they reach the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FactValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FactValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FactValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FactValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        self.as_text()
            .and_then(|text| NaiveDate::parse_from_str(text, DATE_FORMAT).ok())
    }

    /// Whether the value carries usable content. Blank text and empty lists
    /// do not; booleans and numbers always do.
    pub fn is_substantive(&self) -> bool {
        match self {
            FactValue::Bool(_) | FactValue::Number(_) => true,
            FactValue::Text(text) => !text.trim().is_empty(),
            FactValue::List(items) => !items.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FactNode {
    Leaf(FactValue),
    Branch(BTreeMap<String, FactNode>),
}

/// Nested key-value store for case facts.
///
/// `set` is total: writing through an existing leaf replaces it with a
/// branch, and writing over a branch collapses it to a leaf. `get` and `has`
/// only ever see leaves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactStore {
    root: BTreeMap<String, FactNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("fact snapshot must be a JSON object")]
    NotAnObject,
    #[error("fact snapshot has unsupported value at '{path}': {found}")]
    UnsupportedValue { path: String, found: &'static str },
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn get(&self, path: &FactPath) -> Option<&FactValue> {
        let mut current = &self.root;
        let mut segments = path.segments().peekable();
        while let Some(segment) = segments.next() {
            let node = current.get(segment)?;
            match (node, segments.peek()) {
                (FactNode::Leaf(value), None) => return Some(value),
                (FactNode::Branch(children), Some(_)) => current = children,
                _ => return None,
            }
        }
        None
    }

    pub fn has(&self, path: &FactPath) -> bool {
        self.get(path).is_some()
    }

    pub fn set(&mut self, path: &FactPath, value: FactValue) {
        let segments: Vec<&str> = path.segments().collect();
        Self::set_at(&mut self.root, &segments, value);
    }

    fn set_at(current: &mut BTreeMap<String, FactNode>, segments: &[&str], value: FactValue) {
        let (head, rest) = match segments.split_first() {
            Some(parts) => parts,
            None => return,
        };
        if rest.is_empty() {
            current.insert((*head).to_string(), FactNode::Leaf(value));
            return;
        }
        let entry = current
            .entry((*head).to_string())
            .or_insert_with(|| FactNode::Branch(BTreeMap::new()));
        if let FactNode::Leaf(_) = entry {
            *entry = FactNode::Branch(BTreeMap::new());
        }
        if let FactNode::Branch(children) = entry {
            Self::set_at(children, rest, value);
        }
    }

    /// Removes the node at `path` (leaf or whole subtree) and prunes any
    /// branches left empty. Returns whether anything was removed.
    pub fn unset(&mut self, path: &FactPath) -> bool {
        let segments: Vec<&str> = path.segments().collect();
        Self::remove_at(&mut self.root, &segments)
    }

    fn remove_at(current: &mut BTreeMap<String, FactNode>, segments: &[&str]) -> bool {
        let (head, rest) = match segments.split_first() {
            Some(parts) => parts,
            None => return false,
        };
        if rest.is_empty() {
            return current.remove(*head).is_some();
        }
        let removed = match current.get_mut(*head) {
            Some(FactNode::Branch(children)) => Self::remove_at(children, rest),
            _ => false,
        };
        if removed {
            if let Some(FactNode::Branch(children)) = current.get(*head) {
                if children.is_empty() {
                    current.remove(*head);
                }
            }
        }
        removed
    }

    /// Serialises the store to a nested JSON object. Keys come out in sorted
    /// order, so equal stores produce byte-identical snapshots.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Object(Self::branch_to_json(&self.root))
    }

    fn branch_to_json(branch: &BTreeMap<String, FactNode>) -> serde_json::Map<String, serde_json::Value> {
        let mut object = serde_json::Map::new();
        for (key, node) in branch {
            let value = match node {
                FactNode::Leaf(value) => {
                    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
                }
                FactNode::Branch(children) => {
                    serde_json::Value::Object(Self::branch_to_json(children))
                }
            };
            object.insert(key.clone(), value);
        }
        object
    }

    /// Rebuilds a store from a snapshot produced by [`FactStore::snapshot`].
    /// Rejects nulls, non-string list items, and non-object roots.
    pub fn restore(snapshot: &serde_json::Value) -> Result<Self, SnapshotError> {
        let object = snapshot.as_object().ok_or(SnapshotError::NotAnObject)?;
        let mut root = BTreeMap::new();
        for (key, value) in object {
            root.insert(key.clone(), Self::node_from_json(key, value)?);
        }
        Ok(Self { root })
    }

    fn node_from_json(path: &str, value: &serde_json::Value) -> Result<FactNode, SnapshotError> {
        match value {
            serde_json::Value::Bool(flag) => Ok(FactNode::Leaf(FactValue::Bool(*flag))),
            serde_json::Value::Number(number) => number
                .as_f64()
                .map(|n| FactNode::Leaf(FactValue::Number(n)))
                .ok_or(SnapshotError::UnsupportedValue {
                    path: path.to_string(),
                    found: "non-finite number",
                }),
            serde_json::Value::String(text) => Ok(FactNode::Leaf(FactValue::Text(text.clone()))),
            serde_json::Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(text) => list.push(text.to_string()),
                        None => {
                            return Err(SnapshotError::UnsupportedValue {
                                path: path.to_string(),
                                found: "non-string list item",
                            })
                        }
                    }
                }
                Ok(FactNode::Leaf(FactValue::List(list)))
            }
            serde_json::Value::Object(children) => {
                let mut branch = BTreeMap::new();
                for (key, child) in children {
                    let child_path = format!("{path}.{key}");
                    branch.insert(key.clone(), Self::node_from_json(&child_path, child)?);
                }
                Ok(FactNode::Branch(branch))
            }
            serde_json::Value::Null => Err(SnapshotError::UnsupportedValue {
                path: path.to_string(),
                found: "null",
            }),
        }
    }
}

impl Serialize for FactStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FactStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::restore(&value).map_err(D::Error::custom)
    }
}
