use crate::facts::{Condition, FactPath, FactStore};
use crate::workflows::scope::{Jurisdiction, NoticeRoute, Product, QuestionSetKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// What shape of answer a question accepts, with per-kind constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Boolean,
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Text {
        #[serde(default)]
        max_length: Option<usize>,
    },
    Date {
        #[serde(default)]
        earliest: Option<NaiveDate>,
        #[serde(default)]
        latest: Option<NaiveDate>,
    },
    SingleChoice {
        options: Vec<String>,
    },
    MultiChoice {
        options: Vec<String>,
    },
}

impl QuestionKind {
    pub const fn label(&self) -> &'static str {
        match self {
            QuestionKind::Boolean => "yes/no",
            QuestionKind::Number { .. } => "number",
            QuestionKind::Text { .. } => "text",
            QuestionKind::Date { .. } => "date",
            QuestionKind::SingleChoice { .. } => "single choice",
            QuestionKind::MultiChoice { .. } => "multiple choice",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub id: QuestionId,
    pub prompt: String,
    pub kind: QuestionKind,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Fact paths this question writes. Every target receives the same
    /// validated value.
    pub targets: Vec<FactPath>,
    /// The question is asked only while every condition is satisfied.
    #[serde(default)]
    pub visible_when: Vec<Condition>,
    /// When non-empty, the question is asked only after a route in this list
    /// has been selected for the case.
    #[serde(default)]
    pub route_scope: Vec<NoticeRoute>,
    /// Extra paths to clear whenever this answer changes, on top of the
    /// dependents derived from visibility conditions.
    #[serde(default)]
    pub also_clears: Vec<FactPath>,
    /// Paths invalidated by a change to this answer. Derived by the loader;
    /// never read from the document itself.
    #[serde(skip)]
    pub dependents: Vec<FactPath>,
}

fn default_required() -> bool {
    true
}

impl QuestionDefinition {
    pub fn is_visible(&self, facts: &FactStore) -> bool {
        self.visible_when
            .iter()
            .all(|condition| condition.is_satisfied(facts))
    }

    pub fn in_scope(&self, selected_route: Option<NoticeRoute>) -> bool {
        if self.route_scope.is_empty() {
            return true;
        }
        selected_route
            .map(|route| self.route_scope.contains(&route))
            .unwrap_or(false)
    }

    pub fn targets_path(&self, path: &FactPath) -> bool {
        self.targets.contains(path)
    }

    /// Whether any visibility condition reads `path`.
    pub fn watches_path(&self, path: &FactPath) -> bool {
        self.visible_when
            .iter()
            .any(|condition| &condition.path == path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSection {
    pub id: String,
    pub title: String,
    /// Checkpoint sections trigger an interim eligibility read-out once every
    /// applicable question in the section is answered.
    #[serde(default)]
    pub checkpoint: bool,
    pub questions: Vec<QuestionDefinition>,
}

/// A validated questionnaire for one product and jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub product: Product,
    pub jurisdiction: Jurisdiction,
    pub version: String,
    pub schema_version: u32,
    pub sections: Vec<QuestionSection>,
}

impl QuestionSet {
    pub fn key(&self) -> QuestionSetKey {
        QuestionSetKey {
            product: self.product,
            jurisdiction: self.jurisdiction,
        }
    }

    /// All questions in declaration order, flattened across sections.
    pub fn questions(&self) -> impl Iterator<Item = &QuestionDefinition> {
        self.sections
            .iter()
            .flat_map(|section| section.questions.iter())
    }

    pub fn question(&self, id: &QuestionId) -> Option<&QuestionDefinition> {
        self.questions().find(|question| &question.id == id)
    }

    pub fn section_of(&self, id: &QuestionId) -> Option<&QuestionSection> {
        self.sections
            .iter()
            .find(|section| section.questions.iter().any(|question| &question.id == id))
    }

    /// The question that writes `path`, if any. Validation guarantees at
    /// most one question targets a given path.
    pub fn producer_of(&self, path: &FactPath) -> Option<&QuestionDefinition> {
        self.questions().find(|question| question.targets_path(path))
    }

    pub fn question_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.questions.len())
            .sum()
    }
}
