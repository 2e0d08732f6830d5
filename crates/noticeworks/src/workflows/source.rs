//! Where definition documents come from.
//!
//! Loaders only ever see identifier strings and UTF-8 text, so question and
//! rule sets can be published from embedded assets, a directory on disk, or a
//! remote config service without the loaders changing.

use std::collections::HashMap;

/// Read access to published definition documents, keyed by identifiers such
/// as `questions/notice_builder/england` or `rules/england/eviction`.
pub trait DefinitionSource: Send + Sync {
    fn read(&self, identifier: &str) -> Result<String, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("no definition published under '{identifier}'")]
    NotFound { identifier: String },
    #[error("definition source unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Why a definition could not be loaded. `Invalid` carries every violation
/// the validator found, not just the first.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("no definition is configured for '{identifier}'")]
    NotFound { identifier: String },
    #[error("definition source failed for '{identifier}': {reason}")]
    Source { identifier: String, reason: String },
    #[error("definition '{identifier}' could not be parsed: {reason}")]
    Parse { identifier: String, reason: String },
    #[error("definition '{identifier}' failed validation: {}", .violations.join("; "))]
    Invalid {
        identifier: String,
        violations: Vec<String>,
    },
}

impl DefinitionError {
    pub(crate) fn from_source(identifier: &str, err: SourceError) -> Self {
        match err {
            SourceError::NotFound { .. } => DefinitionError::NotFound {
                identifier: identifier.to_string(),
            },
            SourceError::Unavailable { reason } => DefinitionError::Source {
                identifier: identifier.to_string(),
                reason,
            },
        }
    }
}

/// Fixed in-memory source, used by tests and by hosts that assemble
/// definitions at startup.
#[derive(Debug, Default)]
pub struct StaticSource {
    documents: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, identifier: &str, text: impl Into<String>) -> Self {
        self.documents.insert(identifier.to_string(), text.into());
        self
    }
}

impl DefinitionSource for StaticSource {
    fn read(&self, identifier: &str) -> Result<String, SourceError> {
        self.documents
            .get(identifier)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                identifier: identifier.to_string(),
            })
    }
}
