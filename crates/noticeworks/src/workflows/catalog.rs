//! Definitions shipped inside the binary.
//!
//! Every supported jurisdiction's question and rule sets are embedded at
//! build time, so a fresh deployment can run cases without any external
//! definition store. Only the Notice Builder questionnaires are published so
//! far; Complete Eviction Pack ones resolve as not found until they ship.

use crate::workflows::source::{DefinitionSource, SourceError};
use std::collections::HashMap;
use std::sync::OnceLock;

static EMBEDDED: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

fn embedded_documents() -> &'static HashMap<&'static str, &'static str> {
    EMBEDDED.get_or_init(|| {
        const DOCUMENTS: &[(&str, &str)] = &[
            (
                "questions/notice_builder/england",
                include_str!("../../definitions/england.notice_builder.questions.json"),
            ),
            (
                "questions/notice_builder/wales",
                include_str!("../../definitions/wales.notice_builder.questions.json"),
            ),
            (
                "questions/notice_builder/scotland",
                include_str!("../../definitions/scotland.notice_builder.questions.json"),
            ),
            (
                "rules/england/eviction",
                include_str!("../../definitions/england.eviction.rules.json"),
            ),
            (
                "rules/wales/eviction",
                include_str!("../../definitions/wales.eviction.rules.json"),
            ),
            (
                "rules/scotland/eviction",
                include_str!("../../definitions/scotland.eviction.rules.json"),
            ),
            (
                "rules/northern_ireland/eviction",
                include_str!("../../definitions/northern_ireland.eviction.rules.json"),
            ),
        ];
        DOCUMENTS.iter().copied().collect()
    })
}

/// Definition source backed by the embedded catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedDefinitions;

impl DefinitionSource for EmbeddedDefinitions {
    fn read(&self, identifier: &str) -> Result<String, SourceError> {
        embedded_documents()
            .get(identifier)
            .map(|text| (*text).to_string())
            .ok_or_else(|| SourceError::NotFound {
                identifier: identifier.to_string(),
            })
    }
}

/// Identifiers of every embedded document, sorted, for catalog listings and
/// startup checks.
pub fn embedded_identifiers() -> Vec<&'static str> {
    let mut identifiers: Vec<&'static str> = embedded_documents().keys().copied().collect();
    identifiers.sort_unstable();
    identifiers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_lists_all_documents() {
        let identifiers = embedded_identifiers();
        assert_eq!(identifiers.len(), 7);
        assert!(identifiers.contains(&"questions/notice_builder/england"));
        assert!(identifiers.contains(&"rules/northern_ireland/eviction"));
    }

    #[test]
    fn read_returns_not_found_for_unknown_identifier() {
        let source = EmbeddedDefinitions;
        assert!(source.read("questions/notice_builder/england").is_ok());
        assert!(matches!(
            source.read("questions/complete_eviction_pack/england"),
            Err(SourceError::NotFound { .. })
        ));
    }
}
