use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use noticeworks::config::DefinitionsConfig;
use noticeworks::workflows::cases::{CaseId, CaseRecord, CaseRepository, RepositoryError};
use noticeworks::workflows::catalog::EmbeddedDefinitions;
use noticeworks::workflows::source::{DefinitionSource, SourceError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCaseRepository {
    records: Arc<Mutex<HashMap<CaseId, CaseRecord>>>,
}

impl CaseRepository for InMemoryCaseRepository {
    fn insert(&self, record: CaseRecord) -> Result<CaseRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.case_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.case_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: CaseRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.case_id) {
            guard.insert(record.case_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &CaseId) -> Result<Option<CaseRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// Definition source backed by a directory of JSON documents. Identifier
/// segments map to subdirectories, so `rules/england/eviction` resolves to
/// `<root>/rules/england/eviction.json`.
pub(crate) struct FileDefinitionSource {
    root: PathBuf,
}

impl FileDefinitionSource {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn path_for(&self, identifier: &str) -> PathBuf {
        let mut path = self.root.clone();
        for segment in identifier.split('/') {
            path.push(segment);
        }
        path.set_extension("json");
        path
    }
}

impl DefinitionSource for FileDefinitionSource {
    fn read(&self, identifier: &str) -> Result<String, SourceError> {
        let path = self.path_for(identifier);
        std::fs::read_to_string(&path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound {
                identifier: identifier.to_string(),
            },
            _ => SourceError::Unavailable {
                reason: format!("{}: {err}", path.display()),
            },
        })
    }
}

/// Picks the definition source for this deployment: a configured directory
/// when one is set, the embedded catalog otherwise.
pub(crate) fn definition_source(config: &DefinitionsConfig) -> Arc<dyn DefinitionSource> {
    match &config.directory {
        Some(directory) => Arc::new(FileDefinitionSource::new(directory.clone())),
        None => Arc::new(EmbeddedDefinitions),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
