use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use incentedge::catalog::CatalogHandle;
use incentedge::engine::EngineConfig;
use incentedge::portfolio::{
    LineId, PortfolioEntry, PortfolioRepository, ProjectId, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: CatalogHandle,
    pub(crate) catalog_path: Option<PathBuf>,
}

#[derive(Default)]
pub(crate) struct InMemoryPortfolioRepository {
    records: Mutex<HashMap<LineId, PortfolioEntry>>,
}

impl PortfolioRepository for InMemoryPortfolioRepository {
    fn insert(&self, entry: PortfolioEntry) -> Result<PortfolioEntry, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&entry.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    fn update(&self, entry: PortfolioEntry) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&entry.id) {
            guard.insert(entry.id.clone(), entry);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn remove(&self, id: &LineId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn fetch(&self, id: &LineId) -> Result<Option<PortfolioEntry>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_project(&self, project: &ProjectId) -> Result<Vec<PortfolioEntry>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut entries: Vec<_> = guard
            .values()
            .filter(|entry| &entry.project_id == project)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(entries)
    }
}

pub(crate) fn default_engine_config() -> EngineConfig {
    EngineConfig {
        include_pending_programs: false,
        apply_stacking_rules: true,
        confidence_override: None,
    }
}
