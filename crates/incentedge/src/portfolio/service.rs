use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::repository::{LineId, PortfolioEntry, PortfolioRepository, ProjectId, RepositoryError};
use crate::catalog::CatalogSnapshot;
use crate::engine::domain::{
    EstimateStatus, MatchResult, PortfolioSnapshot, ProjectInput, SkippedEstimate,
};
use crate::engine::{EngineConfig, EngineError, IncentiveEngine};

static LINE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_line_id() -> LineId {
    let id = LINE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LineId(format!("line-{id:06}"))
}

/// Service composing the engine with a portfolio repository. The engine
/// stays pure; this layer owns persistence and the status state machine.
pub struct PortfolioService<R> {
    repository: Arc<R>,
    engine: IncentiveEngine,
}

impl<R> PortfolioService<R>
where
    R: PortfolioRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: EngineConfig) -> Self {
        Self {
            repository,
            engine: IncentiveEngine::new(config),
        }
    }

    pub fn engine(&self) -> &IncentiveEngine {
        &self.engine
    }

    /// Run the match -> estimate pipeline for a project and persist the
    /// resulting lines. Prior `estimated` lines are superseded and removed;
    /// lines that already advanced belong to the external application
    /// workflow and are left untouched.
    pub fn run_estimate(
        &self,
        project_id: &ProjectId,
        catalog: &CatalogSnapshot,
        project: &ProjectInput,
    ) -> Result<EstimateReport, PortfolioServiceError> {
        let matches = self.engine.match_programs(catalog, project)?;
        let batch = self.engine.estimate(&matches, project);

        for stale in self.repository.for_project(project_id)? {
            if stale.line.status == EstimateStatus::Estimated {
                self.repository.remove(&stale.id)?;
            }
        }

        let now = Utc::now();
        let mut entries = Vec::with_capacity(batch.lines.len());
        for line in batch.lines {
            let entry = self.repository.insert(PortfolioEntry {
                id: next_line_id(),
                project_id: project_id.clone(),
                line,
                recorded_at: now,
                updated_at: now,
            })?;
            entries.push(entry);
        }

        let snapshot = self.snapshot(project_id)?;

        Ok(EstimateReport {
            project_id: project_id.clone(),
            matches,
            entries,
            skipped: batch.skipped,
            snapshot,
        })
    }

    /// Advance a stored line through the application lifecycle, rejecting
    /// transitions the state machine does not allow.
    pub fn advance(
        &self,
        line_id: &LineId,
        next: EstimateStatus,
    ) -> Result<PortfolioEntry, PortfolioServiceError> {
        let mut entry = self
            .repository
            .fetch(line_id)?
            .ok_or(RepositoryError::NotFound)?;

        let from = entry.line.status;
        if !from.can_transition_to(next) {
            return Err(PortfolioServiceError::InvalidTransition { from, to: next });
        }

        entry.line.status = next;
        entry.updated_at = Utc::now();
        self.repository.update(entry.clone())?;

        Ok(entry)
    }

    /// Current KPIs for a project, recomputed from its stored lines.
    pub fn snapshot(&self, project_id: &ProjectId) -> Result<PortfolioSnapshot, PortfolioServiceError> {
        let lines: Vec<_> = self
            .repository
            .for_project(project_id)?
            .into_iter()
            .map(|entry| entry.line)
            .collect();
        Ok(self.engine.aggregate(&lines))
    }

    pub fn entries(&self, project_id: &ProjectId) -> Result<Vec<PortfolioEntry>, PortfolioServiceError> {
        Ok(self.repository.for_project(project_id)?)
    }
}

/// Outcome of an estimate run, including what was stored and what was
/// skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateReport {
    pub project_id: ProjectId,
    pub matches: Vec<MatchResult>,
    pub entries: Vec<PortfolioEntry>,
    pub skipped: Vec<SkippedEstimate>,
    pub snapshot: PortfolioSnapshot,
}

/// Error raised by the portfolio service.
#[derive(Debug, thiserror::Error)]
pub enum PortfolioServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("cannot move line from {from:?} to {to:?}")]
    InvalidTransition {
        from: EstimateStatus,
        to: EstimateStatus,
    },
}
