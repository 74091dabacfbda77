use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::domain::EstimateLine;

/// Identifier wrapper for projects. Scoping projects to an organization is
/// the caller's responsibility; the core never inspects identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

/// Identifier wrapper for stored estimate lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineId(pub String);

/// Repository record tying an estimate line to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub id: LineId,
    pub project_id: ProjectId,
    pub line: EstimateLine,
    pub recorded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait PortfolioRepository: Send + Sync {
    fn insert(&self, entry: PortfolioEntry) -> Result<PortfolioEntry, RepositoryError>;
    fn update(&self, entry: PortfolioEntry) -> Result<(), RepositoryError>;
    fn remove(&self, id: &LineId) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LineId) -> Result<Option<PortfolioEntry>, RepositoryError>;
    fn for_project(&self, project: &ProjectId) -> Result<Vec<PortfolioEntry>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
