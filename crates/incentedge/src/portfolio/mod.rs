//! Portfolio tracking around the pure engine: persistence seam, status
//! lifecycle enforcement, and the HTTP router.

pub mod repository;
pub mod router;
pub mod service;

pub use repository::{
    LineId, PortfolioEntry, PortfolioRepository, ProjectId, RepositoryError,
};
pub use router::portfolio_router;
pub use service::{EstimateReport, PortfolioService, PortfolioServiceError};
