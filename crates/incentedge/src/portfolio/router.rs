use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::repository::{LineId, PortfolioEntry, PortfolioRepository, ProjectId, RepositoryError};
use super::service::{PortfolioService, PortfolioServiceError};
use crate::catalog::CatalogHandle;
use crate::engine::domain::{EstimateStatus, PortfolioSnapshot, ProjectInput};
use crate::engine::EngineError;

/// Shared state for the portfolio routes. The catalog handle yields a
/// consistent snapshot per request; the service owns persistence.
pub struct PortfolioRouterState<R> {
    pub service: Arc<PortfolioService<R>>,
    pub catalog: CatalogHandle,
}

impl<R> Clone for PortfolioRouterState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            catalog: self.catalog.clone(),
        }
    }
}

/// Router builder exposing HTTP endpoints for estimates and portfolio KPIs.
pub fn portfolio_router<R>(service: Arc<PortfolioService<R>>, catalog: CatalogHandle) -> Router
where
    R: PortfolioRepository + 'static,
{
    let state = PortfolioRouterState { service, catalog };

    Router::new()
        .route(
            "/api/v1/projects/:project_id/estimates",
            post(estimate_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/portfolio",
            get(portfolio_handler::<R>),
        )
        .route(
            "/api/v1/portfolio/lines/:line_id/status",
            post(status_handler::<R>),
        )
        .route("/api/v1/catalog/programs", get(programs_handler::<R>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChangeRequest {
    pub(crate) status: EstimateStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct PortfolioResponse {
    pub(crate) project_id: ProjectId,
    pub(crate) snapshot: PortfolioSnapshot,
    pub(crate) entries: Vec<PortfolioEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProgramSummary {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) category: &'static str,
    pub(crate) region: Option<String>,
    pub(crate) status: crate::engine::domain::ProgramStatus,
}

pub(crate) async fn estimate_handler<R>(
    State(state): State<PortfolioRouterState<R>>,
    Path(project_id): Path<String>,
    axum::Json(project): axum::Json<ProjectInput>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    let catalog = state.catalog.current();
    let project_id = ProjectId(project_id);

    match state.service.run_estimate(&project_id, &catalog, &project) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(PortfolioServiceError::Engine(error @ EngineError::InvalidInput { .. })) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn portfolio_handler<R>(
    State(state): State<PortfolioRouterState<R>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    let project_id = ProjectId(project_id);

    let entries = match state.service.entries(&project_id) {
        Ok(entries) => entries,
        Err(error) => return internal_error(error),
    };
    let snapshot = match state.service.snapshot(&project_id) {
        Ok(snapshot) => snapshot,
        Err(error) => return internal_error(error),
    };

    let body = PortfolioResponse {
        project_id,
        snapshot,
        entries,
    };
    (StatusCode::OK, axum::Json(body)).into_response()
}

pub(crate) async fn status_handler<R>(
    State(state): State<PortfolioRouterState<R>>,
    Path(line_id): Path<String>,
    axum::Json(request): axum::Json<StatusChangeRequest>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    let line_id = LineId(line_id);

    match state.service.advance(&line_id, request.status) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry)).into_response(),
        Err(PortfolioServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": "line not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error @ PortfolioServiceError::InvalidTransition { .. }) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn programs_handler<R>(
    State(state): State<PortfolioRouterState<R>>,
) -> Response
where
    R: PortfolioRepository + 'static,
{
    let catalog = state.catalog.current();
    let programs: Vec<ProgramSummary> = catalog
        .programs()
        .iter()
        .map(|program| ProgramSummary {
            id: program.id.0.clone(),
            name: program.name.clone(),
            category: program.category.label(),
            region: program.region.clone(),
            status: program.status,
        })
        .collect();

    let body = json!({
        "loaded_at": catalog.loaded_at(),
        "count": programs.len(),
        "programs": programs,
    });
    (StatusCode::OK, axum::Json(body)).into_response()
}

fn internal_error(error: PortfolioServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
