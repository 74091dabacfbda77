use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use incentedge::catalog::CatalogSnapshot;
use incentedge::error::AppError;
use incentedge::portfolio::{portfolio_router, PortfolioRepository, PortfolioService};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) fn with_operational_routes<R>(
    service: Arc<PortfolioService<R>>,
    state: AppState,
) -> axum::Router
where
    R: PortfolioRepository + 'static,
{
    portfolio_router(service, state.catalog.clone())
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/catalog/reload",
            axum::routing::post(catalog_reload_endpoint),
        )
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CatalogReloadRequest {
    /// Overrides the configured catalog path for this reload only.
    #[serde(default)]
    pub(crate) path: Option<PathBuf>,
}

/// Swap in a freshly loaded snapshot. In-flight estimates keep the snapshot
/// they started with.
pub(crate) async fn catalog_reload_endpoint(
    Extension(state): Extension<AppState>,
    payload: Option<Json<CatalogReloadRequest>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();

    let path = request
        .path
        .or_else(|| state.catalog_path.clone())
        .ok_or_else(|| {
            AppError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no catalog path configured",
            ))
        })?;

    let snapshot = CatalogSnapshot::from_csv_path(&path)?;
    let count = snapshot.len();
    let loaded_at = snapshot.loaded_at();
    state.catalog.replace(snapshot);

    tracing::info!(%count, path = %path.display(), "catalog reloaded from file");

    Ok(Json(json!({
        "programs": count,
        "loaded_at": loaded_at,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{default_engine_config, InMemoryPortfolioRepository};
    use axum::body::Body;
    use axum::http::Request;
    use axum_prometheus::PrometheusMetricLayer;
    use incentedge::catalog::CatalogHandle;
    use metrics_exporter_prometheus::PrometheusHandle;
    use std::sync::atomic::AtomicBool;
    use std::sync::OnceLock;
    use tower::ServiceExt;

    // The Prometheus recorder is process-global; installing it once keeps
    // the tests independent of execution order.
    fn metrics_handle() -> Arc<PrometheusHandle> {
        static HANDLE: OnceLock<Arc<PrometheusHandle>> = OnceLock::new();
        HANDLE
            .get_or_init(|| {
                let (_, prometheus_handle) = PrometheusMetricLayer::pair();
                Arc::new(prometheus_handle)
            })
            .clone()
    }

    fn test_state() -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: metrics_handle(),
            catalog: CatalogHandle::new(CatalogSnapshot::builtin()),
            catalog_path: None,
        }
    }

    fn test_app() -> axum::Router {
        let repository = Arc::new(InMemoryPortfolioRepository::default());
        let service = Arc::new(PortfolioService::new(repository, default_engine_config()));
        with_operational_routes(service, test_state())
    }

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request builds");

        let response = test_app().oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_endpoint_reflects_readiness_flag() {
        let request = Request::builder()
            .uri("/ready")
            .body(Body::empty())
            .expect("request builds");

        let response = test_app().oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_renders() {
        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .expect("request builds");

        let response = test_app().oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn catalog_reload_without_a_path_fails() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/catalog/reload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .expect("request builds");

        let response = test_app().oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn estimate_route_is_mounted() {
        let payload = serde_json::json!({
            "project_type": "solar",
            "unit_count": 80,
            "total_budget": 1_500_000.0,
            "location": { "state": "NY", "city": "New York", "utility": "Con Edison" },
        });
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/projects/demo/estimates")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds");

        let response = test_app().oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
