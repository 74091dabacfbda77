use crate::cli::ServeArgs;
use crate::infra::{default_engine_config, AppState, InMemoryPortfolioRepository};
use crate::routes::with_operational_routes;
use axum_prometheus::PrometheusMetricLayer;
use incentedge::catalog::{CatalogHandle, CatalogSnapshot};
use incentedge::config::AppConfig;
use incentedge::error::AppError;
use incentedge::portfolio::PortfolioService;
use incentedge::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(catalog) = args.catalog.take() {
        config.catalog.path = Some(catalog);
    }

    telemetry::init(&config.telemetry)?;

    let snapshot = match &config.catalog.path {
        Some(path) => CatalogSnapshot::from_csv_path(path)?,
        None => CatalogSnapshot::builtin(),
    };
    info!(programs = snapshot.len(), "catalog snapshot loaded");

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalog: CatalogHandle::new(snapshot),
        catalog_path: config.catalog.path.clone(),
    };

    let repository = Arc::new(InMemoryPortfolioRepository::default());
    let service = Arc::new(PortfolioService::new(repository, default_engine_config()));

    let app = with_operational_routes(service, app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "incentive engine API ready");

    axum::serve(listener, app).await?;
    Ok(())
}
