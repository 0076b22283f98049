use crate::cli::ServeArgs;
use crate::infra::{load_snapshot, AppState};
use crate::routes::with_directory_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bookkeeper_directory::config::AppConfig;
use bookkeeper_directory::directory::{
    AdminGate, DirectoryService, DirectoryState, InMemoryDirectoryStore,
};
use bookkeeper_directory::error::AppError;
use bookkeeper_directory::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(seed_dir) = args.seed_dir.take() {
        config.directory.seed_dir = Some(seed_dir);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let snapshot = load_snapshot(config.directory.seed_dir.as_deref())?;
    info!(
        profiles = snapshot.profiles().len(),
        "directory snapshot loaded"
    );
    let store = Arc::new(InMemoryDirectoryStore::new(snapshot));

    if config.directory.admin_token.is_none() {
        warn!("APP_ADMIN_TOKEN is not set, admin endpoints will refuse every request");
    }
    let directory_state = DirectoryState {
        service: Arc::new(DirectoryService::new(store)),
        admin: AdminGate::new(config.directory.admin_token.clone()),
        featured_limit: config.directory.featured_limit,
    };

    let app = with_directory_routes(directory_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "bookkeeper directory ready");

    axum::serve(listener, app).await?;
    Ok(())
}
