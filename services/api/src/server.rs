use crate::cli::ServeArgs;
use crate::infra::{load_registry, AppState, InMemoryProfileStore, InMemoryRewardPublisher};
use crate::routes::with_profile_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cosmic_beats::config::AppConfig;
use cosmic_beats::error::AppError;
use cosmic_beats::profiles::ProfileCompletionService;
use cosmic_beats::telemetry;
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

    telemetry::init(config.environment, &config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let registry = load_registry(config.schema.path.as_deref())?;
    let store = Arc::new(InMemoryProfileStore::default());
    let publisher = Arc::new(InMemoryRewardPublisher::default());
    let completion_service = Arc::new(ProfileCompletionService::new(store, publisher, registry));

    let app = with_profile_routes(completion_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "profile completion service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
