use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRecordStore};
use crate::routes::with_triage_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use symptom_triage::catalog::CatalogImporter;
use symptom_triage::config::AppConfig;
use symptom_triage::error::AppError;
use symptom_triage::telemetry;
use symptom_triage::triage::TriageService;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(dir) = args.catalog.take() {
        config.catalog.seed_dir = Some(dir);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = match &config.catalog.seed_dir {
        Some(dir) => {
            let seed = CatalogImporter::from_dir(dir)?;
            info!(
                catalog = %dir.display(),
                diseases = seed.diseases.len(),
                rules = seed.rules.len(),
                "seeded record store from catalog"
            );
            InMemoryRecordStore::from_seed(seed)
        }
        None => InMemoryRecordStore::default(),
    };
    let triage_service = Arc::new(TriageService::new(Arc::new(store)));

    let app = with_triage_routes(triage_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "symptom triage service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
