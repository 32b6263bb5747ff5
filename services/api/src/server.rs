use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredMailer, InMemoryStore};
use crate::routes::app_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use wander_nest::config::AppConfig;
use wander_nest::error::AppError;
use wander_nest::telemetry;
use wander_nest::workflows::onboarding::{InstitutionalEmailPolicy, OnboardingService};
use wander_nest::workflows::safety::{EscalationPolicy, SafetyService};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryStore::default());
    let mailer = Arc::new(ConfiguredMailer::from_config(&config.mail)?);
    let policy = InstitutionalEmailPolicy::from_config(&config.auth)?;

    let onboarding = Arc::new(OnboardingService::new(
        policy,
        store.clone(),
        config.auth.manual_verification_path.clone(),
    ));
    let safety = Arc::new(SafetyService::new(
        store.clone(),
        store,
        mailer,
        EscalationPolicy::from_config(&config.safety),
        config.mail.admin_recipient.clone(),
    ));

    let app = app_router(onboarding, safety)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        smtp = config.mail.smtp_enabled(),
        pattern_threshold = config.safety.pattern_threshold,
        "wandernest api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
