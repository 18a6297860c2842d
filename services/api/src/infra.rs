use job_portal::config::AppConfig;
use job_portal::error::AppError;
use job_portal::workflows::accounts::{AccountService, TokenIssuer};
use job_portal::workflows::alerts::{
    AlertMatcher, Dispatcher, DisabledNotifier, JobAlertPipeline, Notifier, SmtpNotifier,
    SpawnedAlertTrigger,
};
use job_portal::workflows::listings::JobListingService;
use job_portal::InMemoryStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything the HTTP layer needs, wired over one shared store.
pub(crate) struct PortalServices {
    pub(crate) store: Arc<InMemoryStore>,
    pub(crate) accounts: Arc<AccountService>,
    pub(crate) listings: Arc<JobListingService>,
    pub(crate) tokens: Arc<TokenIssuer>,
    pub(crate) pipeline: Arc<JobAlertPipeline>,
}

/// SMTP when a relay is configured, otherwise a notifier that drops every message.
pub(crate) fn select_notifier(config: &AppConfig) -> Result<Arc<dyn Notifier>, AppError> {
    match &config.email {
        Some(email) => {
            let notifier = SmtpNotifier::new(email)?;
            tracing::info!(host = %email.smtp_host, port = email.smtp_port, "smtp delivery enabled");
            Ok(Arc::new(notifier))
        }
        None => {
            tracing::warn!("SMTP_HOST not set; outbound e-mail disabled");
            Ok(Arc::new(DisabledNotifier))
        }
    }
}

pub(crate) fn build_services(config: &AppConfig, notifier: Arc<dyn Notifier>) -> PortalServices {
    let store = Arc::new(InMemoryStore::new());
    let tokens = Arc::new(TokenIssuer::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_minutes,
    ));
    let send_timeout = config.alerts.send_timeout();

    let matcher = AlertMatcher::new(store.clone())
        .with_page_size(config.alerts.page_size)
        .with_cap(config.alerts.candidate_cap);
    let dispatcher = Dispatcher::new(notifier.clone(), config.alerts.dispatch_settings())
        .with_ledger(store.clone());
    let pipeline = Arc::new(JobAlertPipeline::new(matcher, dispatcher));

    let accounts = Arc::new(
        AccountService::new(store.clone(), notifier.clone(), tokens.clone())
            .with_send_timeout(send_timeout),
    );
    let listings = Arc::new(
        JobListingService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            notifier,
            Arc::new(SpawnedAlertTrigger::new(pipeline.clone())),
        )
        .with_send_timeout(send_timeout),
    );

    PortalServices {
        store,
        accounts,
        listings,
        tokens,
        pipeline,
    }
}

/// Create or promote the configured administrator, if any.
pub(crate) fn bootstrap_admin(
    config: &AppConfig,
    services: &PortalServices,
) -> Result<(), AppError> {
    let Some(admin) = &config.auth.admin else {
        tracing::info!("APP_ADMIN_EMAIL not set; skipping admin bootstrap");
        return Ok(());
    };
    let view = services.accounts.ensure_admin(&admin.email, &admin.password)?;
    tracing::info!(user_id = %view.id, "administrator account ready");
    Ok(())
}
