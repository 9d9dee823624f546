//! # Lost & Found Binary
//!
//! Assembles the portal from configuration: item store, notifier, services,
//! the expiration scheduler and the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api_adapters::{build_router, AppState};
use configs::{LogFormat, Settings, StorageBackend};
use domains::{Clock, ItemRepository, Notifier, SystemClock, VerificationWindow};
use notify_adapters::{LogNotifier, MailSettings};
use prometheus_client::registry::Registry;
use services::{
    ClaimService, DeliveryService, ExpirationScheduler, ExpirationSweeper, ItemService,
    SweepMetrics,
};
use storage_adapters::InMemoryItemRepository;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_tracing(settings: &Settings) {
    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter));

    match settings.logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn item_store(settings: &Settings) -> anyhow::Result<Arc<dyn ItemRepository>> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            warn!("using the in-memory item store; data is lost on restart");
            Ok(Arc::new(InMemoryItemRepository::new()))
        }
        #[cfg(feature = "db-postgres")]
        StorageBackend::Postgres => {
            use secrecy::ExposeSecret;

            let url = settings
                .storage
                .database_url
                .as_ref()
                .context("storage.database_url is not set")?;
            let repo = storage_adapters::PgItemRepository::connect(
                url.expose_secret(),
                settings.storage.max_connections,
            )
            .await
            .context("failed to connect to postgres")?;
            Ok(Arc::new(repo))
        }
        #[cfg(not(feature = "db-postgres"))]
        StorageBackend::Postgres => anyhow::bail!("this build does not include the postgres store"),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    init_tracing(&settings);

    // 1. Ports
    let repo = item_store(&settings).await?;
    let window = VerificationWindow::hours(settings.verification.window_hours)
        .context("invalid verification window")?;
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier::new(MailSettings {
        from_name: settings.notifier.from_name.clone(),
        from_email: settings.notifier.from_email.clone(),
        portal_url: settings.notifier.portal_url.clone(),
        verification_desk: settings.notifier.verification_desk.clone(),
        window_hours: settings.verification.window_hours,
    }));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 2. Metrics
    let metrics = SweepMetrics::default();
    let mut registry = Registry::default();
    metrics.register(&mut registry);

    // 3. Services
    let sweeper = Arc::new(
        ExpirationSweeper::new(repo.clone(), notifier.clone(), window).with_metrics(metrics),
    );
    let state = AppState {
        items: Arc::new(ItemService::new(repo.clone(), clock.clone(), window)),
        claims: Arc::new(ClaimService::new(repo.clone(), notifier, clock.clone(), window)),
        delivery: Arc::new(DeliveryService::new(repo, clock.clone())),
        sweeper: sweeper.clone(),
        clock: clock.clone(),
        registry: Arc::new(registry),
    };

    // 4. Background sweep
    let scheduler = if settings.scheduler.enabled {
        let interval = Duration::from_secs(settings.scheduler.interval_minutes * 60);
        Some(ExpirationScheduler::new(sweeper, clock).with_interval(interval).start())
    } else {
        info!("expiration scheduler disabled");
        None
    };

    // 5. HTTP
    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, window_hours = settings.verification.window_hours, "lost & found portal listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    if let Some(handle) = scheduler {
        handle.shutdown().await;
    }
    info!("bye");
    Ok(())
}
