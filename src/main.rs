//! Marathon live dashboard entrypoint wiring the run catalog, REST, WebSocket and SSE layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marathon_live::{
    config::AppConfig,
    dao::{memory_catalog::MemoryRunCatalog, run_catalog::RunCatalog},
    routes,
    services::{
        notifier::{LogNotifier, Notifier},
        run_service,
    },
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let catalog = load_catalog(&config);
    let notifier = build_notifier(&config);

    let app_state = AppState::new(config, catalog, notifier);
    run_service::load_active_runs(&app_state)
        .await
        .context("loading active runs")?;

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Import the schedule, starting empty when the runs file cannot be used.
fn load_catalog(config: &AppConfig) -> Arc<dyn RunCatalog> {
    match MemoryRunCatalog::from_file(config.runs_file()) {
        Ok(catalog) => Arc::new(catalog),
        Err(err) => {
            warn!(
                path = %config.runs_file().display(),
                error = %err,
                "failed to import runs; starting with an empty schedule"
            );
            Arc::new(MemoryRunCatalog::default())
        }
    }
}

#[cfg(feature = "webhook-notifier")]
fn build_notifier(config: &AppConfig) -> Arc<dyn Notifier> {
    use marathon_live::services::notifier::WebhookNotifier;

    match config.notify_webhook_url() {
        Some(url) => {
            info!(url, "notifications posted to webhook");
            Arc::new(WebhookNotifier::new(url))
        }
        None => Arc::new(LogNotifier),
    }
}

#[cfg(not(feature = "webhook-notifier"))]
fn build_notifier(config: &AppConfig) -> Arc<dyn Notifier> {
    if config.notify_webhook_url().is_some() {
        warn!("webhook notifications require the `webhook-notifier` feature; logging only");
    }
    Arc::new(LogNotifier)
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
