//! # Pixgram API Server
//!
//! Serves the feed, post, profile and story views over HTTP, with live
//! variants streamed as server-sent events.

use actix_web::{App, HttpServer, error::JsonPayloadError, web};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

#[cfg(feature = "scheduler")]
mod background;
mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::error::AppError;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry);

    let config = AppConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        public_base_url = %config.public_base_url,
        "Starting Pixgram API server"
    );

    let state = AppState::new(&config).await;

    #[cfg(feature = "scheduler")]
    let mut scheduler = start_scheduler(&state).await?;

    let data = web::Data::new(state);
    let max_upload_bytes = config.max_upload_bytes;

    HttpServer::new(move || {
        let json = web::JsonConfig::default()
            .limit(max_upload_bytes)
            .error_handler(move |err, _req| match err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    AppError::PayloadTooLarge(max_upload_bytes).into()
                }
                other => AppError::BadRequest(other.to_string()).into(),
            });

        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .app_data(json)
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    #[cfg(feature = "scheduler")]
    scheduler.shutdown().await?;

    tracing::info!("Server stopped");
    Ok(())
}

#[cfg(feature = "scheduler")]
async fn start_scheduler(state: &AppState) -> anyhow::Result<background::Scheduler> {
    use background::{OrphanSweepConfig, Scheduler, SchedulerConfig, schedule_orphan_sweep};

    let scheduler = Scheduler::new(SchedulerConfig::from_env()).await?;
    schedule_orphan_sweep(
        &scheduler,
        &OrphanSweepConfig::from_env(),
        state.store.clone(),
        state.blobs.clone(),
    )
    .await?;
    scheduler.start().await?;
    Ok(scheduler)
}
