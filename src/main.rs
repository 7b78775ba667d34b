//! Link radar: collects links by email and publishes them as a daily GitHub issue

mod app;
mod config;
mod constants;
mod error;
mod handlers;
mod lifecycle;
mod middlewares;
mod models;
mod services;
mod state;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use clap::Parser;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{init_db, normalize_binding, AppConfig, Cli};
use crate::constants::{SHUTDOWN_DEADLINE, TICK_INTERVAL, TRIGGER_CHANNEL_CAPACITY};
use crate::lifecycle::{
    server::{serve, ServerHandle},
    shutdown::ShutdownSequence,
    signals::SignalSource,
};
use crate::services::{
    github::GitHubClient,
    inbox::EmailInbox,
    radar::GitHubRadarGenerator,
    radar_items::RadarItemsService,
    scheduler::{run_scheduler, LocalClock, RadarSchedule},
    sender::MailService,
    triggers::{TickSource, Trigger, TriggerChannel},
};

// High-performance memory allocator for non-MSVC targets
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Environment first so `.env` values back the flag defaults too
    let config = AppConfig::from_env();
    let config = config.with_cli(&Cli::parse());

    init_logger(config.debug);
    info!("Starting radar...");

    let _sentry_guard = init_sentry(&config);

    let radar_items = RadarItemsService::new(init_db(&config).await);
    if radar_items.is_degraded() {
        warn!("Data service is degraded; radar item calls will fail");
    }
    let mail = MailService::from_env(&config.aws_region, &config.from_email).await;
    if !mail.is_configured() {
        warn!("Outbound mail is disabled; inbound email will not be answered");
    }
    let inbox = EmailInbox::new(
        radar_items.clone(),
        mail,
        config.allowed_senders.clone(),
        config.inbox_channel_buffer,
        config.debug,
    );
    inbox.start();

    let (triggers, trigger_rx) = TriggerChannel::new(TRIGGER_CHANNEL_CAPACITY);
    spawn_scheduler(trigger_rx, &config, radar_items.clone());

    let mut signals = SignalSource::install(Arc::clone(&triggers))?;
    let ticks = TickSource::spawn(TICK_INTERVAL, Arc::clone(&triggers));

    let state = state::AppState::new(radar_items.clone(), inbox.clone(), &config.api_key, config.debug);
    let app = app::app(state);

    let binding = normalize_binding(&config.http_binding);
    let listener = match TcpListener::bind(&binding).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("error listening on {binding}: {e}");
            return Err(e.into());
        }
    };
    info!("Starting server on {binding}");

    let server = ServerHandle::new();
    let mut server_task = tokio::spawn(serve(listener, app, server.clone()));

    tokio::select! {
        result = &mut server_task => {
            match result {
                Ok(Ok(())) => error!("HTTP server stopped unexpectedly"),
                Ok(Err(e)) => error!("error listening: {e}"),
                Err(e) => error!("HTTP server task failed: {e}"),
            }
            return Err("HTTP server exited without a shutdown request".into());
        }
        () = signals.interrupted() => {
            info!("Received interrupt signal, initiating graceful shutdown...");
        }
    }
    signals.escalate_next_interrupt();

    let report = ShutdownSequence {
        ticks: &ticks,
        triggers: &triggers,
        data: &radar_items,
        email: &inbox,
        http: &server,
    }
    .run(SHUTDOWN_DEADLINE)
    .await;

    if !server.is_stopped() {
        server_task.abort();
    }

    // Flush Sentry events before exit
    if let Some(client) = sentry::Hub::current().client() {
        client.flush(Some(std::time::Duration::from_secs(2)));
    }

    info!(
        clean = report.is_clean(),
        rejected_triggers = triggers.rejected_after_close(),
        "Server shutdown complete"
    );
    Ok(())
}

fn init_logger(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn init_sentry(config: &AppConfig) -> sentry::ClientInitGuard {
    sentry::init((
        config.sentry_dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: config.sentry_traces_sample_rate,
            sample_rate: 1.0,
            ..Default::default()
        },
    ))
}

fn spawn_scheduler(rx: mpsc::Receiver<Trigger>, config: &AppConfig, radar_items: RadarItemsService) {
    let schedule = RadarSchedule::new(
        &config.radar_hour,
        &config.github_access_token,
        &config.radar_repo,
        &config.radar_mention,
    );

    let github = match GitHubClient::new(&config.github_api_url, &config.github_access_token) {
        Ok(client) => client,
        Err(e) => {
            error!("NOT generating radar. Unable to build GitHub client: {e}");
            return;
        }
    };
    let repo = schedule
        .as_ref()
        .map_or(config.radar_repo.trim(), RadarSchedule::repo)
        .to_owned();
    let generator = GitHubRadarGenerator::new(radar_items, github, repo, config.radar_mention.clone());

    tokio::spawn(async move {
        run_scheduler(rx, schedule, generator, LocalClock).await;
    });
}
