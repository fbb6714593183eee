//! Queue controller (airify-qc) - Main entry point
//!
//! Logs into the content provider, resolves the playlist, starts the
//! control API and plays the queue through the output device until it is
//! exhausted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use airify_common::config::TomlConfig;
use airify_qc::api::{self, AppContext, ControlInfo};
use airify_qc::catalog::Catalog;
use airify_qc::config::{Args, Config};
use airify_qc::playback::{PlaybackSink, Sequencer, SimulatedSink};
use airify_qc::provider::{CatalogProvider, LocalProvider};
use airify_qc::queue::QueueEngine;
use airify_qc::SharedState;

/// Time given to the device to drain its buffer after the last track
const FINISH_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing ahead of the config file; the filter is reloaded
    // with the resolved log level below
    let (filter, filter_handle) = reload::Layer::new(log_filter(args.log_level.as_deref()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let file = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load config file")?;
    let config = Config::resolve(args, file).context("Invalid configuration")?;
    if let Err(e) = filter_handle.reload(log_filter(config.log_level.as_deref())) {
        warn!("Failed to apply log level: {}", e);
    }
    let addr = config.socket_addr()?;
    info!("Starting airify-qc v{}", env!("CARGO_PKG_VERSION"));

    // Output device
    let (sink, sink_events) = SimulatedSink::new(config.device.key(), config.speed);
    let sink = Arc::new(sink.with_password(config.device.password.clone()));
    info!("Connected to output device ({}).", sink.device());

    // Content session and playlist
    let provider = LocalProvider::new(&config.playlist_dir, &config.user, &config.password);
    let session = provider
        .login(&config.user, &config.password)
        .await
        .context("Failed to log in")?;
    let playlist = provider
        .resolve_playlist(&session, &config.playlist)
        .await
        .context("Failed to resolve playlist")?;

    let catalog = Catalog::build(playlist.tracks.clone(), config.shuffle, &mut rand::thread_rng())
        .context("Failed to build catalog")?;
    let queue = Arc::new(QueueEngine::initialize(Arc::new(catalog)));
    let state = Arc::new(SharedState::new());

    // Control API
    let ctx = AppContext {
        queue: Arc::clone(&queue),
        state: Arc::clone(&state),
        info: Arc::new(ControlInfo::new(&playlist, &session, config.device.key())),
    };
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let mut server = tokio::spawn(api::run(addr, ctx, async move {
        let _ = shutdown_rx.changed().await;
    }));

    // Playback
    let sequencer = Sequencer::new(queue, Arc::clone(&sink), state).with_volume(config.device.volume);

    let mut failure = None;
    tokio::select! {
        result = sequencer.run(sink_events) => match result {
            Ok(summary) => {
                info!("Playback ended after {} tracks. Waiting for output device.", summary.tracks_played);
                tokio::time::sleep(FINISH_GRACE).await;
            }
            Err(e) => {
                error!("Playback failed: {}", e);
                failure = Some(e);
            }
        },
        result = &mut server => {
            let e = match result {
                Ok(Err(e)) => anyhow::Error::from(e),
                Ok(Ok(())) => anyhow::anyhow!("HTTP server exited unexpectedly"),
                Err(e) => anyhow::Error::from(e),
            };
            if let Err(stop_err) = sink.stop().await {
                warn!("Failed to stop output device: {}", stop_err);
            }
            return Err(e.context("Control API failed"));
        }
        _ = shutdown_signal() => {}
    }

    if let Err(e) = sink.stop().await {
        warn!("Failed to stop output device: {}", e);
    }
    if let Err(e) = provider.close(session).await {
        warn!("Failed to close session: {}", e);
    }

    let _ = shutdown_tx.send(true);
    match server.await {
        Ok(result) => result.context("Control API failed")?,
        Err(e) => warn!("HTTP server task ended abnormally: {}", e),
    }

    if let Some(e) = failure {
        return Err(anyhow::Error::from(e).context("Playback terminated"));
    }

    info!("Shutdown complete");
    Ok(())
}

/// RUST_LOG when set, otherwise `level` (default info) for airify and tower_http
fn log_filter(level: Option<&str>) -> EnvFilter {
    let level = level.unwrap_or("info");
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("airify_qc={level},airify_common={level},tower_http={level}"))
    })
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
