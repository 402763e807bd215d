//! Screen-Relay: record the screen from a browser page and publish it to a
//! media host.

mod app;
mod app_command;
mod config;
mod error;
mod record_control;
mod server;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    record_control::RecordControl,
    server::WebState,
};

use crate::config::Config;

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use screen_relay_core::{CaptureUploadFlow, DisplayCapturer, FfmpegEncoder, HttpUploader};
use tokio::{
    net::TcpListener,
    sync::{mpsc, watch},
};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "screen_relay=debug,screen_relay_core=debug,tower_http=info";

/// Application entry point.
#[tokio::main]
async fn main() {
    // Dropping the guard flushes the log file.
    let _log_guard = init_tracing();

    if let Err(e) = run().await {
        error!(error = ?e, "Screen-Relay failed");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let config = Config::load()?;
    config.validate_upload_url()?;

    let options = config.capture.to_options();
    let encoder = FfmpegEncoder::probe(&options.ffmpeg_path)?;
    let uploader = HttpUploader::new(
        &config.upload.base_url,
        &config.upload.endpoint,
        config.upload.timeout(),
    )?;

    let flow = Arc::new(CaptureUploadFlow::new(
        Arc::new(DisplayCapturer::new(options)),
        Arc::new(encoder),
        Arc::new(uploader),
    ));

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let control = Arc::new(RecordControl::new(flow.subscribe(), command_tx.clone()));
    let web_state = WebState {
        flow: Arc::clone(&flow),
        control,
    };

    let listener = TcpListener::bind(("127.0.0.1", config.server.port))
        .await
        .map_err(|e| AppError::ServerError {
            reason: format!("Failed to bind port {}: {}", config.server.port, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let server = tokio::spawn(server::serve(listener, web_state, shutdown_rx));

    let url = config.server_url();
    info!(url = %url, "Record page ready");
    if config.behavior.open_browser
        && let Err(e) = open::that(&url)
    {
        warn!(url = %url, error = ?e, "Failed to open browser");
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C");
            if let Err(e) = command_tx.send(AppCommand::Shutdown).await {
                error!(error = ?e, "Failed to send shutdown command");
            }
        }
    });

    App::new(flow, command_rx, shutdown_tx).run().await?;

    match server.await {
        Ok(result) => result,
        Err(e) => Err(AppError::ServerError {
            reason: format!("Web server task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

/// Log to stdout and to a daily file in the data directory. `RUST_LOG`
/// overrides the default filter.
fn init_tracing() -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match Config::log_dir() {
        Ok(log_dir) => {
            let appender = tracing_appender::rolling::daily(&log_dir, "screen-relay.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();

            info!(log_dir = ?log_dir, "File logging enabled");
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();

            warn!(error = ?e, "File logging disabled");
            None
        }
    }
}
