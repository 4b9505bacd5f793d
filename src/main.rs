//! Simple Timer - A countdown timer driven by plain-text time expressions
//!
//! This is the main entry point for the simple-timer daemon.

use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, time::timeout};
use tracing::info;

use simple_timer::{
    config::Config,
    state::{AppState, TimerSession},
    api::create_router,
    services::{load_settings, SettingsWriter},
    tasks::{settings_writer_task, ticker_task},
    utils::{shutdown_signal, SystemClock},
};

/// How long shutdown waits for queued settings to reach the store
const SETTINGS_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("simple_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting simple-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms, settings={:?}",
          config.host, config.port, config.tick_ms, config.settings_path());

    // Load settings and start the writer that persists later changes
    let store = config.settings_store();
    let settings = load_settings(store.as_ref());
    let (settings_writer, saves) = SettingsWriter::new();
    let writer = tokio::spawn(settings_writer_task(store, saves));

    // Create the timer session and the state that owns it
    let session = TimerSession::new(
        Arc::new(SystemClock),
        config.sound_player(),
        settings,
        settings_writer,
    );
    let state = Arc::new(AppState::new(config.port, config.host.clone(), session));

    // Start the tick driver background task
    let ticker_state = Arc::clone(&state);
    let (tick_period, jiggle_period) = (config.tick_period(), config.jiggle_period());
    let ticker = tokio::spawn(async move {
        ticker_task(ticker_state, tick_period, jiggle_period).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /query       - Apply a text query, e.g. {{\"query\": \"+5m\"}}");
    info!("  POST /start       - Start the countdown");
    info!("  POST /stop        - Stop the countdown");
    info!("  POST /alarm/stop  - Dismiss the alarm");
    info!("  GET  /status      - Current timer state");
    info!("  GET|PUT /settings - Sound settings");
    info!("  GET  /health      - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Silence any alarm still sounding
    if let Err(e) = state.stop_alarm() {
        tracing::warn!("Failed to stop alarm on shutdown: {}", e);
    }

    // The writer drains once the session, and with it the last sender, is gone
    ticker.abort();
    drop(state);
    if timeout(SETTINGS_FLUSH_TIMEOUT, writer).await.is_err() {
        tracing::warn!("Timed out waiting for settings to be saved");
    }

    info!("Server shutdown complete");
    Ok(())
}
