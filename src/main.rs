use std::net::SocketAddr;
use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use chat_gateway::{AppState, Config, build_router, utils};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    info!("Starting chat gateway v{}", env!("CARGO_PKG_VERSION"));

    match run().await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// JSON logs by default; `LOG_FORMAT=text` for human-readable output.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let text = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("text"));

    if text {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .flatten_event(true)
            .init();
    }
}

/// Run the application, returning an exit code on error.
async fn run() -> Result<(), exitcode::ExitCode> {
    let config = Config::from_env();
    info!(
        host = %config.host,
        port = config.port,
        upstream = %config.inference_base_url,
        rate_limit_rps = config.rate_limit_rps,
        auth_enabled = config.auth_enabled(),
        "Configuration loaded"
    );
    if !config.auth_enabled() {
        warn!("JWT_SECRET not set; all requests are allowed");
    }

    let addr = config.server_addr();

    let state = AppState::new(config).map_err(|e| {
        error!("Failed to initialize gateway: {e}");
        exitcode::CONFIG
    })?;
    let app = build_router(state);

    let listener = utils::bind(&addr).await.map_err(|e| {
        error!("Failed to bind to {addr}: {e}");
        exitcode::UNAVAILABLE
    })?;
    if let Ok(local) = listener.local_addr() {
        info!("Gateway listening on http://{local}");
    }
    info!("  GET  /health   - Health check");
    info!("  GET  /metrics  - Prometheus metrics");
    info!("  POST /v1/chat  - Proxy to inference service");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(utils::shutdown_signal())
    .await
    .map_err(|e| {
        error!("Server error: {e}");
        exitcode::SOFTWARE
    })?;

    info!("Server shutdown complete");
    Ok(())
}
