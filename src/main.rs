use tracing::{debug, error, info, warn};

use signed_relay::{app, telemetry, AppConfig, AppError, SignedRelay};

fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    telemetry::init_tracing(config.log_format);
    debug!(
        "Configuration loaded: host={}, port={}, worker_threads={}, relay={:?}",
        config.host, config.port, config.worker_threads, config.relay
    );
    if config.relay.secret.is_empty() {
        warn!("AGENT_HMAC_SECRET is unset; requests will be signed with an empty key");
    }

    info!(
        "Configuring tokio runtime with {} worker threads",
        config.worker_threads
    );
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads.max(1))
        .thread_stack_size(2 * 1024 * 1024)
        .enable_all()
        .build()?
        .block_on(serve(config))
}

async fn serve(config: AppConfig) -> Result<(), AppError> {
    let relay = SignedRelay::over_http(config.relay.clone())?;
    let router = app(relay, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;

    info!("Signed relay listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for CTRL+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            debug!("CTRL+C signal received");
        },
        _ = terminate => {
            debug!("Terminate signal received");
        },
    }
    info!("Shutdown signal received, starting graceful shutdown");
}
