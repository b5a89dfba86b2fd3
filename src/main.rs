use anyhow::{Context, Result};
use axum::serve;
use seedwatch::core::config::Config;
use seedwatch::core::routes::build_router;
use seedwatch::core::startup::apply_wal_operations;
use seedwatch::core::state::AppState;
use seedwatch::core::tracing_init::init_tracing;
use seedwatch::stores::peer_store::PeerStore;
use seedwatch::utils::time::current_timestamp;
use seedwatch::wal::wal::Wal;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, info, Level};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("config.toml")
    };

    let config = Config::from_file(&config_path).context(format!(
        "Failed to load configuration from '{}'. \
        If this is your first time running the tracker, copy config.example.toml to config.toml and adjust the values.",
        config_path.display()
    ))?;

    init_tracing(&config.logging);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.num_threads)
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config, config_path))
}

async fn async_main(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        port = config.server.port,
        num_threads = config.server.num_threads,
        required_seeding_minutes = config.compliance.required_seeding_minutes,
        "seedwatch tracker starting"
    );

    let wal_path = PathBuf::from("seedwatch.wal");
    let wal = Wal::new(wal_path.clone()).context("Failed to initialize WAL")?;

    info!(wal_path = %wal_path.display(), "WAL initialized");

    let state = AppState::new(config.clone(), wal);

    info!("Replaying WAL operations");
    let operations = state.wal.replay().context("Failed to replay WAL")?;
    apply_wal_operations(&state, &operations)?;

    info!(
        operations_replayed = operations.len(),
        users_loaded = state.user_cache.len(),
        torrents_loaded = state.torrent_cache.len(),
        compliance_records_loaded = state.compliance_store.len(),
        "WAL replay completed"
    );

    spawn_cleanup_task(
        Arc::clone(&state.peer_store),
        config.tracker.cleanup_interval,
        config.tracker.peer_timeout,
    );

    info!(
        cleanup_interval_seconds = config.tracker.cleanup_interval,
        peer_timeout_seconds = config.tracker.peer_timeout,
        "Peer cleanup task started"
    );

    let app = build_router(Arc::new(state)).layer(
        ServiceBuilder::new().layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        ),
    );

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind TCP listener to {}", addr))?;

    info!(address = %addr, "Tracker listening");

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;

    info!("Shutting down gracefully");

    Ok(())
}

/// Spawn a background task that periodically drops stale peers
fn spawn_cleanup_task(peer_store: Arc<PeerStore>, cleanup_interval: u64, peer_timeout: i64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(cleanup_interval));

        loop {
            interval.tick().await;

            debug!("Running peer cleanup");
            let removed = peer_store.cleanup_stale_peers(peer_timeout, current_timestamp());

            if removed > 0 {
                info!(
                    removed_peers = removed,
                    active_peers = peer_store.total_peers(),
                    active_torrents = peer_store.active_torrents(),
                    "Peer cleanup completed"
                );
            } else {
                debug!("Peer cleanup completed, no stale peers found");
            }
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
