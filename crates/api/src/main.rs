use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claimdesk_api::config::ServerConfig;
use claimdesk_api::router::build_app_router;
use claimdesk_api::session_registry::SessionRegistry;
use claimdesk_api::state::AppState;
use claimdesk_cloud::MirrorConfig;
use claimdesk_store::{dataset, AnnotationStore, JsonlRecordStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "claimdesk_api=debug,claimdesk_store=debug,claimdesk_cloud=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        storage_mode = config.storage_mode.name(),
        "Loaded server configuration"
    );

    let roster = config.roster().expect("ANNOTATORS must be valid annotator ids");
    tracing::info!(annotators = ?roster.ids(), "Annotator roster loaded");

    // --- Dataset ---
    let dataset = dataset::load_dataset(&config.dataset_path)
        .await
        .expect("Failed to load dataset");
    if dataset.is_empty() {
        tracing::warn!(path = %config.dataset_path.display(), "Dataset has no items");
    }

    // --- Record store ---
    let mut store = AnnotationStore::local(JsonlRecordStore::new(&config.data_dir))
        .with_write_timeout(Duration::from_secs(config.write_timeout_secs));
    if config.storage_mode.mirrors() {
        let mirror_config = MirrorConfig::from_env().expect("Invalid mirror configuration");
        let mirror = claimdesk_cloud::build_mirror(&mirror_config)
            .await
            .expect("Failed to build record mirror");
        store = store.with_mirror(mirror, mirror_config.timeout);
    }

    store
        .health_check()
        .await
        .expect("Record directory is not writable");
    tracing::info!(data_dir = %config.data_dir.display(), "Record store ready");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        dataset: Arc::new(dataset),
        roster: Arc::new(roster),
        store: Arc::new(store),
        sessions: Arc::new(SessionRegistry::new()),
    };

    let app = build_app_router(state.clone(), &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    let pending = state.sessions.active_count();
    if pending > 0 {
        tracing::warn!(pending, "Discarding undecided label sessions");
    }
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
