use std::net::SocketAddr;
use std::sync::Arc;

use agrisensa_core::knowledge::KnowledgeBase;
use agrisensa_core::models::{ArtifactPaths, ModelRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agrisensa_api::config::ServerConfig;
use agrisensa_api::router::build_app_router;
use agrisensa_api::state::AppState;
use agrisensa_api::storage::DocumentStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agrisensa_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = agrisensa_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    agrisensa_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    agrisensa_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Models ---
    let models = Arc::new(ModelRegistry::from_paths(ArtifactPaths::in_dir(
        &config.model_dir,
    )));
    let failed = models.warm_up().await;
    if failed.is_empty() {
        tracing::info!(dir = %config.model_dir.display(), "All model artifacts loaded");
    } else {
        let names: Vec<&str> = failed.iter().map(|n| n.as_str()).collect();
        tracing::warn!(?names, "Some model artifacts are unavailable; dependent endpoints will return 500");
    }

    // --- Knowledge base ---
    let knowledge = Arc::new(KnowledgeBase::embedded().expect("Embedded knowledge base is malformed"));

    // --- Document storage ---
    let documents = Arc::new(DocumentStore::new(&config.upload_dir));
    tracing::info!(dir = %config.upload_dir.display(), "Document storage ready");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        models,
        knowledge,
        documents,
    };

    let app = build_app_router(state, &config);

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

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
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
