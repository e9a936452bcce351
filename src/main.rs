use std::sync::Arc;

use ambient_bot::config::BotConfig;
use ambient_bot::dispatch::{Dispatcher, GraphApiSender};
use ambient_bot::flow::FlowEngine;
use ambient_bot::store::{LibSqlStore, StateStore};
use ambient_bot::webhook::{AppState, webhook_routes};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match BotConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    eprintln!("🔊 Ambient Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Server URL: {}", config.server_url);
    eprintln!("   Webhook: http://0.0.0.0:{}/webhook", config.port);
    eprintln!("   Sounds: {}", config.public_dir);

    // ── State store ──────────────────────────────────────────────────
    let store: Arc<dyn StateStore> = Arc::new(
        LibSqlStore::new_local(std::path::Path::new(&config.db_path))
            .await
            .unwrap_or_else(|e| {
                eprintln!("Error: Failed to open database at {}: {}", config.db_path, e);
                std::process::exit(1);
            }),
    );
    eprintln!("   Database: {}\n", config.db_path);

    // ── Dispatch + flow ──────────────────────────────────────────────
    let sender = Arc::new(GraphApiSender::new(config.page_access_token.clone()));
    let dispatcher = Dispatcher::new(sender);
    let flow = Arc::new(FlowEngine::new(
        store,
        Arc::clone(&dispatcher),
        config.server_url.clone(),
    ));

    // Webhook routes plus the static audio files at the server root.
    let app = webhook_routes(AppState {
        config: Arc::clone(&config),
        flow,
        dispatcher,
    })
    .fallback_service(ServeDir::new(&config.public_dir))
    .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Ambient bot listening");
    axum::serve(listener, app).await?;

    Ok(())
}
