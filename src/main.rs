use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use estate_api_rust::config::config;
use estate_api_rust::database::manager;
use estate_api_rust::routes;
use estate_api_rust::state::AppState;
use estate_api_rust::storage::DiskPhotoStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config();
    tracing::info!("Starting listing portal in {:?} mode", config.environment);

    let pool = manager::connect(&config.database).await?;
    manager::migrate(&pool).await?;

    let photo_store = DiskPhotoStore::new(&config.uploads);
    photo_store.ensure_root().await?;

    let state = AppState::new(pool, Arc::new(photo_store), config);
    let app = routes::create_router(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listing portal listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
