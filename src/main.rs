use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use fundmatch::ai::OpenAiProvider;
use fundmatch::storage::{SeaOrmStorage, Storage};
use fundmatch::{create_app, db, import, AppState};
use migration::{Migrator, MigratorTrait};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before anything reads the environment
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let conn = db::connect().await?;
    Migrator::up(&conn, None).await?;

    let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new(conn));

    // Optional starter dataset; only applied while the investor table is empty
    if let Ok(path) = env::var("SEED_CSV_PATH") {
        if let Err(e) = import::seed_if_empty(storage.as_ref(), &path).await {
            tracing::error!("Investor seeding failed: {}", e);
        }
    }

    let state = AppState {
        storage,
        provider: Arc::new(OpenAiProvider::from_env()?),
    };

    // Run our server
    let app = create_app(state);
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Server running on http://0.0.0.0:{}", port);
    // The rate limiter falls back to the peer address when no proxy headers
    // are present, so serve with connect info attached.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
