use sea_orm::{Database, DatabaseConnection, DbErr};
use std::env;
use tracing::info;

/// Connect using DATABASE_URL, defaulting to a local SQLite file so the
/// server runs without a provisioned Postgres.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let db_url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:./fundmatch.sqlite?mode=rwc".to_string());

    info!(
        "Connecting to database: {}",
        if db_url.starts_with("sqlite") { "SQLite (local)" } else { "PostgreSQL" }
    );

    Database::connect(&db_url).await
}
