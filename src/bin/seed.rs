use std::env;
use std::process::ExitCode;

use fundmatch::db;
use fundmatch::import;
use fundmatch::storage::SeaOrmStorage;
use migration::{Migrator, MigratorTrait};
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;
use tracing::Level;
use dotenvy::dotenv;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialise tracing (INFO level)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load .env (if present) so DATABASE_URL from file is visible
    let _ = dotenv();

    let Some(path) = env::args().nth(1) else {
        error!("Usage: fundmatch-seed <investors.csv>");
        return ExitCode::from(2);
    };

    let conn = match db::connect().await {
        Ok(conn) => conn,
        Err(e) => {
            error!(?e, "failed to connect to database");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = Migrator::up(&conn, None).await {
        error!(?e, "failed to run migrations");
        return ExitCode::FAILURE;
    }
    let storage = SeaOrmStorage::new(conn);

    let data = match std::fs::read(&path) {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to read {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    match import::import_csv(&storage, &data).await {
        Ok(outcome) => {
            info!("Imported {} investors from {}", outcome.count, path);
            for row in &outcome.skipped {
                warn!("Row {} skipped: {}", row.line, row.reason);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Import failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
