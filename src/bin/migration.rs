use pvz_service::migrator::Migrator;
use sea_orm::{ConnectOptions, Database, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

/// Applies pending schema migrations to `DATABASE_URL`.
///
/// Pass `down` as the first argument to roll back the most recent migration.
#[tokio::main]
async fn main() -> Result<(), DbErr> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let rollback = std::env::args().nth(1).as_deref() == Some("down");

    info!("Connecting to database: {}", database_url);

    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(2)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;

    if rollback {
        Migrator::down(&db, Some(1)).await?;
        info!("Rolled back the most recent migration");
    } else {
        Migrator::up(&db, None).await?;
        info!("Migrations applied");
    }

    Ok(())
}
