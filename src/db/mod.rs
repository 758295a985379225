pub mod pool;

use sqlx::SqlitePool;

use crate::error::Result;

pub use pool::create_pool;

/// Database handle type (cheaply cloneable pool)
pub type Db = SqlitePool;

/// Apply the embedded migrations in `./migrations`
pub async fn run_migrations(pool: &Db) -> Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrations complete");
    Ok(())
}
