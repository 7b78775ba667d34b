//! 데이터베이스 연결 관리 모듈.

use std::time::Duration;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{error, info};

use super::AppConfig;

/// Opens the radar database and applies migrations.
///
/// Connection failures are not fatal: the error is logged and `None` is
/// returned so the data service runs degraded. A pool that connects but fails
/// to migrate is still returned.
pub async fn init_db(config: &AppConfig) -> Option<SqlitePool> {
    let pool = match SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            error!("error connecting to database: {e:?}");
            return None;
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        error!("error applying migrations: {e:?}");
        return Some(pool);
    }

    if let Err(e) = apply_sqlite_optimizations(&pool).await {
        error!("error applying sqlite pragmas: {e:?}");
    }

    info!(
        max_connections = config.db_max_connections,
        "Database pool initialized"
    );
    Some(pool)
}

/// Runs database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Configuration(e.into()))?;
    info!("Database migrations applied");
    Ok(())
}

/// Applies SQLite-specific optimizations.
async fn apply_sqlite_optimizations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("PRAGMA journal_mode=WAL").execute(pool).await?;
    sqlx::query("PRAGMA synchronous=NORMAL")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout=5000")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys=ON").execute(pool).await?;
    Ok(())
}
