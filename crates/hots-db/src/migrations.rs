//! Embedded database migrations.

use sqlx::PgPool;

use crate::error::DbError;

/// Run all pending migrations against the given pool.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(DbError::MigrationFailed)?;

    tracing::info!("Database migrations applied");
    Ok(())
}
