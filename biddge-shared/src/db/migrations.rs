/// Database migration runner
///
/// Migrations live in `biddge-shared/migrations/` and are embedded into the
/// binary at compile time, so the server creates both tables on first start.
///
/// # Example
///
/// ```no_run
/// use biddge_shared::db::pool::{create_pool, DatabaseConfig};
/// use biddge_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(&DatabaseConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration fails to apply; that migration is rolled
/// back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Number of migrations embedded in this build
pub fn embedded_migration_count() -> usize {
    sqlx::migrate!("./migrations").iter().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_embedded() {
        assert_eq!(embedded_migration_count(), 2);
    }
}
