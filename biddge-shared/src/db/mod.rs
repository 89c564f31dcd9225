/// Database layer for Biddge
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Embedded migration runner
///
/// Queries live in [`crate::store::postgres`].

pub mod migrations;
pub mod pool;
