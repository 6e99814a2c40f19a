//! # Database Migrations
//!
//! Embedded SQL migrations, compiled into the binary via `sqlx::migrate!`.
//! The server never needs migration files next to it at runtime.
//!
//! ## Migration Files
//! Located in `migrations/sqlite/` at the workspace root:
//! - `001_initial_schema.sql` — bills, participants, items, item_consumers
//!
//! Migrations run in order and are tracked in the `_sqlx_migrations` table,
//! so re-running is a no-op.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Embedded migrator. Paths are relative to this crate's Cargo.toml.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies all pending migrations to the given pool.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(
        migrations = MIGRATOR.iter().count(),
        "Applying embedded migrations"
    );
    MIGRATOR.run(pool).await?;
    Ok(())
}
