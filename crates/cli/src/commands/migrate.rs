//! Database migration command.
//!
//! Migrations are embedded in `bazaar-storefront` from
//! `crates/storefront/migrations/`; already-applied migrations are skipped,
//! so running this twice is a no-op.

use tracing::info;

use bazaar_storefront::db;

/// Apply the storefront schema to the database at `database_url`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or a migration fails.
pub async fn run(database_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Connecting to database...");
    let pool = db::create_pool(database_url).await?;

    info!("Running migrations...");
    db::migrate(&pool).await?;

    info!("Migrations complete!");
    pool.close().await;
    Ok(())
}
