//! Subcommand implementations.

pub mod migrate;
pub mod seed;

/// Default database when neither URL variable is set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://bazaar.db";

/// Resolve the database URL the same way the storefront server does.
pub fn database_url() -> String {
    std::env::var("BAZAAR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned())
}
