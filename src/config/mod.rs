/// Database configuration and connection management
pub mod database;

/// Object storage configuration from environment variables
pub mod storage;

/// Storefront variant configuration loading from config.toml
pub mod storefront;

/// Bootstrap administrator configuration from environment variables
pub mod users;
