//! Storefront variant configuration loading from config.toml
//!
//! The same inventory core serves several storefronts (office supplies, a phone
//! retailer, a construction warehouse). A variant only differs in branding, report
//! headers, its seed categories and users, and the expiration warning window; all of
//! that lives in config.toml. Seeding is idempotent: existing rows are left untouched.

use crate::{
    core::{category, user},
    entities::UserRole,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default number of days before expiration that a product counts as expiring soon
pub const DEFAULT_EXPIRATION_WARNING_DAYS: i64 = 30;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontConfig {
    /// Storefront name shown in replies and report titles
    #[serde(default = "default_name")]
    pub name: String,
    /// Header lines printed at the top of reports
    #[serde(default)]
    pub report_header: Vec<String>,
    /// Currency symbol for prices and stock value
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Expiration warning window in days
    #[serde(default = "default_expiration_warning_days")]
    pub expiration_warning_days: i64,
    /// Categories to seed
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// Users to seed
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// Configuration for a single seed category
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    /// Unique category name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Configuration for a single seed user
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    /// Platform identity (Discord user id)
    pub username: String,
    /// Display name
    pub name: String,
    /// Access level
    pub role: UserRole,
}

fn default_name() -> String {
    "Stock Buddy".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

const fn default_expiration_warning_days() -> i64 {
    DEFAULT_EXPIRATION_WARNING_DAYS
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            report_header: Vec::new(),
            currency_symbol: default_currency_symbol(),
            expiration_warning_days: DEFAULT_EXPIRATION_WARNING_DAYS,
            categories: Vec::new(),
            users: Vec::new(),
        }
    }
}

/// Loads storefront configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - The warning window is negative
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StorefrontConfig> {
    let path_ref = path.as_ref();
    debug!("Loading storefront configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses and validates storefront configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<StorefrontConfig> {
    let config: StorefrontConfig = toml::from_str(contents)?;
    if config.expiration_warning_days < 0 {
        return Err(Error::Config {
            message: format!(
                "expiration_warning_days must not be negative (got {})",
                config.expiration_warning_days
            ),
        });
    }
    Ok(config)
}

/// Loads the storefront from `STOCK_BUDDY_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error: the built-in defaults are used instead.
pub fn load_default_config() -> Result<StorefrontConfig> {
    let path = std::env::var("STOCK_BUDDY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_config(path)
    } else {
        info!("No storefront config at {path}, using defaults.");
        Ok(StorefrontConfig::default())
    }
}

/// Inserts the configured categories and users that do not exist yet.
///
/// Returns the number of rows created.
pub async fn seed_storefront(db: &DatabaseConnection, config: &StorefrontConfig) -> Result<usize> {
    let mut created = 0;

    for cfg_category in &config.categories {
        if category::get_category_by_name(db, &cfg_category.name)
            .await?
            .is_some()
        {
            debug!("Category '{}' already exists. Skipping.", cfg_category.name);
            continue;
        }
        category::create_category(
            db,
            cfg_category.name.clone(),
            cfg_category.description.clone(),
        )
        .await?;
        created += 1;
    }

    for cfg_user in &config.users {
        if user::get_user_by_username(db, &cfg_user.username)
            .await?
            .is_some()
        {
            debug!("User '{}' already exists. Skipping.", cfg_user.username);
            continue;
        }
        user::create_user(
            db,
            cfg_user.username.clone(),
            cfg_user.name.clone(),
            cfg_user.role,
        )
        .await?;
        created += 1;
    }

    info!("Seeded {created} rows for storefront '{}'.", config.name);
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    const PHONE_STORE: &str = r#"
        name = "Phone Store"
        report_header = ["MOBILE CENTER", "Inventory department"]
        currency_symbol = "$"
        expiration_warning_days = 90

        [[categories]]
        name = "Smartphones"
        description = "iPhone, Samsung, Google Pixel"

        [[categories]]
        name = "Audio"

        [[users]]
        username = "100"
        name = "Administrator"
        role = "admin"

        [[users]]
        username = "200"
        name = "Seller"
        role = "viewer"
    "#;

    #[test]
    fn test_parse_storefront_config() {
        let config = parse_config(PHONE_STORE).unwrap();
        assert_eq!(config.name, "Phone Store");
        assert_eq!(config.report_header.len(), 2);
        assert_eq!(config.expiration_warning_days, 90);
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[1].description, None);
        assert_eq!(config.users[0].role, UserRole::Admin);
        assert_eq!(config.users[1].role, UserRole::Viewer);
    }

    #[test]
    fn test_parse_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.name, "Stock Buddy");
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(
            config.expiration_warning_days,
            DEFAULT_EXPIRATION_WARNING_DAYS
        );
        assert!(config.categories.is_empty());
    }

    #[test]
    fn test_negative_window_rejected() {
        let result = parse_config("expiration_warning_days = -1");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_seed_storefront_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(PHONE_STORE)?;

        assert_eq!(seed_storefront(&db, &config).await?, 4);
        assert_eq!(seed_storefront(&db, &config).await?, 0);

        let categories = category::get_all_categories(&db).await?;
        assert_eq!(categories.len(), 2);
        let users = user::get_all_users(&db).await?;
        assert_eq!(users.len(), 2);
        Ok(())
    }
}
