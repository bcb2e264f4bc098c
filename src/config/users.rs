//! Bootstrap administrator loaded from environment variables.
//!
//! A fresh deployment has no users, and only admins can add users. Setting
//! `BOOTSTRAP_ADMIN_ID` (and optionally `BOOTSTRAP_ADMIN_NAME`) in `.env` makes sure at
//! least one admin exists after start-up.

use crate::{
    core::user,
    entities::UserRole,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::info;

/// Gets the configured bootstrap admin as `(discord_id, display_name)`, if any.
#[must_use]
pub fn get_bootstrap_admin() -> Option<(String, String)> {
    let id = std::env::var("BOOTSTRAP_ADMIN_ID").ok()?;
    if id.trim().is_empty() {
        return None;
    }
    let name = std::env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());
    Some((id.trim().to_string(), name))
}

/// Ensures the given identity exists as an admin. Returns true when a user was created.
///
/// An existing user with that identity is left as is, even if it is a viewer.
pub async fn ensure_admin(db: &DatabaseConnection, username: &str, name: &str) -> Result<bool> {
    if user::get_user_by_username(db, username).await?.is_some() {
        return Ok(false);
    }
    user::create_user(db, username.to_string(), name.to_string(), UserRole::Admin).await?;
    info!("Created bootstrap admin '{}'", username);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_ensure_admin_creates_once() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(ensure_admin(&db, "42", "Owner").await?);
        assert!(!ensure_admin(&db, "42", "Owner").await?);

        let admin = user::get_user_by_username(&db, "42").await?;
        assert_eq!(admin.map(|u| u.role), Some(UserRole::Admin));
        Ok(())
    }
}
