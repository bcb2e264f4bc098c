//! User business logic - Inventory roles and authorization.
//!
//! Identity comes from the chat platform, so a user row only maps a platform id to a
//! display name and a role. Admins may do everything; viewers are limited to read-only
//! operations.

use crate::{
    entities::{User, UserRole, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info};

/// Whether `role` is allowed to perform an operation that needs `required`.
#[must_use]
pub const fn role_allows(role: UserRole, required: UserRole) -> bool {
    match required {
        UserRole::Viewer => true,
        UserRole::Admin => matches!(role, UserRole::Admin),
    }
}

/// Registers a user.
///
/// # Errors
/// Returns an error if the username or name is empty, the username is already
/// registered, or the insert fails.
pub async fn create_user(
    db: &DatabaseConnection,
    username: String,
    name: String,
    role: UserRole,
) -> Result<user::Model> {
    let username = username.trim().to_string();
    if username.is_empty() {
        return Err(Error::Config {
            message: "Username cannot be empty".to_string(),
        });
    }
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Config {
            message: "User name cannot be empty".to_string(),
        });
    }

    if get_user_by_username(db, &username).await?.is_some() {
        return Err(Error::DuplicateName { name: username });
    }

    let created = user::ActiveModel {
        username: Set(username),
        name: Set(name),
        role: Set(role),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Registered {} as {}", created.username, created.role);
    Ok(created)
}

/// Retrieves all users ordered by display name.
pub async fn get_all_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by username.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Checks that `username` is registered and holds at least `required`.
///
/// # Errors
/// - `Error::InvalidCredentials` if the user is not registered
/// - `Error::PermissionDenied` if the user's role is insufficient
pub async fn authorize(
    db: &DatabaseConnection,
    username: &str,
    required: UserRole,
) -> Result<user::Model> {
    let user = get_user_by_username(db, username)
        .await?
        .ok_or_else(|| Error::InvalidCredentials {
            username: username.to_string(),
        })?;

    if !role_allows(user.role, required) {
        debug!("{} ({}) denied {required} access", user.username, user.role);
        return Err(Error::PermissionDenied {
            username: user.username,
        });
    }

    Ok(user)
}
