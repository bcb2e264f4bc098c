//! User entity - A platform identity with an inventory role.
//!
//! `username` holds the chat-platform user id, which is already authenticated by the
//! platform, so no secret is stored here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access level of a user
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full catalog and workflow access
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Read-only access
    #[sea_orm(string_value = "viewer")]
    Viewer,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::Viewer => f.write_str("viewer"),
        }
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Platform identity (Discord user id)
    #[sea_orm(unique)]
    pub username: String,
    /// Display name
    pub name: String,
    /// Access level
    pub role: UserRole,
}

/// `User` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
