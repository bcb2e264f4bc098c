//! Category business logic - Creation and lookup of product categories.

use crate::{
    entities::{Category, category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Creates a category with a unique, non-empty name.
///
/// The name is trimmed before it is stored; uniqueness is case-sensitive.
///
/// # Errors
/// Returns an error if the name is empty, already taken, or the insert fails.
pub async fn create_category(
    db: &DatabaseConnection,
    name: String,
    description: Option<String>,
) -> Result<category::Model> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Config {
            message: "Category name cannot be empty".to_string(),
        });
    }

    if get_category_by_name(db, &name).await?.is_some() {
        return Err(Error::DuplicateName { name });
    }

    let description = description.filter(|d| !d.trim().is_empty());
    let created = category::ActiveModel {
        name: Set(name),
        description: Set(description),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created category '{}'", created.name);
    Ok(created)
}

/// Retrieves all categories ordered by name.
pub async fn get_all_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a category by its ID.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by its exact name.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}
