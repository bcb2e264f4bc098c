//! Product entity - A stocked item with its reorder threshold and optional expiration.
//!
//! `stock` is the quantity on hand and never goes negative; `initial_stock` is the
//! reference baseline used to show how much has left the warehouse. Alert levels are
//! derived from `stock`, `min_stock` and `expiration_date` and are never stored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a product
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ProductStatus {
    /// Normally stocked item
    #[sea_orm(string_value = "active")]
    Active,
    /// No longer reordered, kept for history
    #[sea_orm(string_value = "discontinued")]
    Discontinued,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.write_str("Active"),
            Self::Discontinued => f.write_str("Discontinued"),
        }
    }
}

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique human-readable code (SKU / barcode value)
    #[sea_orm(unique)]
    pub code: String,
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Owning category, if any
    pub category_id: Option<i64>,
    /// Unit label only (e.g., "Unit", "Box")
    pub unit: String,
    /// Unit price
    pub price: f64,
    /// Baseline stock recorded at creation
    pub initial_stock: i32,
    /// Current quantity on hand
    pub stock: i32,
    /// Reorder threshold
    pub min_stock: i32,
    /// Expiration or warranty date for perishable items
    pub expiration_date: Option<Date>,
    /// Active or discontinued
    pub status: ProductStatus,
    /// Shelf / warehouse location
    pub location: Option<String>,
    /// Supplier name
    pub supplier: Option<String>,
    /// Brand
    pub brand: Option<String>,
    /// Manufacturer model designation
    pub model_number: Option<String>,
    /// Warranty description (e.g., "12 months")
    pub warranty: Option<String>,
    /// Public URL of the product image
    pub image_url: Option<String>,
    /// Object-store path of the product image, used for replacement and cleanup
    pub image_path: Option<String>,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product optionally belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// One product has many stock transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
