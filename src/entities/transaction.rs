//! Transaction entity - Immutable audit record of a stock movement.
//!
//! Each row stores a `product_name` snapshot taken when it was created; later renames
//! of the product are intentionally not propagated. Rows are only removed as part of
//! deleting their product.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a stock movement
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransactionType {
    /// Goods received
    #[sea_orm(string_value = "in")]
    In,
    /// Goods dispatched or consumed; produced by the write-off workflow
    #[sea_orm(string_value = "out")]
    Out,
    /// Goods lost or destroyed
    #[sea_orm(string_value = "write_off")]
    WriteOff,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::In => f.write_str("IN"),
            Self::Out => f.write_str("OUT"),
            Self::WriteOff => f.write_str("WRITE-OFF"),
        }
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the product this movement belongs to
    pub product_id: i64,
    /// Product name at the time of the movement
    pub product_name: String,
    /// Movement direction
    pub transaction_type: TransactionType,
    /// Units moved, always positive
    pub quantity: i32,
    /// When the movement was recorded
    pub date: DateTimeUtc,
    /// Free-text reason (e.g., "Consumption: site B")
    pub reason: String,
    /// Identifier of the acting user
    pub user: String,
    /// Where the goods went
    pub destination: Option<String>,
    /// Who received the goods
    pub receiver: Option<String>,
    /// Original file name of the supporting document
    pub attachment_name: Option<String>,
    /// Public URL of the supporting document
    pub attachment_url: Option<String>,
    /// MIME type of the supporting document
    pub attachment_type: Option<String>,
    /// Size in bytes of the supporting document
    pub attachment_size: Option<i64>,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
