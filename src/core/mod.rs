//! Core business logic - framework-agnostic inventory operations.
//!
//! Functions that touch persistence take a `&DatabaseConnection` and return
//! [`crate::errors::Result`]. Classification, aggregation and replenishment are pure
//! and work on product snapshots.

/// Alert level classification
pub mod alert;
/// Category creation and lookup
pub mod category;
/// Product catalog operations
pub mod product;
/// Reorder selection
pub mod replenishment;
/// Dashboard statistics, stock aggregation and report rows
pub mod report;
/// Transaction history queries
pub mod transaction;
/// Users, roles and authorization
pub mod user;
/// Stock write-off workflow
pub mod writeoff;
