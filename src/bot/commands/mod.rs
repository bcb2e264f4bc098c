//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Category management commands
pub mod category;

/// General utility commands
pub mod general;

/// Dashboard, alerts, listings, history and reorder commands
pub mod inventory;

/// Product management commands
pub mod product;

/// User management commands
pub mod user;

/// Stock write-off command
pub mod writeoff;

// Export commands
pub use category::*;
pub use general::*;
pub use inventory::*;
pub use product::*;
pub use user::*;
pub use writeoff::*;
