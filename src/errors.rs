//! Unified error types for Stock Buddy.
//!
//! Every layer (core workflows, configuration, the Discord surface) reports failures
//! through the single [`Error`] enum so that `?` works across module boundaries.
//! Validation errors are produced before any mutation; persistence errors mean the
//! enclosing database transaction was rolled back.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration, or invalid free-form input
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Any failed read or write against the persistence layer
    #[error("Database error: {0}")]
    Database(String),

    /// The referenced product does not exist
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Id or code used for the lookup
        id: String,
    },

    /// The referenced category does not exist
    #[error("Category not found: {name}")]
    CategoryNotFound {
        /// Id or name used for the lookup
        name: String,
    },

    /// Another product already uses this code
    #[error("A product with code '{code}' already exists")]
    DuplicateCode {
        /// The conflicting product code
        code: String,
    },

    /// Another category or user already uses this name
    #[error("'{name}' already exists")]
    DuplicateName {
        /// The conflicting name
        name: String,
    },

    /// Stock quantities must be positive (write-offs) or non-negative (catalog fields)
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
    },

    /// Prices must be finite and non-negative
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A write-off asked for more units than are on hand
    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock {
        /// Units currently on hand
        available: i32,
        /// Units the caller tried to remove
        requested: i32,
    },

    /// The object store rejected an upload
    #[error("Attachment upload failed: {message}")]
    AttachmentUpload {
        /// Reason reported by the store
        message: String,
    },

    /// An uploaded file failed type or size validation
    #[error("Invalid attachment: {message}")]
    InvalidAttachment {
        /// Why the file was rejected
        message: String,
    },

    /// The acting identity is not a registered user
    #[error("Unknown user: {username}")]
    InvalidCredentials {
        /// The identity that failed to resolve
        username: String,
    },

    /// The acting user lacks the role required for the operation
    #[error("User {username} is not allowed to perform this action")]
    PermissionDenied {
        /// The identity that was refused
        username: String,
    },

    /// Filesystem errors from the local object store or config loading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Malformed storefront configuration
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed to build a reply string
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Errors bubbling up from Serenity/Poise
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<sea_orm::DbErr> for Error {
    fn from(value: sea_orm::DbErr) -> Self {
        Self::Database(value.to_string())
    }
}

impl From<sea_orm::TransactionError<Self>> for Error {
    fn from(value: sea_orm::TransactionError<Self>) -> Self {
        match value {
            sea_orm::TransactionError::Connection(e) => e.into(),
            sea_orm::TransactionError::Transaction(e) => e,
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

impl Error {
    /// Returns true for errors caused by caller input rather than infrastructure.
    ///
    /// Command handlers use this to decide between a plain reply and an error log.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ProductNotFound { .. }
                | Self::CategoryNotFound { .. }
                | Self::DuplicateCode { .. }
                | Self::DuplicateName { .. }
                | Self::InvalidQuantity { .. }
                | Self::InvalidAmount { .. }
                | Self::InsufficientStock { .. }
                | Self::InvalidAttachment { .. }
                | Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::Config { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
