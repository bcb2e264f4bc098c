//! Discord interaction handlers
//!
//! This module provides handlers shared by the commands: autocomplete, role checks,
//! and turning Discord attachments into uploads.

/// Role checks for the invoking Discord user
pub mod access;
/// Discord attachment download
pub mod attachment;
/// Autocomplete handlers for product codes and category names
pub mod autocomplete;
