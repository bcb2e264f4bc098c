//! Object storage settings.
//!
//! Product images and write-off attachments are written below `STORAGE_ROOT` and
//! served from `STORAGE_PUBLIC_URL`. Both have local defaults suitable for a single host.

use std::path::PathBuf;

/// Where uploaded files live and how they are addressed publicly.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    /// Directory that holds one sub-directory per bucket
    pub root: PathBuf,
    /// URL prefix under which `root` is served
    pub public_base_url: String,
}

impl StorageSettings {
    /// Reads `STORAGE_ROOT` and `STORAGE_PUBLIC_URL`, falling back to `data/storage`
    /// and a `file://` URL for the same directory.
    #[must_use]
    pub fn from_env() -> Self {
        let root = std::env::var("STORAGE_ROOT").map_or_else(
            |_| PathBuf::from("data/storage"),
            PathBuf::from,
        );
        let public_base_url = std::env::var("STORAGE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("file://{}", root.display()));
        Self {
            root,
            public_base_url,
        }
    }
}
