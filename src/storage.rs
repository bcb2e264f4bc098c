//! Object storage for product images and write-off attachments.
//!
//! The rest of the crate only sees the [`ObjectStore`] trait: upload bytes to a bucket
//! path and get a public URL back, or delete an object. [`LocalObjectStore`] keeps
//! objects on the local filesystem, one directory per bucket.

use crate::{
    config::storage::StorageSettings,
    errors::{Error, Result},
};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Bucket holding product pictures
pub const PRODUCT_IMAGES_BUCKET: &str = "product-images";
/// Bucket holding documents attached to write-offs
pub const WRITEOFF_ATTACHMENTS_BUCKET: &str = "writeoff-attachments";
/// Largest accepted product image, in bytes
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_CONTENT_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

/// A file handed to the application for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Original file name as provided by the user
    pub file_name: String,
    /// MIME type, if the sender reported one
    pub content_type: Option<String>,
    /// File contents
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Size of the file in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// External object store used for images and attachments.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` at `path` inside `bucket` and returns its public URL.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<String>;

    /// Removes the object at `path` inside `bucket`.
    async fn delete(&self, bucket: &str, path: &str) -> Result<()>;
}

/// Filesystem-backed [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    /// Creates a store rooted at `root` whose objects are served below `public_base_url`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a store from [`StorageSettings`].
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(settings.root.clone(), settings.public_base_url.clone())
    }

    fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf> {
        let relative = Path::new(bucket).join(path);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain || bucket.is_empty() || path.is_empty() {
            return Err(Error::AttachmentUpload {
                message: format!("invalid object path '{bucket}/{path}'"),
            });
        }
        Ok(self.root.join(relative))
    }

    /// Public URL for an object, whether or not it exists yet.
    #[must_use]
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{bucket}/{path}", self.public_base_url)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<String> {
        let target = self.object_path(bucket, path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        debug!(
            "Stored {} bytes ({:?}) at {}",
            bytes.len(),
            content_type,
            target.display()
        );
        Ok(self.public_url(bucket, path))
    }

    async fn delete(&self, bucket: &str, path: &str) -> Result<()> {
        let target = self.object_path(bucket, path)?;
        tokio::fs::remove_file(&target).await?;
        debug!("Removed {}", target.display());
        Ok(())
    }
}

/// Deletes an object and logs instead of failing; used for cleanup paths.
pub async fn delete_quietly<S: ObjectStore + ?Sized>(store: &S, bucket: &str, path: &str) {
    if let Err(e) = store.delete(bucket, path).await {
        warn!("Failed to delete {bucket}/{path}: {e}");
    }
}

/// Checks that an upload is an accepted image and returns the file extension to use.
///
/// # Errors
/// Returns `Error::InvalidAttachment` if the type is not JPEG, PNG or WebP, or if the
/// file is larger than [`MAX_IMAGE_BYTES`].
pub fn validate_image(upload: &Upload) -> Result<&'static str> {
    let content_type = upload
        .content_type
        .as_deref()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let Some((_, extension)) = IMAGE_CONTENT_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
    else {
        return Err(Error::InvalidAttachment {
            message: "only JPG, PNG and WebP images are allowed".to_string(),
        });
    };
    if upload.size() > MAX_IMAGE_BYTES {
        return Err(Error::InvalidAttachment {
            message: format!(
                "image is {} bytes, the maximum is {MAX_IMAGE_BYTES}",
                upload.size()
            ),
        });
    }
    Ok(*extension)
}

/// Object path for a product image: `products/{product_id}_{millis}.{ext}`.
#[must_use]
pub fn product_image_path(product_id: i64, millis: i64, extension: &str) -> String {
    format!("products/{product_id}_{millis}.{extension}")
}

/// Object path for a write-off attachment: `writeoffs/{product_id}/{millis}_{name}`.
///
/// Anything outside `[A-Za-z0-9._-]` in the file name becomes `_`.
#[must_use]
pub fn attachment_path(product_id: i64, millis: i64, file_name: &str) -> String {
    let safe_name: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe_name = safe_name.trim_start_matches('.');
    let safe_name = if safe_name.is_empty() {
        "attachment"
    } else {
        safe_name
    };
    format!("writeoffs/{product_id}/{millis}_{safe_name}")
}
