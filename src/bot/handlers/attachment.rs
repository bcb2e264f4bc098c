//! Discord attachment download.

use crate::{
    errors::{Error, Result},
    storage::Upload,
};
use poise::serenity_prelude as serenity;
use tracing::debug;

/// Downloads a Discord attachment into an [`Upload`].
///
/// # Errors
/// Returns `Error::AttachmentUpload` if Discord's CDN cannot be reached.
pub async fn download(attachment: &serenity::Attachment) -> Result<Upload> {
    let bytes = attachment
        .download()
        .await
        .map_err(|e| Error::AttachmentUpload {
            message: format!("could not download '{}': {e}", attachment.filename),
        })?;
    debug!(
        "Downloaded attachment {} ({} bytes)",
        attachment.filename,
        bytes.len()
    );

    Ok(Upload {
        file_name: attachment.filename.clone(),
        content_type: attachment.content_type.clone(),
        bytes,
    })
}
