//! Write-off Discord command - removes stock and records why it left.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{access, attachment, autocomplete},
        },
        core::{alert, product, writeoff},
        entities::UserRole,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;
    use tracing::warn;

    /// Writes off stock of a product (damage, consumption, dispatch, loss).
    ///
    /// The quantity must be positive and no larger than the stock on hand. An optional
    /// document can be attached; if it cannot be stored the write-off still goes through.
    #[poise::command(slash_command)]
    #[allow(clippy::too_many_arguments)]
    pub async fn writeoff(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product code"]
        #[autocomplete = "autocomplete::autocomplete_product_code"]
        code: String,
        #[description = "Units to remove"]
        #[min = 1]
        quantity: i32,
        #[description = "Why the stock is leaving (e.g. Damaged, Dispatch, Internal use)"]
        reason: String,
        #[description = "Extra details appended to the reason"] notes: Option<String>,
        #[description = "Where the units went"] destination: Option<String>,
        #[description = "Who received them"] receiver: Option<String>,
        #[description = "Supporting document (delivery note, photo)"]
        #[rename = "attachment"]
        document: Option<serenity::Attachment>,
    ) -> Result<()> {
        let Some(actor) = access::require_role(ctx, UserRole::Admin).await? else {
            return Ok(());
        };

        let data = ctx.data();
        let db = &data.database;

        let Some(prod) = product::get_product_by_code(db, &code).await? else {
            ctx.say(format!("❌ Product '{code}' not found.")).await?;
            return Ok(());
        };

        // Downloading can take a moment
        ctx.defer().await?;

        let mut download_error = None;
        let upload = match &document {
            Some(file) => match attachment::download(file).await {
                Ok(upload) => Some(upload),
                Err(e) => {
                    warn!("Skipping write-off attachment: {e}");
                    download_error = Some(e.to_string());
                    None
                }
            },
            None => None,
        };

        let request = writeoff::WriteOffRequest {
            product_id: prod.id,
            quantity,
            reason,
            notes,
            user: actor.username,
            destination,
            receiver,
            attachment: upload,
        };

        let outcome = match writeoff::process_write_off(db, data.storage.as_ref(), request).await
        {
            Ok(outcome) => outcome,
            Err(Error::InsufficientStock {
                available,
                requested,
            }) => {
                ctx.say(format!(
                    "❌ Not enough stock of **{}**: {available} {} on hand, {requested} requested.",
                    prod.name, prod.unit
                ))
                .await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let after = &outcome.product;
        let level = alert::classify(
            after,
            chrono::Utc::now(),
            data.storefront.expiration_warning_days,
        );

        let mut message = format!(
            "✅ Wrote off **{} {}** of **{}** ({}).\nStock: {} → **{}**",
            outcome.transaction.quantity,
            after.unit,
            after.name,
            outcome.transaction.reason,
            after.stock + outcome.transaction.quantity,
            after.stock
        );
        if level != alert::AlertLevel::None {
            write!(&mut message, "\n{} {}", level.emoji(), level)?;
        }
        if let Some(url) = &outcome.transaction.attachment_url {
            write!(&mut message, "\n📎 [Attachment]({url})")?;
        }
        if let Some(error) = outcome.attachment_error.or(download_error) {
            write!(
                &mut message,
                "\n⚠️ The attachment could not be saved: {error}"
            )?;
        }

        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
