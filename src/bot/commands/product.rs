//! Product Discord commands - `product_manage` and its subcommands.
//!
//! This module contains the admin commands that maintain the catalog: adding,
//! updating and deleting products, and attaching a product image.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{access, attachment, autocomplete},
        },
        core::{
            category,
            product::{self, NewProduct, ProductUpdate},
            report,
        },
        entities::{ProductStatus, UserRole},
        errors::{Error, Result},
        storage,
    };
    use chrono::NaiveDate;
    use poise::serenity_prelude as serenity;

    /// Lifecycle status offered as a slash command choice.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum StatusChoice {
        #[name = "Active"]
        Active,
        #[name = "Discontinued"]
        Discontinued,
    }

    impl From<StatusChoice> for ProductStatus {
        fn from(choice: StatusChoice) -> Self {
            match choice {
                StatusChoice::Active => Self::Active,
                StatusChoice::Discontinued => Self::Discontinued,
            }
        }
    }

    fn parse_date(value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| Error::Config {
            message: format!("'{value}' is not a date, use YYYY-MM-DD"),
        })
    }

    async fn resolve_category_id(
        db: &sea_orm::DatabaseConnection,
        name: Option<&str>,
    ) -> Result<Option<i64>> {
        let Some(name) = name else {
            return Ok(None);
        };
        category::get_category_by_name(db, name)
            .await?
            .map(|c| Some(c.id))
            .ok_or_else(|| Error::CategoryNotFound {
                name: name.to_string(),
            })
    }

    /// Parent command for maintaining the product catalog.
    #[poise::command(
        slash_command,
        subcommands("product_add", "product_update", "product_delete", "product_image")
    )]
    pub async fn product_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Product management command. Available subcommands:\n\
            `/product_manage add` - Add a new product\n\
            `/product_manage update` - Change a product's details or correct its stock\n\
            `/product_manage delete` - Delete a product and its history\n\
            `/product_manage image` - Upload a product picture";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a new product to the catalog.
    #[poise::command(slash_command, rename = "add")]
    #[allow(clippy::too_many_arguments)]
    pub async fn product_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Unique code (SKU or barcode)"] code: String,
        #[description = "Product name"] name: String,
        #[description = "Unit price"] price: f64,
        #[description = "Units on hand"]
        #[min = 0]
        stock: i32,
        #[description = "Reorder threshold"]
        #[min = 0]
        min_stock: i32,
        #[description = "Category"]
        #[autocomplete = "autocomplete::autocomplete_category_name"]
        category: Option<String>,
        #[description = "Unit label (defaults to 'Unit')"] unit: Option<String>,
        #[description = "Description"] description: Option<String>,
        #[description = "Expiration date, YYYY-MM-DD"] expires: Option<String>,
        #[description = "Shelf or warehouse location"] location: Option<String>,
        #[description = "Supplier"] supplier: Option<String>,
        #[description = "Brand"] brand: Option<String>,
        #[description = "Model"] model: Option<String>,
        #[description = "Warranty"] warranty: Option<String>,
    ) -> Result<()> {
        if access::require_role(ctx, UserRole::Admin).await?.is_none() {
            return Ok(());
        }

        let db = &ctx.data().database;
        let expiration_date = expires.as_deref().map(parse_date).transpose()?;
        let category_id = resolve_category_id(db, category.as_deref()).await?;

        let created = product::create_product(
            db,
            NewProduct {
                code,
                name,
                description: description.unwrap_or_default(),
                category_id,
                unit: unit.unwrap_or_default(),
                price,
                initial_stock: stock,
                min_stock,
                expiration_date,
                location,
                supplier,
                brand,
                model_number: model,
                warranty,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Added **{}** ({}) with {} {} at {}.",
            created.name,
            created.code,
            created.stock,
            created.unit,
            report::format_currency(&ctx.data().storefront.currency_symbol, created.price)
        ))
        .await?;
        Ok(())
    }

    /// Updates a product's details. Only the options you fill in change.
    #[poise::command(slash_command, rename = "update")]
    #[allow(clippy::too_many_arguments)]
    pub async fn product_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product code"]
        #[autocomplete = "autocomplete::autocomplete_product_code"]
        code: String,
        #[description = "New name"] name: Option<String>,
        #[description = "New unit price"] price: Option<f64>,
        #[description = "Corrected stock count"]
        #[min = 0]
        stock: Option<i32>,
        #[description = "New reorder threshold"]
        #[min = 0]
        min_stock: Option<i32>,
        #[description = "New category"]
        #[autocomplete = "autocomplete::autocomplete_category_name"]
        category: Option<String>,
        #[description = "New unit label"] unit: Option<String>,
        #[description = "New description"] description: Option<String>,
        #[description = "New expiration date, YYYY-MM-DD, or 'none' to clear"] expires: Option<
            String,
        >,
        #[description = "Lifecycle status"] status: Option<StatusChoice>,
        #[description = "Shelf or warehouse location"] location: Option<String>,
        #[description = "Supplier"] supplier: Option<String>,
        #[description = "Brand"] brand: Option<String>,
        #[description = "Model"] model: Option<String>,
        #[description = "Warranty"] warranty: Option<String>,
    ) -> Result<()> {
        if access::require_role(ctx, UserRole::Admin).await?.is_none() {
            return Ok(());
        }

        let db = &ctx.data().database;
        let Some(existing) = product::get_product_by_code(db, &code).await? else {
            ctx.say(format!("❌ Product '{code}' not found.")).await?;
            return Ok(());
        };

        let (clear_expiration, expiration_date) = match expires.as_deref().map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("none") => (true, None),
            Some(value) => (false, Some(parse_date(value)?)),
            None => (false, None),
        };
        let category_id = resolve_category_id(db, category.as_deref()).await?;

        let updated = product::update_product(
            db,
            existing.id,
            ProductUpdate {
                name,
                description,
                category_id,
                unit,
                price,
                stock,
                min_stock,
                expiration_date,
                clear_expiration,
                status: status.map(Into::into),
                location,
                supplier,
                brand,
                model_number: model,
                warranty,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Updated **{}** ({}). Stock {} {}, minimum {}, status {}.",
            updated.name, updated.code, updated.stock, updated.unit, updated.min_stock, updated.status
        ))
        .await?;
        Ok(())
    }

    /// Deletes a product together with its stock movement history.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn product_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product code"]
        #[autocomplete = "autocomplete::autocomplete_product_code"]
        code: String,
    ) -> Result<()> {
        if access::require_role(ctx, UserRole::Admin).await?.is_none() {
            return Ok(());
        }

        let data = ctx.data();
        let Some(existing) = product::get_product_by_code(&data.database, &code).await? else {
            ctx.say(format!("❌ Product '{code}' not found.")).await?;
            return Ok(());
        };

        let deleted = product::delete_product(&data.database, existing.id).await?;
        if let Some(path) = &deleted.image_path {
            storage::delete_quietly(data.storage.as_ref(), storage::PRODUCT_IMAGES_BUCKET, path)
                .await;
        }

        ctx.say(format!(
            "🗑️ Deleted **{}** ({}) and its history.",
            deleted.name, deleted.code
        ))
        .await?;
        Ok(())
    }

    /// Uploads a picture for a product (JPG, PNG or WebP, up to 5 MB).
    #[poise::command(slash_command, rename = "image")]
    pub async fn product_image(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product code"]
        #[autocomplete = "autocomplete::autocomplete_product_code"]
        code: String,
        #[description = "Picture"] image: serenity::Attachment,
    ) -> Result<()> {
        if access::require_role(ctx, UserRole::Admin).await?.is_none() {
            return Ok(());
        }

        let data = ctx.data();
        let Some(existing) = product::get_product_by_code(&data.database, &code).await? else {
            ctx.say(format!("❌ Product '{code}' not found.")).await?;
            return Ok(());
        };

        ctx.defer().await?;
        let upload = attachment::download(&image).await?;
        let updated = product::set_product_image(
            &data.database,
            data.storage.as_ref(),
            existing.id,
            &upload,
        )
        .await?;

        let mut reply = poise::CreateReply::default().content(format!(
            "🖼️ Image saved for **{}** ({}).",
            updated.name, updated.code
        ));
        if let Some(url) = &updated.image_url {
            reply = reply.embed(serenity::CreateEmbed::default().image(url));
        }
        ctx.send(reply).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
