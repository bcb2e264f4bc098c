//! Category Discord commands - `category_manage` with `add` and `list`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::access},
        core::{category, product, report},
        entities::UserRole,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Parent command for product categories.
    #[poise::command(slash_command, subcommands("category_add", "category_list"))]
    pub async fn category_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Category management command. Available subcommands:\n\
            `/category_manage add` - Add a category (admins)\n\
            `/category_manage list` - List categories",
        )
        .await?;
        Ok(())
    }

    /// Adds a product category.
    #[poise::command(slash_command, rename = "add")]
    pub async fn category_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Unique category name"] name: String,
        #[description = "What belongs in this category"] description: Option<String>,
    ) -> Result<()> {
        if access::require_role(ctx, UserRole::Admin).await?.is_none() {
            return Ok(());
        }

        let created = category::create_category(&ctx.data().database, name, description).await?;
        ctx.say(format!("✅ Category **{}** created.", created.name))
            .await?;
        Ok(())
    }

    /// Lists categories with how many products each holds.
    #[poise::command(slash_command, rename = "list")]
    pub async fn category_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if access::require_role(ctx, UserRole::Viewer).await?.is_none() {
            return Ok(());
        }

        let db = &ctx.data().database;
        let categories = category::get_all_categories(db).await?;
        if categories.is_empty() {
            ctx.say("No categories yet.").await?;
            return Ok(());
        }

        let products = product::get_all_products(db).await?;
        let totals = report::stock_by_category(&products, &categories);

        let mut text = String::from("**Categories**\n");
        for (cat, total) in categories.iter().zip(&totals) {
            let count = products
                .iter()
                .filter(|p| p.category_id == Some(cat.id))
                .count();
            write!(
                &mut text,
                "• **{}** - {count} product(s), {} units",
                cat.name, total.total_stock
            )?;
            if let Some(description) = &cat.description {
                write!(&mut text, " - {description}")?;
            }
            text.push('\n');
        }

        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
