//! Inventory Discord commands - dashboard, alerts, listings, history and reorder.
//!
//! This module contains the read-side commands. Every registered user may use them
//! except `/reorder`, which is reserved for admins.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            handlers::{access, autocomplete},
        },
        core::{alert, category, product, replenishment, report, transaction},
        entities::{UserRole, product as product_entity, transaction as transaction_entity},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Discord embeds hold at most 25 fields
    const MAX_FIELDS: usize = 25;
    const MAX_FIELD_CHARS: usize = 1024;
    const MAX_DESCRIPTION_CHARS: usize = 4096;
    const DEFAULT_HISTORY_LIMIT: u32 = 10;

    fn overflow_footer(shown: usize, total: usize, noun: &str) -> serenity::CreateEmbedFooter {
        let text = if total > shown {
            format!("Showing {shown} of {total} {noun}")
        } else {
            format!("{total} {noun}")
        };
        serenity::CreateEmbedFooter::new(text)
    }

    fn movement_lines(movements: &[transaction_entity::Model]) -> Result<Vec<String>> {
        movements.iter().map(report::format_movement).collect()
    }

    /// Shows headline numbers: product count, stock value and alert counts.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if access::require_role(ctx, UserRole::Viewer).await?.is_none() {
            return Ok(());
        }

        let db = &ctx.data().database;
        let storefront = &ctx.data().storefront;

        let products = product::get_all_products(db).await?;
        let stats = report::dashboard_stats(
            &products,
            chrono::Utc::now(),
            storefront.expiration_warning_days,
        );
        let recent = transaction::get_recent_transactions(db, Some(5)).await?;

        let (mut recent_text, _) =
            report::join_within(&movement_lines(&recent)?, MAX_FIELD_CHARS);
        if recent_text.is_empty() {
            recent_text = "No stock movements yet.".to_string();
        }

        let mut description = storefront.report_header.join("\n");
        if !description.is_empty() {
            description.push('\n');
        }
        write!(
            &mut description,
            "As of {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M")
        )?;

        let embed = serenity::CreateEmbed::default()
            .title(format!("📊 {} Dashboard", storefront.name))
            .description(description)
            .color(0x0034_98DB)
            .field("Products", stats.total_products.to_string(), true)
            .field(
                "Stock value",
                report::format_currency(&storefront.currency_symbol, stats.total_value),
                true,
            )
            .field("\u{200b}", "\u{200b}", true)
            .field(
                format!("{} Out of stock", alert::AlertLevel::OutOfStock.emoji()),
                stats.out_of_stock_count.to_string(),
                true,
            )
            .field(
                format!("{} Low stock", alert::AlertLevel::LowStock.emoji()),
                stats.low_stock_count.to_string(),
                true,
            )
            .field("\u{200b}", "\u{200b}", true)
            .field(
                format!("{} Expired", alert::AlertLevel::Expired.emoji()),
                stats.expired_count.to_string(),
                true,
            )
            .field(
                format!("{} Expiring soon", alert::AlertLevel::ExpiringSoon.emoji()),
                stats.expiring_soon_count.to_string(),
                true,
            )
            .field("\u{200b}", "\u{200b}", true)
            .field("Recent movements", recent_text, false);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Lists products that need attention, most urgent first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn alerts(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if access::require_role(ctx, UserRole::Viewer).await?.is_none() {
            return Ok(());
        }

        let db = &ctx.data().database;
        let warning_days = ctx.data().storefront.expiration_warning_days;

        let products = product::get_all_products(db).await?;
        let alerts = alert::collect_alerts(&products, chrono::Utc::now(), warning_days);

        if alerts.is_empty() {
            ctx.say("🟢 No alerts. Stock levels and expiration dates are fine.")
                .await?;
            return Ok(());
        }

        let now = chrono::Utc::now();
        let mut fields = Vec::new();
        for entry in alerts.iter().take(MAX_FIELDS) {
            let prod = &entry.product;
            let mut value = format!(
                "**{}** · stock {} {} (min {})",
                entry.level, prod.stock, prod.unit, prod.min_stock
            );
            if let Some(expiration) = prod.expiration_date {
                let days = alert::days_until_expiration(expiration, now);
                let when = match days {
                    d if d < 0 => format!("expired {} day(s) ago", -d),
                    0 => "expires today".to_string(),
                    d => format!("expires in {d} day(s)"),
                };
                write!(&mut value, " · {expiration} ({when})")?;
            }
            fields.push((
                format!("{} {} ({})", entry.level.emoji(), prod.name, prod.code),
                value,
                false,
            ));
        }

        let embed = serenity::CreateEmbed::default()
            .title("🚨 Inventory Alerts")
            .color(0x00E7_4C3C)
            .fields(fields)
            .footer(overflow_footer(
                alerts.len().min(MAX_FIELDS),
                alerts.len(),
                "alerts",
            ));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the total units held in each category.
    #[poise::command(slash_command, prefix_command)]
    pub async fn stock_by_category(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if access::require_role(ctx, UserRole::Viewer).await?.is_none() {
            return Ok(());
        }

        let db = &ctx.data().database;
        let categories = category::get_all_categories(db).await?;
        if categories.is_empty() {
            ctx.say("No categories yet. Admins can add one with `/category_manage add`.")
                .await?;
            return Ok(());
        }

        let products = product::get_all_products(db).await?;
        let totals = report::stock_by_category(&products, &categories);

        let mut text = String::new();
        for entry in &totals {
            writeln!(
                &mut text,
                "**{}**: {} units",
                entry.category_name, entry.total_stock
            )?;
        }

        let embed = serenity::CreateEmbed::default()
            .title("📦 Stock by Category")
            .description(text)
            .color(0x0058_65F2);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Lists products, optionally filtered by a search term and a category.
    #[poise::command(slash_command, prefix_command)]
    pub async fn inventory(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Matches name, code or description"] search: Option<String>,
        #[description = "Only products in this category"]
        #[rename = "category"]
        #[autocomplete = "autocomplete::autocomplete_category_name"]
        category_name: Option<String>,
    ) -> Result<()> {
        if access::require_role(ctx, UserRole::Viewer).await?.is_none() {
            return Ok(());
        }

        let db = &ctx.data().database;
        let currency = &ctx.data().storefront.currency_symbol;

        let category_id = match &category_name {
            Some(name) => {
                let Some(found) = category::get_category_by_name(db, name).await? else {
                    ctx.say(format!("❌ Category '{name}' not found.")).await?;
                    return Ok(());
                };
                Some(found.id)
            }
            None => None,
        };

        let products =
            product::search_products(db, search.as_deref().unwrap_or_default(), category_id)
                .await?;
        if products.is_empty() {
            ctx.say("No products match.").await?;
            return Ok(());
        }

        let categories = category::get_all_categories(db).await?;
        let rows = report::inventory_rows(&products, &categories);

        let fields: Vec<(String, String, bool)> = rows
            .iter()
            .take(MAX_FIELDS)
            .map(|row| {
                (
                    format!("{} · {}", row.code, row.name),
                    format!(
                        "{} · **{}** {} (min {}) · {} · {}",
                        row.category_name,
                        row.stock,
                        row.unit,
                        row.min_stock,
                        report::format_currency(currency, row.price),
                        row.status
                    ),
                    false,
                )
            })
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title("📋 Inventory")
            .color(0x0058_65F2)
            .fields(fields)
            .footer(overflow_footer(
                rows.len().min(MAX_FIELDS),
                rows.len(),
                "products",
            ));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows every detail of one product.
    #[poise::command(slash_command, prefix_command)]
    pub async fn product_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product code"]
        #[autocomplete = "autocomplete::autocomplete_product_code"]
        code: String,
    ) -> Result<()> {
        if access::require_role(ctx, UserRole::Viewer).await?.is_none() {
            return Ok(());
        }

        let db = &ctx.data().database;
        let storefront = &ctx.data().storefront;

        let Some(prod) = product::get_product_by_code(db, &code).await? else {
            ctx.say(format!("❌ Product '{code}' not found.")).await?;
            return Ok(());
        };

        let category_name = match prod.category_id {
            Some(id) => category::get_category_by_id(db, id)
                .await?
                .map_or_else(|| "-".to_string(), |c| c.name),
            None => "-".to_string(),
        };
        let level = alert::classify(
            &prod,
            chrono::Utc::now(),
            storefront.expiration_warning_days,
        );

        let detail_lines: Vec<String> = optional_details(&prod)
            .into_iter()
            .map(|(label, value)| format!("**{label}:** {value}"))
            .collect();
        let (details, _) = report::join_within(&detail_lines, MAX_FIELD_CHARS);

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("{} {} ({})", level.emoji(), prod.name, prod.code))
            .description(if prod.description.is_empty() {
                "No description".to_string()
            } else {
                report::truncate_chars(&prod.description, MAX_DESCRIPTION_CHARS)
            })
            .color(0x0058_65F2)
            .field("Category", category_name, true)
            .field("Status", format!("{} / {}", level, prod.status), true)
            .field(
                "Price",
                report::format_currency(&storefront.currency_symbol, prod.price),
                true,
            )
            .field(
                "Stock",
                format!(
                    "{}\n{} {} (min {}, initial {})",
                    report::format_stock_bar(prod.stock, prod.min_stock.saturating_mul(2), Some(10)),
                    prod.stock,
                    prod.unit,
                    prod.min_stock,
                    prod.initial_stock
                ),
                false,
            )
            .field(
                "Stock value",
                report::format_currency(&storefront.currency_symbol, report::stock_value(&prod)),
                true,
            );
        if !details.is_empty() {
            embed = embed.field("Details", details, false);
        }
        if let Some(url) = &prod.image_url {
            embed = embed.thumbnail(url);
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    fn optional_details(prod: &product_entity::Model) -> Vec<(&'static str, String)> {
        let mut details = Vec::new();
        if let Some(expiration) = prod.expiration_date {
            details.push(("Expires", expiration.to_string()));
        }
        let optional = [
            ("Location", &prod.location),
            ("Supplier", &prod.supplier),
            ("Brand", &prod.brand),
            ("Model", &prod.model_number),
            ("Warranty", &prod.warranty),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                details.push((label, value.clone()));
            }
        }
        details
    }

    /// Shows recent stock movements, for one product or across the catalog.
    #[poise::command(slash_command, prefix_command)]
    pub async fn history(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only movements of this product"]
        #[autocomplete = "autocomplete::autocomplete_product_code"]
        code: Option<String>,
        #[description = "How many movements to show (default 10, max 25)"]
        #[min = 1]
        #[max = 25]
        limit: Option<u32>,
    ) -> Result<()> {
        if access::require_role(ctx, UserRole::Viewer).await?.is_none() {
            return Ok(());
        }

        let db = &ctx.data().database;
        let limit = u64::from(limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 25));

        let (title, movements) = match &code {
            Some(code) => {
                let Some(prod) = product::get_product_by_code(db, code).await? else {
                    ctx.say(format!("❌ Product '{code}' not found.")).await?;
                    return Ok(());
                };
                (
                    format!("🧾 History for {} ({})", prod.name, prod.code),
                    transaction::get_transactions_for_product(db, prod.id, Some(limit)).await?,
                )
            }
            None => (
                "🧾 Recent Stock Movements".to_string(),
                transaction::get_recent_transactions(db, Some(limit)).await?,
            ),
        };

        if movements.is_empty() {
            ctx.say("No stock movements recorded yet.").await?;
            return Ok(());
        }

        let (text, shown) =
            report::join_within(&movement_lines(&movements)?, MAX_DESCRIPTION_CHARS);

        let embed = serenity::CreateEmbed::default()
            .title(title)
            .description(text)
            .color(0x0034_98DB)
            .footer(overflow_footer(shown, movements.len(), "movements"));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Lists products at or below their reorder threshold with suggested quantities.
    #[poise::command(slash_command, prefix_command)]
    pub async fn reorder(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if access::require_role(ctx, UserRole::Admin).await?.is_none() {
            return Ok(());
        }

        let db = &ctx.data().database;
        let currency = &ctx.data().storefront.currency_symbol;

        let products = product::get_all_products(db).await?;
        let lines = replenishment::select_for_reorder(&products);

        if lines.is_empty() {
            ctx.say("✅ Nothing to reorder. Every product is above its minimum stock.")
                .await?;
            return Ok(());
        }

        let mut estimated_cost = 0.0;
        let mut fields = Vec::new();
        for line in &lines {
            let prod = &line.product;
            let cost = f64::from(line.suggested_quantity) * prod.price;
            estimated_cost += cost;
            if fields.len() < MAX_FIELDS {
                fields.push((
                    format!("{} ({})", prod.name, prod.code),
                    format!(
                        "Stock {} / min {} · order **{} {}** · {}{}",
                        prod.stock,
                        prod.min_stock,
                        line.suggested_quantity,
                        prod.unit,
                        report::format_currency(currency, cost),
                        prod.supplier
                            .as_ref()
                            .map(|s| format!(" · {s}"))
                            .unwrap_or_default()
                    ),
                    false,
                ));
            }
        }

        let embed = serenity::CreateEmbed::default()
            .title("🛒 Reorder Suggestions")
            .description(format!(
                "Estimated cost: **{}**",
                report::format_currency(currency, estimated_cost)
            ))
            .color(0x00F3_9C12)
            .fields(fields)
            .footer(overflow_footer(
                lines.len().min(MAX_FIELDS),
                lines.len(),
                "products",
            ));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
