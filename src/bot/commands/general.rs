//! General Discord commands - ping and help.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = format!(
            "**{} Help**\n\
            Here is a summary of all available commands.\n\n\
            **Inventory (everyone registered)**\n\
            • `/dashboard` - Headline numbers: products, stock value and alert counts.\n\
            • `/alerts` - Products that are out of stock, expired, low or expiring soon.\n\
            • `/stock_by_category` - Total units held per category.\n\
            • `/inventory [search] [category]` - Lists products, optionally filtered.\n\
            • `/product_info <code>` - Full details of one product.\n\
            • `/history [code] [limit]` - Recent stock movements.\n\n\
            **Stock Control (admins)**\n\
            • `/writeoff <code> <quantity> <reason> [notes] [destination] [receiver] [attachment]` - Removes stock and records why.\n\
            • `/reorder` - Products to reorder and suggested quantities.\n\n\
            **Management (admins)**\n\
            • `/product_manage <add|update|delete|image>` - Maintain the catalog.\n\
            • `/category_manage <add|list>` - Maintain categories.\n\
            • `/user_manage <add|list>` - Register users and roles.\n\n\
            **Utility**\n\
            • `/ping` - Checks if the bot is responsive.\n\
            • `/help` - Shows this help message.",
            ctx.data().storefront.name
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
