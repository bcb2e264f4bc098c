//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the StockBuddy application,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (inventory, write-off, catalog management, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, access checks, attachments)
pub mod handlers;

use crate::{
    config::storefront::StorefrontConfig,
    errors::{Error, Result},
    storage::ObjectStore,
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the object store and the
/// storefront settings that commands need to access.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Store for product images and write-off attachments
    pub storage: Arc<dyn ObjectStore>,
    /// Storefront name, currency and alert window
    pub storefront: StorefrontConfig,
}

impl BotData {
    /// Creates a new `BotData` instance.
    /// This is typically called during bot initialization to set up the
    /// shared context for all commands.
    #[must_use]
    pub fn new(
        database: DatabaseConnection,
        storage: Arc<dyn ObjectStore>,
        storefront: StorefrontConfig,
    ) -> Self {
        Self {
            database,
            storage,
            storefront,
        }
    }
}

/// Every command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::dashboard(),
        commands::alerts(),
        commands::stock_by_category(),
        commands::inventory(),
        commands::product_info(),
        commands::history(),
        commands::reorder(),
        commands::writeoff(),
        commands::product_manage(),
        commands::category_manage(),
        commands::user_manage(),
    ]
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let reply = if error.is_user_error() {
                format!("❌ {error}")
            } else {
                error!("Error in command `{}`: {error:?}", ctx.command().name);
                "❌ Something went wrong. Please try again later.".to_string()
            };
            if let Err(e) = ctx.say(reply).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
///
/// # Errors
/// Returns an error if the client cannot be created or the connection fails.
#[instrument(skip(token, data))]
pub async fn run(token: &str, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands", framework.options().commands.len());
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Starting Discord client...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;
    client.start().await?;
    Ok(())
}
