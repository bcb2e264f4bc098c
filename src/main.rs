use dotenvy::dotenv;
use std::{env, sync::Arc};
use stock_buddy::{
    bot::{self, BotData},
    config::{database, storage::StorageSettings, storefront, users},
    errors::{Error, Result},
    storage::LocalObjectStore,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Storefront configuration
    let storefront = storefront::load_default_config()
        .inspect_err(|e| error!("Failed to load storefront configuration: {e}"))?;
    info!("Loaded storefront '{}'", storefront.name);

    // 4. Database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Seed categories and users, then the bootstrap admin
    let seeded = storefront::seed_storefront(&db, &storefront).await?;
    info!("Seeded {seeded} categories and users.");
    match users::get_bootstrap_admin() {
        Some((id, name)) => {
            users::ensure_admin(&db, &id, &name).await?;
        }
        None => warn!("BOOTSTRAP_ADMIN_ID is not set; only seeded users can use the bot."),
    }

    // 6. Object storage
    let settings = StorageSettings::from_env();
    info!("Storing uploads under {}", settings.root.display());
    let store = Arc::new(LocalObjectStore::from_settings(&settings));

    // 7. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run(&token, BotData::new(db, store, storefront)).await
}
