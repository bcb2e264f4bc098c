//! Autocomplete handlers for Discord slash command parameters.
//!
//! This module suggests product codes and category names as the user types, so
//! commands receive values that exist in the catalog.

use crate::{
    bot::BotData,
    core::{category, product},
    errors::Error,
};

/// Discord shows at most 25 suggestions
const MAX_SUGGESTIONS: usize = 25;

/// Provides autocomplete suggestions for product codes.
///
/// Matches the partial input against product codes and names (case-insensitive)
/// and returns the codes of up to 25 matching products, ordered by product name.
pub async fn autocomplete_product_code(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(products) = product::get_all_products(db).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();

    products
        .into_iter()
        .filter(|prod| {
            prod.code.to_lowercase().contains(&partial_lower)
                || prod.name.to_lowercase().contains(&partial_lower)
        })
        .map(|prod| prod.code)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Provides autocomplete suggestions for category names.
pub async fn autocomplete_category_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(categories) = category::get_all_categories(db).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();

    categories
        .into_iter()
        .filter(|cat| cat.name.to_lowercase().contains(&partial_lower))
        .map(|cat| cat.name)
        .take(MAX_SUGGESTIONS)
        .collect()
}
