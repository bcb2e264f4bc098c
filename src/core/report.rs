//! Report generation business logic.
//!
//! This module selects and summarises the data behind the dashboard and the
//! inventory, history and reorder reports. All functions are pure and framework-agnostic;
//! the bot layer decides how the rows are rendered.

use crate::{
    core::alert::{self, AlertLevel},
    entities::{category, product, transaction},
    errors::Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::{collections::HashMap, fmt::Write};

/// Longest reason shown in a movement line
pub const MOVEMENT_REASON_CHARS: usize = 80;
/// Longest destination, receiver or attachment name shown in a movement line
pub const MOVEMENT_DETAIL_CHARS: usize = 40;

/// Total stock held in one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStock {
    /// Category display name
    pub category_name: String,
    /// Sum of `stock` over the category's products
    pub total_stock: i64,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    /// Number of products in the catalog
    pub total_products: usize,
    /// Sum of `stock * price`
    pub total_value: f64,
    /// Products at or below their reorder threshold (but not empty)
    pub low_stock_count: usize,
    /// Products with no stock
    pub out_of_stock_count: usize,
    /// Products past their expiration date
    pub expired_count: usize,
    /// Products inside the expiration warning window
    pub expiring_soon_count: usize,
}

/// Stock status label used in inventory reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    /// Above the reorder threshold
    Ok,
    /// At or below the reorder threshold
    Low,
    /// Nothing left
    Out,
}

impl StockStatus {
    /// Status of a product based on stock alone (expiration is ignored).
    #[must_use]
    pub const fn of(product: &product::Model) -> Self {
        if product.stock <= 0 {
            Self::Out
        } else if product.stock <= product.min_stock {
            Self::Low
        } else {
            Self::Ok
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => f.write_str("OK"),
            Self::Low => f.write_str("LOW"),
            Self::Out => f.write_str("OUT"),
        }
    }
}

/// One line of the inventory report.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    /// Product code
    pub code: String,
    /// Product name
    pub name: String,
    /// Category name, or `-` when unknown
    pub category_name: String,
    /// Baseline stock
    pub initial_stock: i32,
    /// Current stock
    pub stock: i32,
    /// Units that have left since the baseline (`initial_stock - stock`)
    pub difference: i32,
    /// Unit label
    pub unit: String,
    /// Unit price
    pub price: f64,
    /// `stock * price`
    pub value: f64,
    /// Reorder threshold
    pub min_stock: i32,
    /// Stock status
    pub status: StockStatus,
    /// Expiration date, if any
    pub expiration_date: Option<NaiveDate>,
}

/// Sums stock per category, one entry per category in input order.
///
/// Categories without products report zero. Products whose `category_id` is missing or
/// does not match any listed category are not counted anywhere.
#[must_use]
pub fn stock_by_category(
    products: &[product::Model],
    categories: &[category::Model],
) -> Vec<CategoryStock> {
    let mut totals: HashMap<i64, i64> = HashMap::new();
    for p in products {
        if let Some(category_id) = p.category_id {
            *totals.entry(category_id).or_default() += i64::from(p.stock);
        }
    }

    categories
        .iter()
        .map(|c| CategoryStock {
            category_name: c.name.clone(),
            total_stock: totals.get(&c.id).copied().unwrap_or(0),
        })
        .collect()
}

/// Computes the dashboard counters for a product list.
#[must_use]
pub fn dashboard_stats(
    products: &[product::Model],
    now: DateTime<Utc>,
    warning_days: i64,
) -> DashboardStats {
    let mut stats = DashboardStats {
        total_products: products.len(),
        ..DashboardStats::default()
    };

    for p in products {
        stats.total_value += stock_value(p);
        match alert::classify(p, now, warning_days) {
            AlertLevel::OutOfStock => stats.out_of_stock_count += 1,
            AlertLevel::LowStock => stats.low_stock_count += 1,
            AlertLevel::Expired => stats.expired_count += 1,
            AlertLevel::ExpiringSoon => stats.expiring_soon_count += 1,
            AlertLevel::None => {}
        }
    }

    stats
}

/// Value of the units on hand.
#[must_use]
pub fn stock_value(product: &product::Model) -> f64 {
    f64::from(product.stock) * product.price
}

/// Builds inventory report rows in product order.
#[must_use]
pub fn inventory_rows(
    products: &[product::Model],
    categories: &[category::Model],
) -> Vec<InventoryRow> {
    let names: HashMap<i64, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    products
        .iter()
        .map(|p| InventoryRow {
            code: p.code.clone(),
            name: p.name.clone(),
            category_name: p
                .category_id
                .and_then(|id| names.get(&id).copied())
                .unwrap_or("-")
                .to_string(),
            initial_stock: p.initial_stock,
            stock: p.stock,
            difference: p.initial_stock - p.stock,
            unit: p.unit.clone(),
            price: p.price,
            value: stock_value(p),
            min_stock: p.min_stock,
            status: StockStatus::of(p),
            expiration_date: p.expiration_date,
        })
        .collect()
}

/// Formats an amount with the storefront's currency symbol and thousands separators.
///
/// # Returns
/// Formatted string like "$1,299.99"
#[must_use]
pub fn format_currency(symbol: &str, amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}{symbol}{grouped}.{cents}")
}

/// Generates a stock bar relative to a target level.
///
/// Creates a text-based bar like: `[████████░░] 8/10`
///
/// # Arguments
/// * `stock` - Units on hand
/// * `target` - Level that fills the bar (usually twice the reorder threshold)
/// * `bar_length` - Length of the bar in characters (default 10)
#[must_use]
pub fn format_stock_bar(stock: i32, target: i32, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    if target <= 0 {
        return format!("[{}] {stock}/-", "█".repeat(length));
    }

    let ratio = (f64::from(stock) / f64::from(target)).clamp(0.0, 1.0);
    // Cast safety: ratio ∈ [0, 1] and length is small, so the result is in [0, length].
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = (ratio * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!("[{}{}] {stock}/{target}", "█".repeat(filled), "░".repeat(empty))
}

/// Shortens `text` to at most `max_chars` characters, ending in `…` when cut.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}

/// Renders one stock movement as a single line of Discord markdown.
///
/// Free-text parts are shortened so a line stays well under embed limits.
///
/// # Errors
/// Returns `Error::Format` if writing to the line fails.
pub fn format_movement(txn: &transaction::Model) -> Result<String> {
    let mut line = format!(
        "`{}` **{}** {} x{} · {} · <@{}>",
        txn.date.format("%Y-%m-%d %H:%M"),
        txn.transaction_type,
        truncate_chars(&txn.product_name, MOVEMENT_DETAIL_CHARS),
        txn.quantity,
        truncate_chars(&txn.reason, MOVEMENT_REASON_CHARS),
        txn.user
    );
    if let Some(destination) = &txn.destination {
        write!(
            line,
            " · to {}",
            truncate_chars(destination, MOVEMENT_DETAIL_CHARS)
        )?;
    }
    if let Some(receiver) = &txn.receiver {
        write!(
            line,
            " · received by {}",
            truncate_chars(receiver, MOVEMENT_DETAIL_CHARS)
        )?;
    }
    if let Some(url) = &txn.attachment_url {
        let name = txn.attachment_name.as_deref().unwrap_or("attachment");
        write!(
            line,
            " · [{}]({url})",
            truncate_chars(name, MOVEMENT_DETAIL_CHARS)
        )?;
    }
    Ok(line)
}

/// Joins lines with newlines, stopping before the text would exceed `budget` characters.
///
/// A first line that is too long on its own is cut to fit, so the text is never empty
/// when `lines` is not.
///
/// # Returns
/// The joined text and how many lines it holds
#[must_use]
pub fn join_within(lines: &[String], budget: usize) -> (String, usize) {
    let mut text = String::new();
    let mut used = 0;
    let mut shown = 0;
    for line in lines {
        let len = line.chars().count() + 1;
        if used + len > budget {
            if shown == 0 {
                text = truncate_chars(line, budget);
                shown = 1;
            }
            break;
        }
        text.push_str(line);
        text.push('\n');
        used += len;
        shown += 1;
    }
    (text, shown)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{sample_category, sample_product};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn stocked(id: i64, category_id: Option<i64>, stock: i32) -> product::Model {
        product::Model {
            category_id,
            stock,
            ..sample_product(id, &format!("SKU-{id}"))
        }
    }

    #[test]
    fn test_stock_by_category_in_input_order() {
        let categories = vec![sample_category(2, "Tools"), sample_category(1, "Paint")];
        let products = vec![
            stocked(1, Some(1), 4),
            stocked(2, Some(1), 6),
            stocked(3, Some(2), 7),
        ];

        let totals = stock_by_category(&products, &categories);
        assert_eq!(
            totals,
            vec![
                CategoryStock {
                    category_name: "Tools".to_string(),
                    total_stock: 7
                },
                CategoryStock {
                    category_name: "Paint".to_string(),
                    total_stock: 10
                },
            ]
        );
    }

    #[test]
    fn test_stock_by_category_empty_and_unknown() {
        let categories = vec![sample_category(1, "Paint"), sample_category(5, "Empty")];
        let products = vec![
            stocked(1, Some(1), 3),
            stocked(2, None, 100),
            stocked(3, Some(99), 50),
        ];

        let totals = stock_by_category(&products, &categories);
        assert_eq!(totals[0].total_stock, 3);
        assert_eq!(totals[1].total_stock, 0);
    }

    #[test]
    fn test_stock_by_category_is_additive() {
        let categories = vec![
            sample_category(1, "A"),
            sample_category(2, "B"),
            sample_category(3, "C"),
        ];
        let products: Vec<product::Model> = (1..=30)
            .map(|i| {
                let category = match i % 4 {
                    0 => None,
                    n => Some(n),
                };
                stocked(i, category, i32::try_from(i * 3).unwrap_or(0))
            })
            .collect();

        let aggregated: i64 = stock_by_category(&products, &categories)
            .iter()
            .map(|c| c.total_stock)
            .sum();
        let expected: i64 = products
            .iter()
            .filter(|p| p.category_id.is_some_and(|id| (1..=3).contains(&id)))
            .map(|p| i64::from(p.stock))
            .sum();
        assert_eq!(aggregated, expected);
    }

    #[test]
    fn test_dashboard_stats_counts() {
        let today = now().date_naive();
        let products = vec![
            product::Model {
                price: 10.0,
                ..stocked(1, None, 0)
            },
            product::Model {
                price: 2.5,
                min_stock: 5,
                ..stocked(2, None, 4)
            },
            product::Model {
                price: 1.0,
                expiration_date: Some(today - Duration::days(1)),
                ..stocked(3, None, 20)
            },
            product::Model {
                price: 1.0,
                expiration_date: Some(today + Duration::days(5)),
                ..stocked(4, None, 20)
            },
            product::Model {
                price: 100.0,
                ..stocked(5, None, 20)
            },
        ];

        let stats = dashboard_stats(&products, now(), 30);
        assert_eq!(stats.total_products, 5);
        assert_eq!(stats.out_of_stock_count, 1);
        assert_eq!(stats.low_stock_count, 1);
        assert_eq!(stats.expired_count, 1);
        assert_eq!(stats.expiring_soon_count, 1);
        assert_eq!(stats.total_value, 4.0 * 2.5 + 20.0 + 20.0 + 2000.0);
    }

    #[test]
    fn test_inventory_rows() {
        let categories = vec![sample_category(1, "Audio")];
        let products = vec![
            product::Model {
                initial_stock: 30,
                min_stock: 10,
                price: 249.99,
                ..stocked(1, Some(1), 22)
            },
            product::Model {
                initial_stock: 5,
                min_stock: 2,
                ..stocked(2, Some(42), 0)
            },
        ];

        let rows = inventory_rows(&products, &categories);
        assert_eq!(rows[0].category_name, "Audio");
        assert_eq!(rows[0].difference, 8);
        assert_eq!(rows[0].status, StockStatus::Ok);
        assert_eq!(rows[0].value, 22.0 * 249.99);
        assert_eq!(rows[1].category_name, "-");
        assert_eq!(rows[1].status, StockStatus::Out);
        assert_eq!(rows[1].difference, 5);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency("$", 0.0), "$0.00");
        assert_eq!(format_currency("$", 1299.99), "$1,299.99");
        assert_eq!(format_currency("€", 1_234_567.5), "€1,234,567.50");
        assert_eq!(format_currency("$", -25.5), "-$25.50");
        assert_eq!(format_currency("$", 999.0), "$999.00");
    }

    fn movement(reason: &str, attachment_url: Option<&str>) -> transaction::Model {
        transaction::Model {
            id: 1,
            product_id: 1,
            product_name: "Cement 50kg".to_string(),
            transaction_type: crate::entities::TransactionType::Out,
            quantity: 2,
            date: now(),
            reason: reason.to_string(),
            user: "1001".to_string(),
            destination: Some("Site B".to_string()),
            receiver: Some("R".repeat(300)),
            attachment_name: attachment_url.map(|_| "delivery note.pdf".to_string()),
            attachment_url: attachment_url.map(str::to_string),
            attachment_type: None,
            attachment_size: None,
        }
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_chars("abcdefghijk", 5), "abcd…");
        assert_eq!(truncate_chars("ñññññ", 3), "ññ…");
    }

    #[test]
    fn test_format_movement_caps_free_text() -> Result<()> {
        let line = format_movement(&movement(&"x".repeat(6000), None))?;
        assert!(line.starts_with("`2026-06-01 09:00` **OUT** Cement 50kg x2 · "));
        assert!(line.contains(&format!("{}…", "x".repeat(MOVEMENT_REASON_CHARS - 1))));
        assert!(line.contains(" · to Site B"));
        assert!(line.chars().count() < 300);
        Ok(())
    }

    #[test]
    fn test_dashboard_movements_fit_an_embed_field() -> Result<()> {
        let url = "file://data/storage/writeoff-attachments/writeoffs/12/1710000000000_delivery_note.pdf";
        let lines = (0..5)
            .map(|_| format_movement(&movement(&"Damaged in transit ".repeat(20), Some(url))))
            .collect::<Result<Vec<_>>>()?;

        let (text, shown) = join_within(&lines, 1024);
        assert!(text.chars().count() <= 1024);
        assert!((1..5).contains(&shown));
        assert_eq!(text.lines().count(), shown);
        assert!(text.contains("[delivery note.pdf]("));
        Ok(())
    }

    #[test]
    fn test_join_within() {
        let lines = vec!["a".repeat(10), "b".repeat(10), "c".repeat(10)];
        assert_eq!(join_within(&lines, 100).1, 3);
        assert_eq!(join_within(&lines, 22), (format!("{}\n{}\n", "a".repeat(10), "b".repeat(10)), 2));
        assert_eq!(join_within(&lines, 5), ("aaaa…".to_string(), 1));
        assert_eq!(join_within(&[], 5), (String::new(), 0));
    }

    #[test]
    fn test_format_stock_bar() {
        assert_eq!(format_stock_bar(10, 10, Some(10)), "[██████████] 10/10");
        assert_eq!(format_stock_bar(5, 10, Some(10)), "[█████░░░░░] 5/10");
        assert_eq!(format_stock_bar(0, 10, Some(10)), "[░░░░░░░░░░] 0/10");
        assert_eq!(format_stock_bar(15, 10, Some(4)), "[████] 15/10");
        assert_eq!(format_stock_bar(3, 0, Some(4)), "[████] 3/-");
    }
}
