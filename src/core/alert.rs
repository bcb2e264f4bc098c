//! Alert classification - Derives how urgently a product needs attention.
//!
//! Alert levels are computed on demand from a product snapshot and are never stored.
//! Stock exhaustion always wins over expiration: a product that is both empty and
//! expired is reported as out of stock. All functions here are pure; "now" and the
//! warning window are passed in by the caller.

use crate::entities::product;
use chrono::{DateTime, NaiveDate, Utc};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Derived urgency of a product, lowest to highest priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertLevel {
    /// Nothing to report
    None,
    /// Within the expiration warning window
    ExpiringSoon,
    /// At or below the reorder threshold, but not empty
    LowStock,
    /// Expiration date has passed
    Expired,
    /// No units left
    OutOfStock,
}

impl AlertLevel {
    /// Sort key for alert lists: out of stock 4, expired 3, low stock 2, expiring 1, none 0.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::None => 0,
            Self::ExpiringSoon => 1,
            Self::LowStock => 2,
            Self::Expired => 3,
            Self::OutOfStock => 4,
        }
    }

    /// Short label used in listings and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "OK",
            Self::ExpiringSoon => "Expiring soon",
            Self::LowStock => "Low stock",
            Self::Expired => "Expired",
            Self::OutOfStock => "Out of stock",
        }
    }

    /// Emoji marker for chat output.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::None => "🟢",
            Self::ExpiringSoon => "🟡",
            Self::LowStock => "🟠",
            Self::Expired | Self::OutOfStock => "🔴",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A product paired with its current alert level.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductAlert {
    /// The product snapshot that was classified
    pub product: product::Model,
    /// Its alert level at classification time
    pub level: AlertLevel,
}

/// Whole days from `now` until the start (UTC midnight) of `expiration`.
///
/// The millisecond difference is divided by one day and rounded up, so any moment
/// during the day before expiration counts as 1 and any moment during the expiration
/// day itself counts as 0. Negative results mean the date has passed.
#[must_use]
pub fn days_until_expiration(expiration: NaiveDate, now: DateTime<Utc>) -> i64 {
    let expires_at = expiration.and_time(chrono::NaiveTime::MIN).and_utc();
    let diff_millis = (expires_at - now).num_milliseconds();

    let days = diff_millis / MILLIS_PER_DAY;
    if diff_millis % MILLIS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

/// Classifies a product snapshot.
///
/// Rules, first match wins:
/// 1. `stock == 0` is [`AlertLevel::OutOfStock`]
/// 2. `stock <= min_stock` is [`AlertLevel::LowStock`]
/// 3. with an expiration date, fewer than 0 days left is [`AlertLevel::Expired`] and at
///    most `warning_days` left is [`AlertLevel::ExpiringSoon`]
/// 4. otherwise [`AlertLevel::None`]
#[must_use]
pub fn classify(product: &product::Model, now: DateTime<Utc>, warning_days: i64) -> AlertLevel {
    if product.stock <= 0 {
        return AlertLevel::OutOfStock;
    }

    if product.stock <= product.min_stock {
        return AlertLevel::LowStock;
    }

    if let Some(expiration) = product.expiration_date {
        let days = days_until_expiration(expiration, now);
        if days < 0 {
            return AlertLevel::Expired;
        }
        if days <= warning_days {
            return AlertLevel::ExpiringSoon;
        }
    }

    AlertLevel::None
}

/// Classifies every product and returns those needing attention, most urgent first.
///
/// Products with equal priority keep their input order.
#[must_use]
pub fn collect_alerts(
    products: &[product::Model],
    now: DateTime<Utc>,
    warning_days: i64,
) -> Vec<ProductAlert> {
    let mut alerts: Vec<ProductAlert> = products
        .iter()
        .map(|p| ProductAlert {
            level: classify(p, now, warning_days),
            product: p.clone(),
        })
        .filter(|alert| alert.level != AlertLevel::None)
        .collect();

    alerts.sort_by(|a, b| b.level.priority().cmp(&a.level.priority()));
    alerts
}
