//! Replenishment - Picks the products that need reordering and how many to buy.
//!
//! A product needs reordering when `stock <= min_stock`. The suggested order restocks to
//! twice the threshold: `max(min_stock * 2 - stock, 0)`.

use crate::entities::product;

/// One line of a suggested purchase order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderLine {
    /// The product to reorder
    pub product: product::Model,
    /// Units to order
    pub suggested_quantity: i32,
}

/// Whether a product is at or below its reorder threshold.
#[must_use]
pub const fn needs_reorder(product: &product::Model) -> bool {
    product.stock <= product.min_stock
}

/// Units needed to bring a product back to twice its reorder threshold.
#[must_use]
pub fn suggested_quantity(product: &product::Model) -> i32 {
    product
        .min_stock
        .saturating_mul(2)
        .saturating_sub(product.stock)
        .max(0)
}

/// Selects every product that needs reordering, most critical (lowest stock) first.
///
/// Products with equal stock keep their input order.
#[must_use]
pub fn select_for_reorder(products: &[product::Model]) -> Vec<ReorderLine> {
    let mut lines: Vec<ReorderLine> = products
        .iter()
        .filter(|p| needs_reorder(p))
        .map(|p| ReorderLine {
            suggested_quantity: suggested_quantity(p),
            product: p.clone(),
        })
        .collect();

    lines.sort_by_key(|line| line.product.stock);
    lines
}
