//! Transaction queries - Read access to the stock movement audit trail.
//!
//! Transactions are written only by the write-off workflow and removed only when their
//! product is deleted, so this module is read-only. Listings are ordered newest first.

use crate::{
    entities::{Transaction, transaction},
    errors::Result,
};
use sea_orm::{QueryOrder, QuerySelect, prelude::*};

/// Retrieves the transactions recorded against a product, newest first.
pub async fn get_transactions_for_product(
    db: &DatabaseConnection,
    product_id: i64,
    limit: Option<u64>,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::ProductId.eq(product_id))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the most recent transactions across all products, newest first.
///
/// `None` returns the whole history.
pub async fn get_recent_transactions(
    db: &DatabaseConnection,
    limit: Option<u64>,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific transaction by its unique ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::TransactionType;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_history_is_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let store = MemoryObjectStore::default();
        let product = create_test_product(&db, "SAND-20", 50).await?;
        let other = create_test_product(&db, "GRAVEL", 50).await?;

        write_off_test(&db, &store, product.id, 1).await?;
        write_off_test(&db, &store, other.id, 2).await?;
        write_off_test(&db, &store, product.id, 3).await?;

        let history = get_transactions_for_product(&db, product.id, None).await?;
        let quantities: Vec<i32> = history.iter().map(|t| t.quantity).collect();
        assert_eq!(quantities, vec![3, 1]);
        assert!(
            history
                .iter()
                .all(|t| t.transaction_type == TransactionType::Out)
        );

        let recent = get_recent_transactions(&db, Some(2)).await?;
        let quantities: Vec<i32> = recent.iter().map(|t| t.quantity).collect();
        assert_eq!(quantities, vec![3, 2]);

        assert_eq!(get_recent_transactions(&db, None).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_transaction_by_id() -> Result<()> {
        let db = setup_test_db().await?;
        let store = MemoryObjectStore::default();
        let product = create_test_product(&db, "SAND-20", 50).await?;
        let outcome = write_off_test(&db, &store, product.id, 5).await?;

        let found = get_transaction_by_id(&db, outcome.transaction.id)
            .await?
            .unwrap();
        assert_eq!(found, outcome.transaction);
        assert!(get_transaction_by_id(&db, 999).await?.is_none());
        Ok(())
    }
}
