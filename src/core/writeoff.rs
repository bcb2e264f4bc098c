//! Write-off workflow - Removes stock and records why it left.
//!
//! A write-off moves through `Validating`, `Uploading`, `Mutating`, `Recording` and
//! `Committed`. The attachment is uploaded before the database transaction opens, so no
//! write lock is held while the object store is slow. The stock decrement and the
//! transaction insert share one database transaction, so either both are visible or
//! neither is. The decrement is a conditional update (`stock = stock - q WHERE stock >= q`),
//! which keeps concurrent write-offs against the same product from overselling.
//!
//! An attachment that fails to upload does not abort the write-off; the failure is
//! returned in [`WriteOffOutcome::attachment_error`] instead. An uploaded attachment is
//! removed again if the write-off is then rejected or rolled back.

use crate::{
    entities::{Product, TransactionType, product, transaction},
    errors::{Error, Result},
    storage::{self, ObjectStore, Upload},
};
use sea_orm::{DatabaseTransaction, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument, warn};

/// Stage of a write-off, used in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOffStage {
    /// Checking the request against the current product
    Validating,
    /// Storing the attachment, outside any database transaction
    Uploading,
    /// Decrementing stock
    Mutating,
    /// Inserting the transaction
    Recording,
    /// Changes are durable
    Committed,
}

impl std::fmt::Display for WriteOffStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validating => f.write_str("validating"),
            Self::Uploading => f.write_str("uploading"),
            Self::Mutating => f.write_str("mutating"),
            Self::Recording => f.write_str("recording"),
            Self::Committed => f.write_str("committed"),
        }
    }
}

/// A request to take units out of stock.
#[derive(Debug, Clone)]
pub struct WriteOffRequest {
    /// Product to write off
    pub product_id: i64,
    /// Units to remove, must be positive
    pub quantity: i32,
    /// Why the units left (damage, consumption, dispatch, ...)
    pub reason: String,
    /// Extra detail appended to the reason as `reason: notes`
    pub notes: Option<String>,
    /// Acting user
    pub user: String,
    /// Where the units went
    pub destination: Option<String>,
    /// Who received them
    pub receiver: Option<String>,
    /// Supporting document
    pub attachment: Option<Upload>,
}

impl WriteOffRequest {
    /// Creates a request with no optional details.
    #[must_use]
    pub fn new(
        product_id: i64,
        quantity: i32,
        reason: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            product_id,
            quantity,
            reason: reason.into(),
            notes: None,
            user: user.into(),
            destination: None,
            receiver: None,
            attachment: None,
        }
    }

    /// Reason as stored on the transaction, with notes appended when present.
    #[must_use]
    pub fn full_reason(&self) -> String {
        let reason = self.reason.trim();
        match self.notes.as_deref().map(str::trim) {
            Some(notes) if !notes.is_empty() => format!("{reason}: {notes}"),
            _ => reason.to_string(),
        }
    }
}

/// Result of a committed write-off.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOffOutcome {
    /// The recorded stock movement
    pub transaction: transaction::Model,
    /// The product after the decrement
    pub product: product::Model,
    /// Why the attachment could not be stored, if one was supplied and failed
    pub attachment_error: Option<String>,
}

struct StoredAttachment {
    path: String,
    url: String,
}

fn validate_request(request: &WriteOffRequest) -> Result<()> {
    if request.quantity <= 0 {
        return Err(Error::InvalidQuantity {
            quantity: request.quantity,
        });
    }
    if request.reason.trim().is_empty() {
        return Err(Error::Config {
            message: "A write-off needs a reason".to_string(),
        });
    }
    Ok(())
}

async fn find_product<C: ConnectionTrait>(conn: &C, product_id: i64) -> Result<product::Model> {
    Product::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })
}

/// Decrements stock only if enough is on hand. Returns the number of rows changed.
async fn decrement_stock_atomic(
    txn: &DatabaseTransaction,
    product_id: i64,
    quantity: i32,
) -> Result<u64> {
    let result = Product::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(quantity),
        )
        .col_expr(
            product::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::Stock.gte(quantity))
        .exec(txn)
        .await?;
    Ok(result.rows_affected)
}

async fn store_attachment<S>(
    store: &S,
    product_id: i64,
    upload: &Upload,
) -> Result<StoredAttachment>
where
    S: ObjectStore + ?Sized,
{
    let path = storage::attachment_path(
        product_id,
        chrono::Utc::now().timestamp_millis(),
        &upload.file_name,
    );
    let url = store
        .upload(
            storage::WRITEOFF_ATTACHMENTS_BUCKET,
            &path,
            &upload.bytes,
            upload.content_type.as_deref(),
        )
        .await?;
    Ok(StoredAttachment { path, url })
}

/// Decrements stock and inserts the movement in one database transaction.
///
/// Dropping the transaction on an early return rolls it back.
async fn record_write_off(
    db: &DatabaseConnection,
    product: &product::Model,
    request: &WriteOffRequest,
    stored: Option<&StoredAttachment>,
) -> Result<(transaction::Model, product::Model)> {
    let txn = db.begin().await?;

    debug!(stage = %WriteOffStage::Mutating);
    if decrement_stock_atomic(&txn, product.id, request.quantity).await? == 0 {
        // Someone else took the stock between the read and the update
        let current = find_product(&txn, product.id).await?;
        return Err(Error::InsufficientStock {
            available: current.stock,
            requested: request.quantity,
        });
    }
    let updated = find_product(&txn, product.id).await?;

    debug!(stage = %WriteOffStage::Recording);
    let attachment = stored.and(request.attachment.as_ref());
    let record = transaction::ActiveModel {
        product_id: Set(product.id),
        product_name: Set(product.name.clone()),
        transaction_type: Set(TransactionType::Out),
        quantity: Set(request.quantity),
        date: Set(chrono::Utc::now()),
        reason: Set(request.full_reason()),
        user: Set(request.user.clone()),
        destination: Set(request.destination.clone().filter(|d| !d.trim().is_empty())),
        receiver: Set(request.receiver.clone().filter(|r| !r.trim().is_empty())),
        attachment_name: Set(attachment.map(|a| a.file_name.clone())),
        attachment_url: Set(stored.map(|s| s.url.clone())),
        attachment_type: Set(attachment.and_then(|a| a.content_type.clone())),
        attachment_size: Set(attachment.and_then(|a| i64::try_from(a.size()).ok())),
        ..Default::default()
    };
    let recorded = record.insert(&txn).await?;
    txn.commit().await?;
    Ok((recorded, updated))
}

/// Writes off `request.quantity` units of a product.
///
/// # Errors
/// - `Error::InvalidQuantity` if the quantity is zero or negative
/// - `Error::Config` if the reason is blank
/// - `Error::ProductNotFound` if the product does not exist
/// - `Error::InsufficientStock` if fewer units are on hand than requested, including
///   when a concurrent write-off took them first
/// - `Error::Database` if persisting fails; nothing is changed in that case and any
///   uploaded attachment is removed
#[instrument(skip(db, store, request), fields(product_id = request.product_id, quantity = request.quantity))]
pub async fn process_write_off<S>(
    db: &DatabaseConnection,
    store: &S,
    request: WriteOffRequest,
) -> Result<WriteOffOutcome>
where
    S: ObjectStore + ?Sized,
{
    debug!(stage = %WriteOffStage::Validating);
    validate_request(&request)?;
    let product = find_product(db, request.product_id).await?;
    if request.quantity > product.stock {
        return Err(Error::InsufficientStock {
            available: product.stock,
            requested: request.quantity,
        });
    }

    debug!(stage = %WriteOffStage::Uploading);
    let mut attachment_error = None;
    let stored = match &request.attachment {
        Some(upload) => match store_attachment(store, product.id, upload).await {
            Ok(stored) => Some(stored),
            Err(e) => {
                warn!("Attachment upload failed, continuing without it: {e}");
                attachment_error = Some(e.to_string());
                None
            }
        },
        None => None,
    };

    let committed = record_write_off(db, &product, &request, stored.as_ref()).await;
    let (recorded, updated) = match committed {
        Ok(committed) => committed,
        Err(e) => {
            warn!("Write-off not recorded: {e}");
            if let Some(stored) = &stored {
                storage::delete_quietly(store, storage::WRITEOFF_ATTACHMENTS_BUCKET, &stored.path)
                    .await;
            }
            return Err(e);
        }
    };

    info!(
        stage = %WriteOffStage::Committed,
        "Wrote off {} x {} ({} left) by {}",
        recorded.quantity, updated.code, updated.stock, recorded.user
    );

    Ok(WriteOffOutcome {
        transaction: recorded,
        product: updated,
        attachment_error,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::entities::Transaction;
    use crate::test_utils::*;
    use async_trait::async_trait;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use std::{sync::Arc, time::Duration};
    use tokio::sync::Notify;

    /// Object store whose uploads wait until the test releases them.
    #[derive(Default)]
    struct GatedObjectStore {
        inner: MemoryObjectStore,
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ObjectStore for GatedObjectStore {
        async fn upload(
            &self,
            bucket: &str,
            path: &str,
            bytes: &[u8],
            content_type: Option<&str>,
        ) -> Result<String> {
            self.started.notify_one();
            self.release.notified().await;
            self.inner.upload(bucket, path, bytes, content_type).await
        }

        async fn delete(&self, bucket: &str, path: &str) -> Result<()> {
            self.inner.delete(bucket, path).await
        }
    }

    async fn transaction_count(db: &DatabaseConnection) -> Result<u64> {
        Transaction::find().count(db).await.map_err(Into::into)
    }

    #[test]
    fn test_full_reason() {
        let mut request = WriteOffRequest::new(1, 1, " Damaged ", "1001");
        assert_eq!(request.full_reason(), "Damaged");
        request.notes = Some("dropped from forklift".to_string());
        assert_eq!(request.full_reason(), "Damaged: dropped from forklift");
        request.notes = Some("  ".to_string());
        assert_eq!(request.full_reason(), "Damaged");
    }

    #[tokio::test]
    async fn test_write_off_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let store = MemoryObjectStore::default();

        let result = process_write_off(&db, &store, WriteOffRequest::new(1, 0, "test", "u")).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: 0 }
        ));

        let result = process_write_off(&db, &store, WriteOffRequest::new(1, -2, "test", "u")).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: -2 }
        ));

        let result = process_write_off(&db, &store, WriteOffRequest::new(1, 1, "  ", "u")).await;
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_write_off_success() -> Result<()> {
        let db = setup_test_db().await?;
        let store = MemoryObjectStore::default();
        let product = create_test_product(&db, "PIPE-PVC", 10).await?;

        let mut request = WriteOffRequest::new(product.id, 4, "test", "1001");
        request.destination = Some("Site B".to_string());
        request.receiver = Some(String::new());
        let outcome = process_write_off(&db, &store, request).await?;

        assert_eq!(outcome.product.stock, 6);
        assert_eq!(outcome.attachment_error, None);

        let tx = &outcome.transaction;
        assert_eq!(tx.quantity, 4);
        assert_eq!(tx.transaction_type, TransactionType::Out);
        assert_eq!(tx.product_id, product.id);
        assert_eq!(tx.product_name, product.name);
        assert_eq!(tx.reason, "test");
        assert_eq!(tx.user, "1001");
        assert_eq!(tx.destination.as_deref(), Some("Site B"));
        assert_eq!(tx.receiver, None);
        assert_eq!(tx.attachment_url, None);

        let stored = Product::find_by_id(product.id).one(&db).await?.unwrap();
        assert_eq!(stored.stock, 6);
        assert_eq!(stored.initial_stock, 10);
        assert_eq!(transaction_count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_off_entire_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let store = MemoryObjectStore::default();
        let product = create_test_product(&db, "PIPE-PVC", 10).await?;

        let outcome =
            process_write_off(&db, &store, WriteOffRequest::new(product.id, 10, "sold", "u")).await?;
        assert_eq!(outcome.product.stock, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_off_insufficient_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let store = MemoryObjectStore::default();
        let product = create_test_product(&db, "PIPE-PVC", 10).await?;

        let result =
            process_write_off(&db, &store, WriteOffRequest::new(product.id, 11, "test", "u")).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock {
                available: 10,
                requested: 11
            }
        ));

        let stored = Product::find_by_id(product.id).one(&db).await?.unwrap();
        assert_eq!(stored.stock, 10);
        assert_eq!(transaction_count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_off_unknown_product() -> Result<()> {
        let db = setup_test_db().await?;
        let store = MemoryObjectStore::default();

        let result = process_write_off(&db, &store, WriteOffRequest::new(42, 1, "test", "u")).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ProductNotFound { id } if id == "42"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_write_off_with_attachment() -> Result<()> {
        let db = setup_test_db().await?;
        let store = MemoryObjectStore::default();
        let product = create_test_product(&db, "PIPE-PVC", 10).await?;

        let mut request = WriteOffRequest::new(product.id, 2, "Dispatch", "1001");
        request.attachment = Some(Upload {
            file_name: "delivery note.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: vec![1, 2, 3, 4],
        });
        let outcome = process_write_off(&db, &store, request).await?;

        let tx = &outcome.transaction;
        assert_eq!(tx.attachment_name.as_deref(), Some("delivery note.pdf"));
        assert_eq!(tx.attachment_type.as_deref(), Some("application/pdf"));
        assert_eq!(tx.attachment_size, Some(4));
        let url = tx.attachment_url.clone().unwrap();
        assert!(url.starts_with("memory://writeoff-attachments/writeoffs/"));
        assert!(url.ends_with("_delivery_note.pdf"));
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_attachment_failure_still_commits() -> Result<()> {
        let db = setup_test_db().await?;
        let store = FailingObjectStore;
        let product = create_test_product(&db, "PIPE-PVC", 10).await?;

        let mut request = WriteOffRequest::new(product.id, 3, "Damaged", "1001");
        request.attachment = Some(png_upload("evidence.png"));
        let outcome = process_write_off(&db, &store, request).await?;

        assert!(outcome.attachment_error.is_some());
        assert_eq!(outcome.transaction.attachment_url, None);
        assert_eq!(outcome.transaction.attachment_name, None);
        assert_eq!(outcome.product.stock, 7);
        assert_eq!(transaction_count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_insert_removes_attachment() {
        let product = sample_product(1, "PIPE-PVC");
        let after = product::Model {
            stock: product.stock - 1,
            ..product.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![product.clone()], vec![after]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_exec_errors([DbErr::Custom("disk full".to_string())])
            .into_connection();
        let store = MemoryObjectStore::default();

        let mut request = WriteOffRequest::new(product.id, 1, "Damaged", "1001");
        request.attachment = Some(png_upload("evidence.png"));
        let result = process_write_off(&db, &store, request).await;

        assert!(matches!(result.unwrap_err(), Error::Database(_)));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_lost_race_removes_attachment() {
        let product = sample_product(1, "PIPE-PVC");
        let drained = product::Model {
            stock: 0,
            ..product.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![product.clone()], vec![drained]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let store = MemoryObjectStore::default();

        let mut request = WriteOffRequest::new(product.id, 5, "Damaged", "1001");
        request.attachment = Some(png_upload("evidence.png"));
        let result = process_write_off(&db, &store, request).await;

        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock {
                available: 0,
                requested: 5
            }
        ));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_upload_does_not_block_other_write_offs() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("stock.db").display());
        let db = Arc::new(sea_orm::Database::connect(url).await?);
        crate::config::database::create_tables(&db).await?;
        let documented = create_test_product(&db, "PIPE-PVC", 10).await?;
        let other = create_test_product(&db, "CEM-50", 10).await?;
        let store = Arc::new(GatedObjectStore::default());

        let pending = {
            let db = Arc::clone(&db);
            let store = Arc::clone(&store);
            let mut request = WriteOffRequest::new(documented.id, 1, "Dispatch", "1001");
            request.attachment = Some(png_upload("delivery.png"));
            tokio::spawn(async move { process_write_off(&db, store.as_ref(), request).await })
        };
        store.started.notified().await;

        let quick = tokio::time::timeout(
            Duration::from_secs(2),
            write_off_test(&db, store.as_ref(), other.id, 1),
        )
        .await
        .expect("write-off on another product waited for the upload")?;
        assert_eq!(quick.product.stock, 9);

        store.release.notify_one();
        let documented_outcome = pending.await.unwrap()?;
        assert_eq!(documented_outcome.product.stock, 9);
        assert!(documented_outcome.transaction.attachment_url.is_some());
        assert_eq!(transaction_count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_write_offs_never_oversell() -> Result<()> {
        let db = Arc::new(setup_test_db().await?);
        let store = Arc::new(MemoryObjectStore::default());
        let product = create_test_product(&db, "PIPE-PVC", 10).await?;
        let product_id = product.id;

        let handles: Vec<_> = (0..3)
            .map(|i| {
                let db = Arc::clone(&db);
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let request = WriteOffRequest::new(product_id, 4, "test", format!("user{i}"));
                    process_write_off(&db, store.as_ref(), request).await
                })
            })
            .collect();

        let mut succeeded = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(Error::InsufficientStock { requested: 4, .. }) => rejected += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(succeeded, 2);
        assert_eq!(rejected, 1);
        let stored = Product::find_by_id(product.id).one(&*db).await?.unwrap();
        assert_eq!(stored.stock, 2);
        assert_eq!(transaction_count(&db).await?, 2);
        Ok(())
    }
}
