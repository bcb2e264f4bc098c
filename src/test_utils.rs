//! Shared test utilities for Stock Buddy.
//!
//! This module provides common helper functions for setting up test databases,
//! building entity snapshots for pure logic tests, and in-memory object stores.

use crate::{
    core::{
        category,
        product::{self, NewProduct},
        writeoff::{self, WriteOffOutcome, WriteOffRequest},
    },
    entities::{self, ProductStatus},
    errors::{Error, Result},
    storage::{ObjectStore, Upload},
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a product snapshot without touching the database.
///
/// # Defaults
/// * `name`: `"Product {code}"`
/// * `stock` / `initial_stock`: 10
/// * `min_stock`: 2
/// * `price`: 1.0
/// * no category, no expiration date
#[must_use]
pub fn sample_product(id: i64, code: &str) -> entities::product::Model {
    let created = chrono::NaiveDate::from_ymd_opt(2026, 1, 1)
        .unwrap_or_default()
        .and_time(chrono::NaiveTime::MIN);
    entities::product::Model {
        id,
        code: code.to_string(),
        name: format!("Product {code}"),
        description: String::new(),
        category_id: None,
        unit: product::DEFAULT_UNIT.to_string(),
        price: 1.0,
        initial_stock: 10,
        stock: 10,
        min_stock: 2,
        expiration_date: None,
        status: ProductStatus::Active,
        location: None,
        supplier: None,
        brand: None,
        model_number: None,
        warranty: None,
        image_url: None,
        image_path: None,
        created_at: created,
        updated_at: created,
    }
}

/// Builds a category snapshot without touching the database.
#[must_use]
pub fn sample_category(id: i64, name: &str) -> entities::category::Model {
    entities::category::Model {
        id,
        name: name.to_string(),
        description: None,
    }
}

/// Product fields with sensible defaults for `create_product`.
///
/// # Defaults
/// * `price`: 1.0
/// * `initial_stock`: 10
/// * `min_stock`: 2
/// * `unit`: "Unit"
#[must_use]
pub fn new_product(code: &str, name: &str) -> NewProduct {
    NewProduct {
        code: code.to_string(),
        name: name.to_string(),
        unit: product::DEFAULT_UNIT.to_string(),
        price: 1.0,
        initial_stock: 10,
        min_stock: 2,
        ..NewProduct::default()
    }
}

/// Creates a test category with no description.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(db, name.to_string(), None).await
}

/// Creates a test product with the given code and opening stock.
pub async fn create_test_product(
    db: &DatabaseConnection,
    code: &str,
    stock: i32,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        NewProduct {
            initial_stock: stock,
            ..new_product(code, &format!("Product {code}"))
        },
    )
    .await
}

/// Sets up a complete test environment with one category.
/// Returns (db, category) for catalog tests.
pub async fn setup_with_category() -> Result<(DatabaseConnection, entities::category::Model)> {
    let db = setup_test_db().await?;
    let category = create_test_category(&db, "Test Category").await?;
    Ok((db, category))
}

/// Writes off `quantity` units with reason `"test"` on behalf of `test_user`.
pub async fn write_off_test<S>(
    db: &DatabaseConnection,
    store: &S,
    product_id: i64,
    quantity: i32,
) -> Result<WriteOffOutcome>
where
    S: ObjectStore + ?Sized,
{
    writeoff::process_write_off(
        db,
        store,
        WriteOffRequest::new(product_id, quantity, "test", "test_user"),
    )
    .await
}

/// A small PNG upload.
#[must_use]
pub fn png_upload(file_name: &str) -> Upload {
    Upload {
        file_name: file_name.to_string(),
        content_type: Some("image/png".to_string()),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

/// Object store that keeps everything in memory. URLs look like `memory://{bucket}/{path}`.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryObjectStore {
    /// Whether an object exists.
    pub fn contains(&self, bucket: &str, path: &str) -> bool {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(bucket.to_string(), path.to_string()))
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        _content_type: Option<&str>,
    ) -> Result<String> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((bucket.to_string(), path.to_string()), bytes.to_vec());
        Ok(format!("memory://{bucket}/{path}"))
    }

    async fn delete(&self, bucket: &str, path: &str) -> Result<()> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(bucket.to_string(), path.to_string()));
        Ok(())
    }
}

/// Object store whose every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingObjectStore;

#[async_trait]
impl ObjectStore for FailingObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        _path: &str,
        _bytes: &[u8],
        _content_type: Option<&str>,
    ) -> Result<String> {
        Err(Error::AttachmentUpload {
            message: format!("bucket '{bucket}' is unavailable"),
        })
    }

    async fn delete(&self, bucket: &str, _path: &str) -> Result<()> {
        Err(Error::AttachmentUpload {
            message: format!("bucket '{bucket}' is unavailable"),
        })
    }
}
