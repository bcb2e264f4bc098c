//! Product business logic - Handles catalog operations on products.
//!
//! This module provides functions for creating, retrieving, updating, searching and
//! deleting products, plus attaching a product image through the object store. Stock
//! only goes down through the write-off workflow; edits here may correct it to an
//! absolute, non-negative value. Deleting a product also deletes its transactions.

use crate::{
    entities::{Category, Product, ProductStatus, Transaction, product, transaction},
    errors::{Error, Result},
    storage::{self, ObjectStore, Upload},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Unit label used when none is given
pub const DEFAULT_UNIT: &str = "Unit";

/// Fields for a new product.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    /// Unique code (SKU / barcode)
    pub code: String,
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Owning category
    pub category_id: Option<i64>,
    /// Unit label; empty means [`DEFAULT_UNIT`]
    pub unit: String,
    /// Unit price
    pub price: f64,
    /// Opening stock, also recorded as the baseline
    pub initial_stock: i32,
    /// Reorder threshold
    pub min_stock: i32,
    /// Expiration date for perishable items
    pub expiration_date: Option<NaiveDate>,
    /// Shelf / warehouse location
    pub location: Option<String>,
    /// Supplier name
    pub supplier: Option<String>,
    /// Brand
    pub brand: Option<String>,
    /// Manufacturer model designation
    pub model_number: Option<String>,
    /// Warranty description
    pub warranty: Option<String>,
}

/// Changes to apply to an existing product. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New category
    pub category_id: Option<i64>,
    /// New unit label
    pub unit: Option<String>,
    /// New unit price
    pub price: Option<f64>,
    /// Corrected absolute stock count
    pub stock: Option<i32>,
    /// New reorder threshold
    pub min_stock: Option<i32>,
    /// New expiration date
    pub expiration_date: Option<NaiveDate>,
    /// Remove the expiration date (applied before `expiration_date`)
    pub clear_expiration: bool,
    /// New lifecycle status
    pub status: Option<ProductStatus>,
    /// New location
    pub location: Option<String>,
    /// New supplier
    pub supplier: Option<String>,
    /// New brand
    pub brand: Option<String>,
    /// New model designation
    pub model_number: Option<String>,
    /// New warranty description
    pub warranty: Option<String>,
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(())
}

const fn validate_count(quantity: i32) -> Result<()> {
    if quantity < 0 {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(())
}

fn validate_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Config {
            message: format!("Product {field} cannot be empty"),
        });
    }
    Ok(())
}

async fn ensure_category_exists(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    Category::find_by_id(category_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| Error::CategoryNotFound {
            name: category_id.to_string(),
        })
}

/// Retrieves all products, ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a product by its code. Codes are matched exactly after trimming.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<product::Model>> {
    Product::find()
        .filter(product::Column::Code.eq(code.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Whether a product matches a search term on name, code or description (case-insensitive).
///
/// An empty term matches everything.
#[must_use]
pub fn matches_search(product: &product::Model, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    product.name.to_lowercase().contains(&term)
        || product.code.to_lowercase().contains(&term)
        || product.description.to_lowercase().contains(&term)
}

/// Lists products matching `term`, optionally restricted to one category, ordered by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn search_products(
    db: &DatabaseConnection,
    term: &str,
    category_id: Option<i64>,
) -> Result<Vec<product::Model>> {
    let mut query = Product::find().order_by_asc(product::Column::Name);
    if let Some(category_id) = category_id {
        query = query.filter(product::Column::CategoryId.eq(category_id));
    }
    let products = query.all(db).await?;

    Ok(products
        .into_iter()
        .filter(|p| matches_search(p, term))
        .collect())
}

/// Creates a new product after validating its fields.
///
/// `stock` starts at `initial_stock`. The code and name are trimmed.
///
/// # Errors
/// Returns an error if:
/// - The code or name is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
/// - The initial or minimum stock is negative
/// - The category does not exist
/// - Another product already uses the code
/// - The database insert operation fails
#[instrument(skip(db, new_product), fields(code = %new_product.code))]
pub async fn create_product(
    db: &DatabaseConnection,
    new_product: NewProduct,
) -> Result<product::Model> {
    validate_text("code", &new_product.code)?;
    validate_text("name", &new_product.name)?;
    validate_price(new_product.price)?;
    validate_count(new_product.initial_stock)?;
    validate_count(new_product.min_stock)?;

    if let Some(category_id) = new_product.category_id {
        ensure_category_exists(db, category_id).await?;
    }

    let code = new_product.code.trim().to_string();
    if get_product_by_code(db, &code).await?.is_some() {
        return Err(Error::DuplicateCode { code });
    }

    let unit = if new_product.unit.trim().is_empty() {
        DEFAULT_UNIT.to_string()
    } else {
        new_product.unit.trim().to_string()
    };
    let now = chrono::Utc::now().naive_utc();

    let product = product::ActiveModel {
        code: Set(code),
        name: Set(new_product.name.trim().to_string()),
        description: Set(new_product.description),
        category_id: Set(new_product.category_id),
        unit: Set(unit),
        price: Set(new_product.price),
        initial_stock: Set(new_product.initial_stock),
        stock: Set(new_product.initial_stock),
        min_stock: Set(new_product.min_stock),
        expiration_date: Set(new_product.expiration_date),
        status: Set(ProductStatus::Active),
        location: Set(new_product.location),
        supplier: Set(new_product.supplier),
        brand: Set(new_product.brand),
        model_number: Set(new_product.model_number),
        warranty: Set(new_product.warranty),
        image_url: Set(None),
        image_path: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = product.insert(db).await?;
    info!("Created product {} ({})", created.code, created.id);
    Ok(created)
}

/// Applies a [`ProductUpdate`] to an existing product and refreshes `updated_at`.
///
/// # Errors
/// Returns an error if:
/// - A new name is empty, a new price is invalid, or a stock figure is negative
/// - The new category does not exist
/// - The product does not exist
/// - The database update operation fails
#[instrument(skip(db, changes))]
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    changes: ProductUpdate,
) -> Result<product::Model> {
    if let Some(name) = &changes.name {
        validate_text("name", name)?;
    }
    if let Some(price) = changes.price {
        validate_price(price)?;
    }
    if let Some(stock) = changes.stock {
        validate_count(stock)?;
    }
    if let Some(min_stock) = changes.min_stock {
        validate_count(min_stock)?;
    }
    if let Some(category_id) = changes.category_id {
        ensure_category_exists(db, category_id).await?;
    }

    let mut product: product::ActiveModel = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })?
        .into();

    if let Some(name) = changes.name {
        product.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        product.description = Set(description);
    }
    if let Some(category_id) = changes.category_id {
        product.category_id = Set(Some(category_id));
    }
    if let Some(unit) = changes.unit {
        product.unit = Set(unit);
    }
    if let Some(price) = changes.price {
        product.price = Set(price);
    }
    if let Some(stock) = changes.stock {
        product.stock = Set(stock);
    }
    if let Some(min_stock) = changes.min_stock {
        product.min_stock = Set(min_stock);
    }
    if changes.clear_expiration {
        product.expiration_date = Set(None);
    }
    if let Some(expiration_date) = changes.expiration_date {
        product.expiration_date = Set(Some(expiration_date));
    }
    if let Some(status) = changes.status {
        product.status = Set(status);
    }
    if let Some(location) = changes.location {
        product.location = Set(Some(location));
    }
    if let Some(supplier) = changes.supplier {
        product.supplier = Set(Some(supplier));
    }
    if let Some(brand) = changes.brand {
        product.brand = Set(Some(brand));
    }
    if let Some(model_number) = changes.model_number {
        product.model_number = Set(Some(model_number));
    }
    if let Some(warranty) = changes.warranty {
        product.warranty = Set(Some(warranty));
    }
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Deletes a product together with all of its transactions, atomically.
///
/// Returns the deleted product so the caller can clean up its stored image.
///
/// # Errors
/// Returns an error if the product does not exist or a delete fails; in that case
/// nothing is removed.
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let txn = db.begin().await?;

    let product = get_product_by_id(&txn, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })?;

    let removed = Transaction::delete_many()
        .filter(transaction::Column::ProductId.eq(product_id))
        .exec(&txn)
        .await?;
    Product::delete_by_id(product_id).exec(&txn).await?;

    txn.commit().await?;
    info!(
        "Deleted product {} and {} transactions",
        product.code, removed.rows_affected
    );
    Ok(product)
}

/// Uploads a new image for a product and records its URL.
///
/// The image must be JPEG, PNG or WebP and at most 5 MiB. A previous image is removed
/// from the store after the new one is recorded; if recording fails, the new upload is
/// removed instead.
///
/// # Errors
/// Returns an error if the image is invalid, the product does not exist, the upload
/// fails, or the database update fails.
#[instrument(skip(db, store, upload), fields(file = %upload.file_name))]
pub async fn set_product_image<S>(
    db: &DatabaseConnection,
    store: &S,
    product_id: i64,
    upload: &Upload,
) -> Result<product::Model>
where
    S: ObjectStore + ?Sized,
{
    let extension = storage::validate_image(upload)?;

    let existing = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })?;

    let path = storage::product_image_path(
        product_id,
        chrono::Utc::now().timestamp_millis(),
        extension,
    );
    let url = store
        .upload(
            storage::PRODUCT_IMAGES_BUCKET,
            &path,
            &upload.bytes,
            upload.content_type.as_deref(),
        )
        .await
        .map_err(|e| Error::AttachmentUpload {
            message: e.to_string(),
        })?;
    debug!("Uploaded product image to {url}");

    let old_path = existing.image_path.clone();
    let mut product: product::ActiveModel = existing.into();
    product.image_url = Set(Some(url));
    product.image_path = Set(Some(path.clone()));
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = match product.update(db).await {
        Ok(updated) => updated,
        Err(e) => {
            warn!("Failed to record product image, removing upload: {e}");
            storage::delete_quietly(store, storage::PRODUCT_IMAGES_BUCKET, &path).await;
            return Err(e.into());
        }
    };

    if let Some(old_path) = old_path.filter(|old| *old != path) {
        storage::delete_quietly(store, storage::PRODUCT_IMAGES_BUCKET, &old_path).await;
    }

    Ok(updated)
}
