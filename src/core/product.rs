//! Product catalog (crates, carriers, add-on services).
//!
//! Deletion is a soft flag so product messages that reference a retired SKU
//! keep resolving.

use crate::auth::Session;
use crate::core::access;
use crate::entities::{Product, ProductColumn, product};
use crate::errors::{Error, Result};
use sea_orm::{DatabaseConnection, QueryOrder, Set, prelude::*};

/// Creates a catalog product. Staff only.
pub async fn create_product(
    db: &DatabaseConnection,
    session: &Session,
    sku: String,
    name: String,
    price_cents: i64,
    description: Option<String>,
) -> Result<product::Model> {
    access::require_staff(session, "Creating products")?;

    if sku.trim().is_empty() || name.trim().is_empty() {
        return Err(Error::Config {
            message: "Product SKU and name cannot be empty".to_string(),
        });
    }
    if price_cents < 0 {
        return Err(Error::InvalidAmount {
            amount_cents: price_cents,
        });
    }

    let now = chrono::Utc::now();
    let product = product::ActiveModel {
        sku: Set(sku.trim().to_string()),
        name: Set(name.trim().to_string()),
        price_cents: Set(price_cents),
        description: Set(description),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Fetches one product, including soft-deleted ones.
pub async fn get_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Lists active products ordered by name.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(ProductColumn::IsDeleted.eq(false))
        .order_by_asc(ProductColumn::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates a product's name, price, or description. Staff only.
pub async fn update_product(
    db: &DatabaseConnection,
    session: &Session,
    product_id: i64,
    name: Option<String>,
    price_cents: Option<i64>,
    description: Option<String>,
) -> Result<product::Model> {
    access::require_staff(session, "Updating products")?;

    let product = get_product(db, product_id).await?;
    let mut active: product::ActiveModel = product.into();
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(Error::Config {
                message: "Product name cannot be empty".to_string(),
            });
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(price) = price_cents {
        if price < 0 {
            return Err(Error::InvalidAmount {
                amount_cents: price,
            });
        }
        active.price_cents = Set(price);
    }
    if let Some(description) = description {
        active.description = Set(Some(description));
    }
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Soft-deletes a product. Staff only.
pub async fn delete_product(
    db: &DatabaseConnection,
    session: &Session,
    product_id: i64,
) -> Result<product::Model> {
    access::require_staff(session, "Deleting products")?;

    let product = get_product(db, product_id).await?;
    let mut active: product::ActiveModel = product.into();
    active.is_deleted = Set(true);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}
