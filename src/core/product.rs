//! Product catalog - canonical product types and catalog management operations.
//!
//! [`Product`] is the single typed shape used by every screen and by the sales register.
//! Backend field names never leak past `backend::adapter`. The functions here back the
//! catalog screen (list, show, create, edit, delete); all of them go through the
//! [`Backend`] collaborator, which is the authority that validates payloads.

use crate::{
    backend::{Backend, ListQuery, ProductFilter, RecordPage, SortOrder},
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument};

/// Opaque record identifier assigned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Wraps a backend id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A product as seen by the register and the catalog screens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Backend-assigned identifier
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Primary scan key, unique among products
    pub barcode: String,
    /// Sale unit price
    pub price: f64,
    /// Units available according to the last read; may be stale
    pub stock: i64,
    /// Acquisition cost, used by catalog and inventory screens only
    pub cost: Option<f64>,
}

/// Payload for creating a product.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDraft {
    /// Display name
    pub name: String,
    /// Barcode
    pub barcode: String,
    /// Sale unit price
    pub price: f64,
    /// Initial stock
    pub stock: i64,
    /// Acquisition cost
    pub cost: Option<f64>,
}

impl ProductDraft {
    /// Checks every field and reports all violations at once.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] naming each rejected field.
    pub fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();
        if self.name.trim().is_empty() {
            fields.push("name");
        }
        if self.barcode.trim().is_empty() {
            fields.push("barcode");
        }
        if !is_valid_amount(self.price) {
            fields.push("price");
        }
        if self.stock < 0 {
            fields.push("stock");
        }
        if self.cost.is_some_and(|cost| !is_valid_amount(cost)) {
            fields.push("cost");
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(fields))
        }
    }
}

/// Partial update for a product. `None` leaves the field unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductPatch {
    /// New display name
    pub name: Option<String>,
    /// New barcode
    pub barcode: Option<String>,
    /// New sale price
    pub price: Option<f64>,
    /// New stock level
    pub stock: Option<i64>,
    /// New acquisition cost
    pub cost: Option<f64>,
    /// Apply the update only if the stored stock still equals this value.
    pub if_stock: Option<i64>,
}

impl ProductPatch {
    /// Sets stock to `new_stock` provided the backend still holds `expected`.
    #[must_use]
    pub fn guarded_stock(new_stock: i64, expected: i64) -> Self {
        Self {
            stock: Some(new_stock),
            if_stock: Some(expected),
            ..Self::default()
        }
    }

    /// Checks the fields that are present.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] naming each rejected field.
    pub fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();
        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            fields.push("name");
        }
        if self
            .barcode
            .as_deref()
            .is_some_and(|barcode| barcode.trim().is_empty())
        {
            fields.push("barcode");
        }
        if self.price.is_some_and(|price| !is_valid_amount(price)) {
            fields.push("price");
        }
        if self.stock.is_some_and(|stock| stock < 0) {
            fields.push("stock");
        }
        if self.cost.is_some_and(|cost| !is_valid_amount(cost)) {
            fields.push("cost");
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(fields))
        }
    }
}

fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

/// Lists one page of the catalog, sorted by name.
///
/// # Errors
/// Returns an error if the backend cannot be reached.
#[instrument(skip(backend))]
pub async fn list_products<B: Backend>(
    backend: &B,
    page: u64,
    per_page: u64,
) -> Result<RecordPage<Product>> {
    let query = ListQuery {
        filter: None,
        sort: Some(SortOrder::NameAsc),
    };
    backend.list_products(page, per_page, &query).await
}

/// Lists products whose name contains `text`, lowest stock first.
///
/// # Errors
/// Returns an error if the backend cannot be reached.
#[instrument(skip(backend))]
pub async fn search_products<B: Backend>(
    backend: &B,
    text: &str,
    per_page: u64,
) -> Result<RecordPage<Product>> {
    let query = ListQuery {
        filter: Some(ProductFilter::NameContains(text.trim().to_string())),
        sort: Some(SortOrder::StockAsc),
    };
    backend.list_products(1, per_page, &query).await
}

/// Looks up the product carrying `barcode`, reading the backend rather than any cache.
///
/// # Errors
/// Returns an error if the backend cannot be reached.
pub async fn find_by_barcode<B: Backend>(backend: &B, barcode: &str) -> Result<Option<Product>> {
    let query = ListQuery {
        filter: Some(ProductFilter::Barcode(barcode.trim().to_string())),
        sort: None,
    };
    let page = backend.list_products(1, 1, &query).await?;
    Ok(page.items.into_iter().next())
}

/// Fetches a single product.
///
/// # Errors
/// Returns [`Error::NotFound`] for a stale id.
pub async fn get_product<B: Backend>(backend: &B, id: &RecordId) -> Result<Product> {
    backend.get_product(id).await
}

/// Creates a product after trimming its text fields.
///
/// # Errors
/// Returns [`Error::Validation`] if the backend rejects the payload.
#[instrument(skip(backend))]
pub async fn create_product<B: Backend>(backend: &B, draft: ProductDraft) -> Result<Product> {
    let draft = ProductDraft {
        name: draft.name.trim().to_string(),
        barcode: draft.barcode.trim().to_string(),
        ..draft
    };
    let product = backend.create_product(draft).await?;
    info!(id = %product.id, name = %product.name, "Product created");
    Ok(product)
}

/// Applies `patch` to an existing product.
///
/// # Errors
/// Returns [`Error::NotFound`] for a stale id or [`Error::Validation`] for a rejected patch.
#[instrument(skip(backend))]
pub async fn update_product<B: Backend>(
    backend: &B,
    id: &RecordId,
    patch: ProductPatch,
) -> Result<Product> {
    let patch = ProductPatch {
        name: patch.name.map(|name| name.trim().to_string()),
        barcode: patch.barcode.map(|barcode| barcode.trim().to_string()),
        ..patch
    };
    let product = backend.update_product(id, patch).await?;
    info!(id = %product.id, "Product updated");
    Ok(product)
}

/// Deletes a product.
///
/// # Errors
/// Returns [`Error::NotFound`] for a stale id.
#[instrument(skip(backend))]
pub async fn delete_product<B: Backend>(backend: &B, id: &RecordId) -> Result<()> {
    backend.delete_product(id).await?;
    info!(%id, "Product deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn draft(name: &str, barcode: &str, price: f64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            barcode: barcode.to_string(),
            price,
            stock: 5,
            cost: None,
        }
    }

    #[test]
    fn test_draft_validation_reports_every_field() {
        let bad = ProductDraft {
            name: "  ".to_string(),
            barcode: String::new(),
            price: -1.0,
            stock: -3,
            cost: Some(f64::NAN),
        };
        match bad.validate() {
            Err(Error::Validation { fields }) => {
                assert_eq!(fields, vec!["name", "barcode", "price", "stock", "cost"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(draft("Agua 1L", "555", 9.0).validate().is_ok());
    }

    #[test]
    fn test_patch_validation_ignores_absent_fields() {
        assert!(ProductPatch::default().validate().is_ok());
        let patch = ProductPatch {
            price: Some(f64::INFINITY),
            ..ProductPatch::default()
        };
        assert!(matches!(patch.validate(), Err(Error::Validation { fields }) if fields == ["price"]));
    }

    #[tokio::test]
    async fn test_create_and_get_product() -> Result<()> {
        let backend = setup_backend().await?;
        let created = create_product(&backend, draft("  Agua 1L ", " 555 ", 9.5)).await?;
        assert_eq!(created.name, "Agua 1L");
        assert_eq!(created.barcode, "555");

        let fetched = get_product(&backend, &created.id).await?;
        assert_eq!(fetched, created);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_barcode() -> Result<()> {
        let backend = setup_backend().await?;
        create_product(&backend, draft("Agua 1L", "555", 9.5)).await?;
        let result = create_product(&backend, draft("Agua 2L", "555", 15.0)).await;
        assert!(matches!(result, Err(Error::Validation { fields }) if fields == ["barcode"]));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_sorted_and_paged() -> Result<()> {
        let backend = setup_backend().await?;
        create_product(&backend, draft("Sabritas 45g", "67890", 12.0)).await?;
        create_product(&backend, draft("Agua 1L", "555", 9.5)).await?;
        create_product(&backend, draft("Coca Cola 600ml", "12345", 15.5)).await?;

        let first = list_products(&backend, 1, 2).await?;
        assert_eq!(first.total_items, 3);
        let names: Vec<_> = first.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Agua 1L", "Coca Cola 600ml"]);

        let second = list_products(&backend, 2, 2).await?;
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].name, "Sabritas 45g");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_fields() -> Result<()> {
        let backend = setup_backend().await?;
        let product = create_product(&backend, draft("Agua 1L", "555", 9.5)).await?;
        let patch = ProductPatch {
            name: Some("Agua Natural 1L".to_string()),
            price: Some(10.0),
            cost: Some(6.0),
            ..ProductPatch::default()
        };
        let updated = update_product(&backend, &product.id, patch).await?;
        assert_eq!(updated.name, "Agua Natural 1L");
        assert_eq!(updated.price, 10.0);
        assert_eq!(updated.cost, Some(6.0));
        assert_eq!(updated.stock, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_stale_id() -> Result<()> {
        let backend = setup_backend().await?;
        let product = create_product(&backend, draft("Agua 1L", "555", 9.5)).await?;
        delete_product(&backend, &product.id).await?;

        let update = update_product(&backend, &product.id, ProductPatch::default()).await;
        assert!(update.unwrap_err().is_not_found());
        let delete = delete_product(&backend, &product.id).await;
        assert!(delete.unwrap_err().is_not_found());
        let unknown = get_product(&backend, &RecordId::from("not-a-number")).await;
        assert!(unknown.unwrap_err().is_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn test_search_products_lowest_stock_first() -> Result<()> {
        let backend = setup_backend().await?;
        create_test_product(&backend, "Coca Cola 600ml", "12345", 15.5, 10).await?;
        create_test_product(&backend, "Coca Cola Light", "12346", 16.0, 2).await?;
        create_test_product(&backend, "Sabritas 45g", "67890", 12.0, 5).await?;

        let page = search_products(&backend, " coca ", 10).await?;
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Coca Cola Light", "Coca Cola 600ml"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_by_barcode() -> Result<()> {
        let backend = setup_backend().await?;
        let product = create_product(&backend, draft("Agua 1L", "555", 9.5)).await?;
        assert_eq!(find_by_barcode(&backend, " 555 ").await?, Some(product));
        assert_eq!(find_by_barcode(&backend, "999").await?, None);
        Ok(())
    }
}
