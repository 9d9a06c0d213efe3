//! Backend collaborator - the data/auth store the register is built on.
//!
//! Everything persistent (products, operators, credentials) lives behind [`Backend`].
//! Screens and the sales register only ever talk to this trait, so the store can be the
//! bundled [`SeaOrmBackend`] or any other implementation with the same contract.

pub mod adapter;
pub mod sea;

pub use sea::SeaOrmBackend;

use crate::{
    core::{Product, ProductDraft, ProductPatch, RecordId},
    errors::Result,
};
use serde::{Deserialize, Serialize};

/// Name of the products collection.
pub const PRODUCTS: &str = "productos";
/// Name of the operators collection.
pub const USERS: &str = "users";

/// Authenticated operator as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Backend-assigned identifier
    pub id: RecordId,
    /// Login name
    pub username: String,
    /// Display name
    pub name: String,
}

/// Result of a successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthSession {
    /// Opaque session token
    pub token: String,
    /// The operator the token belongs to
    pub user: AuthUser,
}

/// Record filter for product listings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProductFilter {
    /// Exact barcode
    Barcode(String),
    /// Case-insensitive substring of the name
    NameContains(String),
}

/// Listing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// Alphabetical by name
    NameAsc,
    /// Lowest stock first
    StockAsc,
}

/// Optional filter and sort for a listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Restrict the listing
    pub filter: Option<ProductFilter>,
    /// Order of the listing; insertion order when absent
    pub sort: Option<SortOrder>,
}

/// One page of a listing.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordPage<T> {
    /// Records on this page
    pub items: Vec<T>,
    /// Records matching the query across all pages
    pub total_items: u64,
    /// 1-based page number
    pub page: u64,
    /// Page size used
    pub per_page: u64,
}

/// Contract of the backend-as-a-service.
///
/// Every call is a suspension point; callers await them one at a time.
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// Exchanges an identity (username or email) and secret for a session.
    async fn authenticate(&self, identity: &str, secret: &str) -> Result<AuthSession>;

    /// Lists products, 1-based `page`.
    async fn list_products(
        &self,
        page: u64,
        per_page: u64,
        query: &ListQuery,
    ) -> Result<RecordPage<Product>>;

    /// Fetches one product.
    async fn get_product(&self, id: &RecordId) -> Result<Product>;

    /// Stores a new product.
    async fn create_product(&self, draft: ProductDraft) -> Result<Product>;

    /// Applies a partial update. When `patch.if_stock` is set the write only happens if the
    /// stored stock still equals it.
    async fn update_product(&self, id: &RecordId, patch: ProductPatch) -> Result<Product>;

    /// Removes a product.
    async fn delete_product(&self, id: &RecordId) -> Result<()>;
}
