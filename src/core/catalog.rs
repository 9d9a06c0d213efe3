//! Catalog cache - local snapshot of the products for scan lookups.
//!
//! Scans resolve against this snapshot without a backend round trip. The snapshot is
//! replaced wholesale on every refresh. When the backend cannot be reached the cache
//! falls back to a small built-in sample so the register stays usable; that state is
//! flagged through [`CatalogSource::Sample`] and logged.

use super::{
    Product, RecordId,
    matcher::{MatchMode, find_product},
};
use crate::backend::{Backend, ListQuery};
use tracing::{info, instrument, warn};

/// Page size used to fill the cache.
pub const DEFAULT_CATALOG_PAGE_SIZE: u64 = 200;

/// Where the cached products came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    /// Never refreshed
    Unloaded,
    /// Read from the backend
    Live,
    /// Built-in demo data after a failed refresh
    Sample,
}

/// In-memory product snapshot owned by one register.
#[derive(Clone, Debug)]
pub struct CatalogCache {
    products: Vec<Product>,
    source: CatalogSource,
    page_size: u64,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG_PAGE_SIZE)
    }
}

impl CatalogCache {
    /// Empty cache that reads `page_size` products per refresh.
    #[must_use]
    pub const fn new(page_size: u64) -> Self {
        Self {
            products: Vec::new(),
            source: CatalogSource::Unloaded,
            page_size,
        }
    }

    /// Cached products in backend order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Origin of the current snapshot.
    #[must_use]
    pub const fn source(&self) -> CatalogSource {
        self.source
    }

    /// Whether the snapshot is demo data rather than live records.
    #[must_use]
    pub fn is_sample(&self) -> bool {
        self.source == CatalogSource::Sample
    }

    /// Resolves `query` against the snapshot.
    #[must_use]
    pub fn find(&self, query: &str, mode: MatchMode) -> Option<&Product> {
        find_product(&self.products, query, mode)
    }

    /// Replaces the snapshot with the first page of products from the backend.
    ///
    /// Never fails: on a backend error the built-in sample is loaded instead.
    #[instrument(skip(self, backend), fields(page_size = self.page_size))]
    pub async fn refresh<B: Backend>(&mut self, backend: &B) -> CatalogSource {
        match backend
            .list_products(1, self.page_size, &ListQuery::default())
            .await
        {
            Ok(page) => {
                self.products = page.items;
                self.source = CatalogSource::Live;
                info!("Catalog cache refreshed with {} products", self.products.len());
            }
            Err(e) => {
                warn!(error = %e, "Catalog refresh failed, using built-in sample data");
                self.products = sample_products();
                self.source = CatalogSource::Sample;
            }
        }
        self.source
    }
}

/// Demo products used when the backend is unreachable.
#[must_use]
pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: RecordId::from("1"),
            name: "Coca Cola 600ml".to_string(),
            barcode: "12345".to_string(),
            price: 15.50,
            stock: 10,
            cost: None,
        },
        Product {
            id: RecordId::from("2"),
            name: "Sabritas 45g".to_string(),
            barcode: "67890".to_string(),
            price: 12.00,
            stock: 5,
            cost: None,
        },
    ]
}
