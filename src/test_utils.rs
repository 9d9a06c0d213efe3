//! Shared test utilities for `KioskoSmart`.
//!
//! This module provides helpers for setting up an in-memory backend, seeding products with
//! sensible defaults, and a [`FaultyBackend`] wrapper that simulates an unreachable backend
//! or a competing register.

use crate::{
    backend::{AuthSession, Backend, ListQuery, RecordPage, SeaOrmBackend},
    core::{Product, ProductDraft, ProductPatch, RecordId, product},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;

/// Installs a test-friendly tracing subscriber. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("kiosko_smart=debug")
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Bundled backend over a fresh in-memory database.
pub async fn setup_backend() -> Result<SeaOrmBackend> {
    Ok(SeaOrmBackend::new(setup_test_db().await?))
}

/// Creates a test product.
///
/// # Defaults
/// * `cost`: None
pub async fn create_test_product<B: Backend>(
    backend: &B,
    name: &str,
    barcode: &str,
    price: f64,
    stock: i64,
) -> Result<Product> {
    let draft = ProductDraft {
        name: name.to_string(),
        barcode: barcode.to_string(),
        price,
        stock,
        cost: None,
    };
    product::create_product(backend, draft).await
}

/// Seeds the two products every register test works with, in this order:
/// `Coca Cola 600ml` (12345, $15.50, 10 units) and `Sabritas 45g` (67890, $12.00, 5 units).
pub async fn seed_sample_catalog<B: Backend>(backend: &B) -> Result<(Product, Product)> {
    let coca = create_test_product(backend, "Coca Cola 600ml", "12345", 15.5, 10).await?;
    let chips = create_test_product(backend, "Sabritas 45g", "67890", 12.0, 5).await?;
    Ok((coca, chips))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fault {
    /// Every call fails as if the network were down
    Offline,
    /// Another register writes the product just before each guarded update
    Racing,
}

/// Backend wrapper that injects failures in front of a working backend.
#[derive(Clone, Debug)]
pub struct FaultyBackend<B> {
    inner: B,
    fault: Fault,
}

impl<B: Backend> FaultyBackend<B> {
    /// Every call fails with [`Error::Network`].
    pub const fn offline(inner: B) -> Self {
        Self {
            inner,
            fault: Fault::Offline,
        }
    }

    /// Guarded stock updates lose a race: one unit is sold elsewhere right before the write.
    pub const fn racing(inner: B) -> Self {
        Self {
            inner,
            fault: Fault::Racing,
        }
    }

    fn check(&self) -> Result<()> {
        match self.fault {
            Fault::Offline => Err(Error::Network("connection refused".to_string())),
            Fault::Racing => Ok(()),
        }
    }
}

impl<B: Backend> Backend for FaultyBackend<B> {
    async fn authenticate(&self, identity: &str, secret: &str) -> Result<AuthSession> {
        self.check()?;
        self.inner.authenticate(identity, secret).await
    }

    async fn list_products(
        &self,
        page: u64,
        per_page: u64,
        query: &ListQuery,
    ) -> Result<RecordPage<Product>> {
        self.check()?;
        self.inner.list_products(page, per_page, query).await
    }

    async fn get_product(&self, id: &RecordId) -> Result<Product> {
        self.check()?;
        self.inner.get_product(id).await
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product> {
        self.check()?;
        self.inner.create_product(draft).await
    }

    async fn update_product(&self, id: &RecordId, patch: ProductPatch) -> Result<Product> {
        self.check()?;
        if self.fault == Fault::Racing {
            if let Some(expected) = patch.if_stock {
                let competing = ProductPatch {
                    stock: Some(expected - 1),
                    ..ProductPatch::default()
                };
                self.inner.update_product(id, competing).await?;
            }
        }
        self.inner.update_product(id, patch).await
    }

    async fn delete_product(&self, id: &RecordId) -> Result<()> {
        self.check()?;
        self.inner.delete_product(id).await
    }
}
