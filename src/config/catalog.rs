//! Seed catalog from the `[[productos]]` entries of config.toml.
//!
//! Entries accept both the backend's Spanish field names and the English ones. Seeding is
//! idempotent: a product whose barcode already exists is left alone.

use crate::{
    backend::Backend,
    core::{ProductDraft, product},
    errors::Result,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// One `[[productos]]` entry.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Display name
    #[serde(alias = "nombre")]
    pub name: String,
    /// Barcode
    #[serde(alias = "codigo_de_barras", alias = "codigo")]
    pub barcode: String,
    /// Sale price
    #[serde(alias = "precio")]
    pub price: f64,
    /// Initial stock
    #[serde(default)]
    pub stock: i64,
    /// Acquisition cost
    #[serde(default, alias = "precio_costo", alias = "costo")]
    pub cost: Option<f64>,
}

impl From<CatalogEntry> for ProductDraft {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            name: entry.name,
            barcode: entry.barcode,
            price: entry.price,
            stock: entry.stock,
            cost: entry.cost,
        }
    }
}

/// Creates the configured products that are not in the backend yet.
///
/// Returns how many were created.
///
/// # Errors
/// Returns the first backend or validation error.
#[instrument(skip(backend, entries), fields(entries = entries.len()))]
pub async fn seed_catalog<B: Backend>(backend: &B, entries: &[CatalogEntry]) -> Result<usize> {
    let mut created = 0;
    for entry in entries {
        if product::find_by_barcode(backend, &entry.barcode)
            .await?
            .is_some()
        {
            debug!(barcode = %entry.barcode, "Seed product already present");
            continue;
        }
        product::create_product(backend, ProductDraft::from(entry.clone())).await?;
        created += 1;
    }
    if created > 0 {
        info!(created, "Seeded catalog from config");
    }
    Ok(created)
}
