//! Inventory - stock levels, manual corrections and incoming stock.
//!
//! The inventory screen lists products with a low-stock flag and allows a manual stock
//! correction (breakage, counting errors). Incoming deliveries are collected in a
//! [`StockIntake`] receiving list, by scanning codes one at a time or by pasting a batch,
//! and committed to the backend line by line.

use super::{
    Product, ProductPatch, RecordId,
    matcher::{MatchMode, find_product},
    product::{get_product, list_products, update_product},
    register::LineResult,
};
use crate::{
    backend::{Backend, PRODUCTS},
    errors::{Error, Result},
};
use chrono::NaiveDateTime;
use tracing::{info, instrument, warn};

/// Products below this stock are flagged.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 12;

/// One row of the inventory view.
#[derive(Clone, Debug, PartialEq)]
pub struct InventoryRow {
    /// The product
    pub product: Product,
    /// `stock < threshold`
    pub low_stock: bool,
}

/// First page of products with their low-stock flags.
///
/// # Errors
/// Returns an error if the backend cannot be reached.
#[instrument(skip(backend))]
pub async fn inventory_rows<B: Backend>(
    backend: &B,
    per_page: u64,
    low_stock_threshold: i64,
) -> Result<Vec<InventoryRow>> {
    let page = list_products(backend, 1, per_page).await?;
    Ok(page
        .items
        .into_iter()
        .map(|product| InventoryRow {
            low_stock: product.stock < low_stock_threshold,
            product,
        })
        .collect())
}

/// Overwrites a product's stock after a physical count.
///
/// # Errors
/// [`Error::Validation`] for a negative stock, [`Error::NotFound`] for a stale id.
#[instrument(skip(backend))]
pub async fn adjust_stock<B: Backend>(
    backend: &B,
    id: &RecordId,
    new_stock: i64,
) -> Result<Product> {
    if new_stock < 0 {
        return Err(Error::validation(["stock"]));
    }
    let patch = ProductPatch {
        stock: Some(new_stock),
        ..ProductPatch::default()
    };
    let product = update_product(backend, id, patch).await?;
    info!(product = %product.name, stock = new_stock, "Stock adjusted manually");
    Ok(product)
}

/// A product being received.
#[derive(Clone, Debug, PartialEq)]
pub struct IntakeLine {
    /// Product receiving stock
    pub product_id: RecordId,
    /// Display name
    pub name: String,
    /// Barcode
    pub barcode: String,
    /// Unit acquisition cost for this delivery, `None` while unknown
    pub cost: Option<f64>,
    /// Units received, at least 1
    pub quantity: u32,
}

/// Outcome of feeding a batch of codes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Non-empty codes read
    pub processed: usize,
    /// Codes that matched no product
    pub not_found: Vec<String>,
}

/// Receiving list for one delivery.
#[derive(Clone, Debug)]
pub struct StockIntake {
    provider: String,
    received_at: NaiveDateTime,
    lines: Vec<IntakeLine>,
}

impl StockIntake {
    /// Empty receiving list for `provider`, stamped now.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            received_at: chrono::Local::now().naive_local(),
            lines: Vec::new(),
        }
    }

    /// Supplier of the delivery.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// When the receiving list was opened.
    #[must_use]
    pub const fn received_at(&self) -> NaiveDateTime {
        self.received_at
    }

    /// Lines in the order they were first scanned.
    #[must_use]
    pub fn lines(&self) -> &[IntakeLine] {
        &self.lines
    }

    /// Whether nothing has been scanned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Σ cost × quantity. Lines without a cost count as zero.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.lines
            .iter()
            .map(|line| line.cost.unwrap_or(0.0) * f64::from(line.quantity))
            .sum()
    }

    /// Adds `quantity` units of `product`, merging with an existing line.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product.id)
        {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }
        self.lines.push(IntakeLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            barcode: product.barcode.clone(),
            cost: product.cost,
            quantity: quantity.max(1),
        });
    }

    /// Resolves one code (barcode or name fragment) and adds a unit.
    ///
    /// # Errors
    /// [`Error::NotFound`] if nothing matches.
    pub fn scan(&mut self, products: &[Product], code: &str) -> Result<()> {
        let product = find_product(products, code, MatchMode::Loose).ok_or_else(|| {
            Error::NotFound {
                collection: PRODUCTS.to_string(),
                id: code.trim().to_string(),
            }
        })?;
        self.add(product, 1);
        Ok(())
    }

    /// Feeds one code per line; blank lines are skipped.
    pub fn process_batch(&mut self, products: &[Product], text: &str) -> BatchReport {
        let mut report = BatchReport::default();
        for code in text.lines().map(str::trim).filter(|code| !code.is_empty()) {
            report.processed += 1;
            if self.scan(products, code).is_err() {
                report.not_found.push(code.to_string());
            }
        }
        report
    }

    /// Sets a line's quantity; anything below 1 becomes 1.
    pub fn set_quantity(&mut self, product_id: &RecordId, quantity: i64) -> bool {
        let quantity = u32::try_from(quantity.max(1)).unwrap_or(u32::MAX);
        let Some(line) = self.line_mut(product_id) else {
            return false;
        };
        line.quantity = quantity;
        true
    }

    /// Sets a line's unit cost; invalid amounts become 0.
    pub fn set_cost(&mut self, product_id: &RecordId, cost: f64) -> bool {
        let cost = if cost.is_finite() && cost >= 0.0 {
            cost
        } else {
            0.0
        };
        let Some(line) = self.line_mut(product_id) else {
            return false;
        };
        line.cost = Some(cost);
        true
    }

    /// Drops a line.
    pub fn remove(&mut self, product_id: &RecordId) -> Option<IntakeLine> {
        let index = self
            .lines
            .iter()
            .position(|line| &line.product_id == product_id)?;
        Some(self.lines.remove(index))
    }

    fn line_mut(&mut self, product_id: &RecordId) -> Option<&mut IntakeLine> {
        self.lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
    }

    /// Adds every line's quantity to the backend stock and records its cost.
    ///
    /// A line whose cost is still unknown leaves the product's cost untouched.
    ///
    /// Lines are written one at a time; each failure is reported on its line.
    ///
    /// # Errors
    /// [`Error::Validation`] if the list is empty.
    #[instrument(skip(self, backend), fields(provider = %self.provider, lines = self.lines.len()))]
    pub async fn commit<B: Backend>(self, backend: &B) -> Result<Vec<LineResult>> {
        if self.lines.is_empty() {
            return Err(Error::validation(["items"]));
        }

        let mut results = Vec::with_capacity(self.lines.len());
        for line in self.lines {
            let outcome = receive_line(backend, &line).await;
            if let Err(e) = &outcome {
                warn!(product = %line.name, error = %e, "Stock intake line failed");
            }
            results.push(LineResult {
                product_id: line.product_id,
                name: line.name,
                outcome,
            });
        }
        info!(
            received = results.iter().filter(|r| r.succeeded()).count(),
            "Stock intake committed"
        );
        Ok(results)
    }
}

async fn receive_line<B: Backend>(backend: &B, line: &IntakeLine) -> Result<i64> {
    let product = get_product(backend, &line.product_id).await?;
    let new_stock = product.stock + i64::from(line.quantity);
    let patch = ProductPatch {
        stock: Some(new_stock),
        cost: line.cost,
        if_stock: Some(product.stock),
        ..ProductPatch::default()
    };
    update_product(backend, &product.id, patch).await?;
    Ok(new_stock)
}
