//! Sales register - cart admission and stock reconciliation.
//!
//! A [`SalesRegister`] owns one sale session: the catalog snapshot used for scans, the cart,
//! and the last upsell hint. Adding a product re-reads the product's stock from the backend
//! before admitting it. Finalizing walks the cart in order and decrements each product's
//! stock with its own backend write, awaiting each before the next.
//!
//! Finalize is not a transaction. A line that fails does not undo lines that already
//! succeeded; the outcome reports every line so the operator can reconcile by hand.
//!
//! ```text
//!  Empty ──add──▶ Building ──finalize──▶ Completed | Partial ──▶ Empty
//!                    │   └────────────▶ AllFailed (cart kept) ──▶ Building
//!                    └──cancel──▶ Empty
//! ```

use super::{
    Product, RecordId,
    cart::{Cart, CartLine, format_money},
    catalog::{CatalogCache, CatalogSource},
    matcher::MatchMode,
    product::find_by_barcode,
    suggestion::upsell_for,
};
use crate::{
    backend::{Backend, PRODUCTS},
    core::ProductPatch,
    errors::{Error, Result},
};
use tracing::{debug, error, info, instrument, warn};

/// Interactive yes/no gate in front of destructive register actions.
#[allow(async_fn_in_trait)]
pub trait ConfirmationGate {
    /// Asks the operator; `true` proceeds.
    async fn confirm(&mut self, prompt: &str) -> bool;
}

/// Gate with a fixed answer, for unattended use.
#[derive(Clone, Copy, Debug)]
pub struct AutoConfirm(pub bool);

impl ConfirmationGate for AutoConfirm {
    async fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

/// Whether a sale is being built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterState {
    /// No lines
    Empty,
    /// At least one line
    Building,
}

/// Result of one line's stock decrement.
#[derive(Debug)]
pub struct LineResult {
    /// Product the line refers to
    pub product_id: RecordId,
    /// Display name of the line
    pub name: String,
    /// New stock on success
    pub outcome: Result<i64>,
}

impl LineResult {
    /// Whether the decrement was applied.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// What `finalize` did.
#[derive(Debug)]
pub enum FinalizeOutcome {
    /// Nothing to finalize
    EmptyCart,
    /// The operator declined at the confirmation prompt
    Declined,
    /// Every line was decremented; cart cleared and catalog refreshed
    Completed {
        /// Per-line results in cart order
        results: Vec<LineResult>,
    },
    /// Some lines failed; cart cleared anyway, successful lines stay applied
    Partial {
        /// Per-line results in cart order
        results: Vec<LineResult>,
    },
    /// No line could be decremented; cart kept as it was
    AllFailed {
        /// Per-line results in cart order
        results: Vec<LineResult>,
    },
}

impl FinalizeOutcome {
    /// Per-line results, empty when no backend call was made.
    #[must_use]
    pub fn results(&self) -> &[LineResult] {
        match self {
            Self::EmptyCart | Self::Declined => &[],
            Self::Completed { results } | Self::Partial { results } | Self::AllFailed { results } => {
                results.as_slice()
            }
        }
    }

    /// Number of lines whose decrement was applied.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results().iter().filter(|r| r.succeeded()).count()
    }

    /// Names of the lines that failed, in cart order.
    #[must_use]
    pub fn failed_names(&self) -> Vec<&str> {
        self.results()
            .iter()
            .filter(|r| !r.succeeded())
            .map(|r| r.name.as_str())
            .collect()
    }

    /// One-line summary for the operator.
    #[must_use]
    pub fn summary(&self) -> String {
        let total = self.results().len();
        match self {
            Self::EmptyCart => "Cart is empty, nothing to finalize.".to_string(),
            Self::Declined => "Sale not finalized.".to_string(),
            Self::Completed { .. } => {
                format!("Sale completed. Stock updated for {total} products.")
            }
            Self::Partial { .. } => format!(
                "Sale partially completed. Updated {}/{total} products. Failed: {}",
                self.succeeded(),
                self.failed_names().join(", ")
            ),
            Self::AllFailed { .. } => {
                "Stock could not be updated for any product. The cart was kept.".to_string()
            }
        }
    }
}

/// One register's sale session over a backend.
#[derive(Debug)]
pub struct SalesRegister<B> {
    backend: B,
    catalog: CatalogCache,
    cart: Cart,
    suggestion: Option<String>,
}

impl<B: Backend> SalesRegister<B> {
    /// A register with an empty cart and an unloaded catalog.
    pub fn new(backend: B, catalog_page_size: u64) -> Self {
        Self {
            backend,
            catalog: CatalogCache::new(catalog_page_size),
            cart: Cart::new(),
            suggestion: None,
        }
    }

    /// Loads the catalog snapshot; call when the register screen opens.
    pub async fn open(&mut self) -> CatalogSource {
        self.catalog.refresh(&self.backend).await
    }

    /// Current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Catalog snapshot used for scans.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// Latest upsell hint.
    #[must_use]
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    /// Running total.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cart.total()
    }

    /// Whether a sale is being built.
    #[must_use]
    pub fn state(&self) -> RegisterState {
        if self.cart.is_empty() {
            RegisterState::Empty
        } else {
            RegisterState::Building
        }
    }

    /// Adds one unit of the product whose barcode equals `code`.
    ///
    /// # Errors
    /// [`Error::NotFound`] if no cached product has that barcode, otherwise the errors of
    /// [`SalesRegister::add_to_cart`].
    pub async fn scan(&mut self, code: &str) -> Result<&CartLine> {
        let product = self.lookup(code, MatchMode::Exact)?;
        self.add_to_cart(&product, 1).await
    }

    /// Adds one unit of the first product whose barcode equals, or name contains, `term`.
    ///
    /// # Errors
    /// Same as [`SalesRegister::scan`].
    pub async fn search_and_add(&mut self, term: &str) -> Result<&CartLine> {
        let product = self.lookup(term, MatchMode::Loose)?;
        self.add_to_cart(&product, 1).await
    }

    fn lookup(&self, query: &str, mode: MatchMode) -> Result<Product> {
        self.catalog
            .find(query, mode)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                collection: PRODUCTS.to_string(),
                id: query.trim().to_string(),
            })
    }

    /// Admits `quantity` units of `product` after checking the backend's current stock.
    ///
    /// # Errors
    /// - [`Error::Validation`] for a zero quantity
    /// - [`Error::InsufficientStock`] when cart quantity plus `quantity` exceeds stock
    /// - any backend error from the stock read; the cart is unchanged in every error case
    #[instrument(skip(self, product), fields(product = %product.name))]
    pub async fn add_to_cart(&mut self, product: &Product, quantity: u32) -> Result<&CartLine> {
        if quantity == 0 {
            return Err(Error::validation(["quantity"]));
        }

        let available = find_by_barcode(&self.backend, &product.barcode)
            .await
            .inspect_err(|e| warn!(error = %e, "Stock check failed"))?
            .ok_or_else(|| Error::NotFound {
                collection: PRODUCTS.to_string(),
                id: product.barcode.clone(),
            })?
            .stock;

        let needed = i64::from(self.cart.quantity_of(&product.id)) + i64::from(quantity);
        if needed > available {
            debug!(available, needed, "Rejected by stock pre-check");
            return Err(Error::InsufficientStock {
                product: product.name.clone(),
                available,
                requested: needed,
            });
        }

        self.suggestion = Some(upsell_for(&product.name));
        Ok(self.cart.add(product, quantity))
    }

    /// Sets a line's quantity without re-checking stock. Zero or negative removes the line.
    ///
    /// # Errors
    /// [`Error::Validation`] when the quantity is too large for a cart line.
    pub fn set_quantity(&mut self, product_id: &RecordId, quantity: i64) -> Result<bool> {
        self.cart.set_quantity(product_id, quantity)
    }

    /// Quantity edit from free text; text without a leading number removes the line.
    ///
    /// # Errors
    /// [`Error::Validation`] when the number is too large for a cart line.
    pub fn set_quantity_input(&mut self, product_id: &RecordId, raw: &str) -> Result<bool> {
        self.cart.set_quantity_input(product_id, raw)
    }

    /// Drops a line.
    pub fn remove_line(&mut self, product_id: &RecordId) -> Option<CartLine> {
        self.cart.remove(product_id)
    }

    /// Commits the sale's stock decrements, one line at a time in cart order.
    #[instrument(skip(self, gate), fields(lines = self.cart.len()))]
    pub async fn finalize<G: ConfirmationGate>(&mut self, gate: &mut G) -> FinalizeOutcome {
        if self.cart.is_empty() {
            return FinalizeOutcome::EmptyCart;
        }

        let prompt = format!(
            "Finalize sale for {}? Stock will be updated for {} products.",
            format_money(self.total()),
            self.cart.len()
        );
        if !gate.confirm(&prompt).await {
            return FinalizeOutcome::Declined;
        }

        let mut results = Vec::with_capacity(self.cart.len());
        for line in self.cart.lines() {
            let outcome = decrement_stock(&self.backend, line).await;
            match &outcome {
                Ok(stock) => debug!(product = %line.name, stock, "Stock decremented"),
                Err(e) => error!(product = %line.name, error = %e, "Stock decrement failed"),
            }
            results.push(LineResult {
                product_id: line.product_id.clone(),
                name: line.name.clone(),
                outcome,
            });
        }

        let succeeded = results.iter().filter(|r| r.succeeded()).count();
        if succeeded == results.len() {
            self.cart.clear();
            self.suggestion = Some("Sale completed. Stock updated.".to_string());
            self.catalog.refresh(&self.backend).await;
            info!(lines = succeeded, "Sale completed");
            FinalizeOutcome::Completed { results }
        } else if succeeded > 0 {
            // Applied decrements are kept; the cart goes regardless.
            self.cart.clear();
            warn!(succeeded, total = results.len(), "Sale partially completed");
            FinalizeOutcome::Partial { results }
        } else {
            warn!("No stock decrement succeeded, cart kept");
            FinalizeOutcome::AllFailed { results }
        }
    }

    /// Abandons the sale. An empty cart returns `false` without asking.
    pub async fn cancel<G: ConfirmationGate>(&mut self, gate: &mut G) -> bool {
        if self.cart.is_empty() {
            return false;
        }
        if !gate.confirm("Cancel the sale?").await {
            return false;
        }
        self.cart.clear();
        self.suggestion = Some("Sale cancelled.".to_string());
        info!("Sale cancelled");
        true
    }
}

/// Re-reads the authoritative stock and writes `stock - quantity` with a guard on the
/// value just read.
async fn decrement_stock<B: Backend>(backend: &B, line: &CartLine) -> Result<i64> {
    if line.barcode.trim().is_empty() {
        return Err(Error::validation(["barcode"]));
    }

    let product = find_by_barcode(backend, &line.barcode)
        .await?
        .ok_or_else(|| Error::NotFound {
            collection: PRODUCTS.to_string(),
            id: line.barcode.clone(),
        })?;

    let quantity = i64::from(line.quantity);
    let new_stock = product.stock - quantity;
    if new_stock < 0 {
        return Err(Error::InsufficientStock {
            product: line.name.clone(),
            available: product.stock,
            requested: quantity,
        });
    }

    backend
        .update_product(&product.id, ProductPatch::guarded_stock(new_stock, product.stock))
        .await?;
    Ok(new_stock)
}
