//! Cart - line items of the sale in progress.
//!
//! The cart is pure state: it never talks to the backend. Stock admission is the
//! register's job; by the time [`Cart::add`] is called the quantity has been approved.
//! The total is derived on every read and never stored.

use super::{Product, RecordId};
use crate::errors::{Error, Result};

/// One product's entry in the sale. Name, price and barcode are snapshots taken when the
/// product was first added.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    /// Product this line refers to
    pub product_id: RecordId,
    /// Display name at add time
    pub name: String,
    /// Unit price at add time
    pub unit_price: f64,
    /// Barcode used for the stock decrement on finalize
    pub barcode: String,
    /// Units being sold, always positive
    pub quantity: u32,
}

impl CartLine {
    /// `unit_price × quantity`
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Ordered line items; at most one line per product.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Line for a product, if present.
    #[must_use]
    pub fn line(&self, product_id: &RecordId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    /// Units of a product already in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: &RecordId) -> u32 {
        self.line(product_id).map_or(0, |line| line.quantity)
    }

    /// Σ(unit price × quantity) over all lines.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Increments the product's line by `quantity`, or appends a new line.
    pub fn add(&mut self, product: &Product, quantity: u32) -> &CartLine {
        if let Some(index) = self
            .lines
            .iter()
            .position(|line| line.product_id == product.id)
        {
            let line = &mut self.lines[index];
            line.quantity = line.quantity.saturating_add(quantity);
            return &self.lines[index];
        }

        self.lines.push(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            barcode: product.barcode.clone(),
            quantity,
        });
        &self.lines[self.lines.len() - 1]
    }

    /// Sets a line's quantity. Zero or negative removes the line.
    ///
    /// Returns `false` if the product was not in the cart.
    ///
    /// # Errors
    /// [`Error::Validation`] on `quantity` when it does not fit a cart line.
    pub fn set_quantity(&mut self, product_id: &RecordId, quantity: i64) -> Result<bool> {
        if quantity <= 0 {
            return Ok(self.remove(product_id).is_some());
        }
        let quantity = u32::try_from(quantity).map_err(|_| Error::validation(["quantity"]))?;
        Ok(match self
            .lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
        {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        })
    }

    /// Quantity edit from free text.
    ///
    /// Only the leading integer counts, so `"2.5"` is 2 and `"3 uds"` is 3. Text with no
    /// leading digits removes the line.
    ///
    /// # Errors
    /// [`Error::Validation`] on `quantity` when the number is too large.
    pub fn set_quantity_input(&mut self, product_id: &RecordId, raw: &str) -> Result<bool> {
        let Some(digits) = integer_prefix(raw) else {
            return Ok(self.remove(product_id).is_some());
        };
        match digits.parse::<i64>() {
            Ok(quantity) => self.set_quantity(product_id, quantity),
            Err(_) if digits.starts_with('-') => Ok(self.remove(product_id).is_some()),
            Err(_) => Err(Error::validation(["quantity"])),
        }
    }

    /// Drops a product's line.
    pub fn remove(&mut self, product_id: &RecordId) -> Option<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|line| &line.product_id == product_id)?;
        Some(self.lines.remove(index))
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Optional sign followed by the leading run of ASCII digits, if there is one.
fn integer_prefix(raw: &str) -> Option<&str> {
    let trimmed = raw.trim_start();
    let sign = usize::from(trimmed.starts_with(['-', '+']));
    let digits = trimmed[sign..].bytes().take_while(u8::is_ascii_digit).count();
    (digits > 0).then(|| &trimmed[..sign + digits])
}

/// Currency for display; amounts are only rounded here.
#[must_use]
pub fn format_money(amount: f64) -> String {
    format!("${amount:.2}")
}
