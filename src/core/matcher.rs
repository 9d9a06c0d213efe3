//! Matcher - resolves scanned or typed input against the catalog snapshot.

use super::Product;

/// How a query is compared with products.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    /// Barcode equality only (scanner input)
    Exact,
    /// Barcode equality or name substring (manual search)
    Loose,
}

/// First product in `products` matching `query`, ignoring case and surrounding whitespace.
///
/// No ranking: iteration order breaks ties. Blank queries never match.
#[must_use]
pub fn find_product<'a>(products: &'a [Product], query: &str, mode: MatchMode) -> Option<&'a Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    products.iter().find(|product| {
        product.barcode.to_lowercase() == needle
            || (mode == MatchMode::Loose && product.name.to_lowercase().contains(&needle))
    })
}
