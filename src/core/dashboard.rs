//! Dashboard summary figures.
//!
//! The product count comes from the backend's listing total. The stock figures are computed
//! over the first page of products, the same page the inventory screen shows.

use super::product::list_products;
use crate::{backend::Backend, errors::Result};
use tracing::instrument;

/// Headline numbers for the dashboard.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardSummary {
    /// Products in the catalog
    pub product_count: u64,
    /// Products below the low-stock threshold
    pub low_stock_count: usize,
    /// Units on hand
    pub units_in_stock: i64,
    /// Σ price × stock at sale prices
    pub stock_value: f64,
}

/// Builds the dashboard figures.
///
/// # Errors
/// Returns an error if the backend cannot be reached.
#[instrument(skip(backend))]
pub async fn summary<B: Backend>(
    backend: &B,
    per_page: u64,
    low_stock_threshold: i64,
) -> Result<DashboardSummary> {
    let page = list_products(backend, 1, per_page).await?;

    let mut units_in_stock = 0;
    let mut stock_value = 0.0;
    for product in page.items.iter().filter(|p| p.stock > 0) {
        units_in_stock += product.stock;
        #[allow(clippy::cast_precision_loss)]
        let units = product.stock as f64;
        stock_value += product.price * units;
    }

    Ok(DashboardSummary {
        product_count: page.total_items,
        low_stock_count: page
            .items
            .iter()
            .filter(|p| p.stock < low_stock_threshold)
            .count(),
        units_in_stock,
        stock_value,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_summary_over_sample_catalog() -> Result<()> {
        let backend = setup_backend().await?;
        seed_sample_catalog(&backend).await?;
        let figures = summary(&backend, 100, 12).await?;
        assert_eq!(figures.product_count, 2);
        assert_eq!(figures.low_stock_count, 2);
        assert_eq!(figures.units_in_stock, 15);
        assert_eq!(figures.stock_value, 15.5 * 10.0 + 12.0 * 5.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_of_empty_catalog() -> Result<()> {
        let backend = setup_backend().await?;
        let figures = summary(&backend, 100, 12).await?;
        assert_eq!(figures.product_count, 0);
        assert_eq!(figures.stock_value, 0.0);
        Ok(())
    }
}
