//! Screen commands organized by screen.

/// Navigation, login, help and dashboard
pub mod general;

/// Catalog management on `/productos`
pub mod product;

/// Stock view, corrections and deliveries on `/inventario`
pub mod inventory;

/// Sales register on `/ventas`
pub mod sales;

use crate::errors::{Error, Result};

/// Error for a word that is not a command on the current screen.
pub(crate) fn unknown(command: &str) -> Error {
    Error::NotFound {
        collection: "commands".to_string(),
        id: command.to_string(),
    }
}

/// Parses a 1-based row number as shown in listings.
pub(crate) fn parse_row(raw: &str, rows: usize) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(row) if (1..=rows).contains(&row) => Ok(row - 1),
        _ => Err(Error::validation(["row"])),
    }
}

/// Parses a money amount, accepting a leading `$` and a decimal comma.
pub(crate) fn parse_amount(raw: &str, field: &str) -> Result<f64> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', ".");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| Error::validation([field]))
}

/// Parses a whole number of units.
pub(crate) fn parse_units(raw: &str, field: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::validation([field]))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_row_is_one_based() {
        assert_eq!(parse_row("1", 3).ok(), Some(0));
        assert_eq!(parse_row(" 3 ", 3).ok(), Some(2));
        assert!(parse_row("0", 3).is_err());
        assert!(parse_row("4", 3).is_err());
        assert!(parse_row("x", 3).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$15.50", "price").ok(), Some(15.5));
        assert_eq!(parse_amount("12,5", "price").ok(), Some(12.5));
        assert!(parse_amount("NaN", "price").is_err());
        assert!(parse_amount("", "price").is_err());
    }
}
