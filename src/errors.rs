//! Unified error types for `KioskoSmart`.
//!
//! Every backend call and every screen action returns [`Result`]. The variants follow the
//! failure taxonomy the register surfaces to the operator: bad credentials, stale record ids,
//! rejected payloads, insufficient stock and an unreachable backend.

use thiserror::Error;

/// Errors produced by the backend collaborator, the sales register and the screens.
#[derive(Debug, Error)]
pub enum Error {
    /// Identity/secret pair rejected by the backend.
    #[error("Invalid credentials")]
    AuthenticationFailure,

    /// A screen was opened without a valid session.
    #[error("No active session, please log in")]
    Unauthenticated,

    /// The record id no longer exists (stale id on edit/delete).
    #[error("Record '{id}' not found in '{collection}'")]
    NotFound {
        /// Backend collection name
        collection: String,
        /// Record id as given by the caller
        id: String,
    },

    /// Payload rejected; carries the offending field names.
    #[error("Invalid fields: {}", fields.join(", "))]
    Validation {
        /// Canonical names of the rejected fields
        fields: Vec<String>,
    },

    /// Requested quantity exceeds what the backend reports as available.
    #[error("Insufficient stock for '{product}': available {available}, needed {requested}")]
    InsufficientStock {
        /// Product display name
        product: String,
        /// Stock reported by the backend
        available: i64,
        /// Quantity that was needed
        requested: i64,
    },

    /// Stock changed between read and write; the conditional update was not applied.
    #[error("Stock for '{product}' changed during the update")]
    StockConflict {
        /// Product display name or id
        product: String,
    },

    /// Backend unreachable or returned something unusable.
    #[error("Backend unavailable: {0}")]
    Network(String),

    /// Storage error from the bundled backend.
    #[error("Database error: {0}")]
    Database(sea_orm::DbErr),

    /// An operator password could not be hashed.
    #[error("Password hashing failed: {0}")]
    Credential(String),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Terminal I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Builds a [`Error::Validation`] from field names.
    #[must_use]
    pub fn validation<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Validation {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the error came from the record being gone rather than from the request.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<sea_orm::DbErr> for Error {
    fn from(value: sea_orm::DbErr) -> Self {
        match value {
            sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) => {
                Self::Network(value.to_string())
            }
            other => Self::Database(other),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_lists_fields() {
        let err = Error::validation(["name", "price"]);
        assert_eq!(err.to_string(), "Invalid fields: name, price");
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = Error::InsufficientStock {
            product: "Coca Cola 600ml".to_string(),
            available: 1,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for 'Coca Cola 600ml': available 1, needed 2"
        );
        assert!(!err.is_not_found());
    }
}
