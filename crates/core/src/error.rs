//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation, dangling
/// references, stock rules). Storage concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced document does not exist. Carries a description of what
    /// was looked up (e.g. `product 0191…`).
    #[error("{0} not found")]
    NotFound(String),

    /// A conflict occurred (e.g. a uniqueness or referential rule).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A requested quantity exceeds the on-hand quantity. The message names
    /// the product and both quantities; callers rely on that.
    #[error("insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Authorization failure at the domain boundary.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn insufficient_stock(product: impl Into<String>, available: i64, requested: i64) -> Self {
        Self::InsufficientStock {
            product: product.into(),
            available,
            requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_product_and_quantities() {
        let err = DomainError::insufficient_stock("Sugar 1kg", 3, 5);
        let msg = err.to_string();
        assert!(msg.contains("Sugar 1kg"));
        assert!(msg.contains("available 3"));
        assert!(msg.contains("requested 5"));
    }

    #[test]
    fn not_found_message_names_the_reference() {
        let err = DomainError::not_found("kit 0191");
        assert_eq!(err.to_string(), "kit 0191 not found");
    }
}
