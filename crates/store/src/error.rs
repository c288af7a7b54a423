use thiserror::Error;

use shopledger_core::DomainError;

/// Storage-engine failure (as opposed to a domain rejection).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A writer panicked while holding the lock; state may be inconsistent.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Error of a store-backed operation: either the domain said no, or the
/// engine itself failed.
///
/// Keeping [`DomainError`] intact (rather than flattening its variants) lets
/// the HTTP layer map rejections to status codes without string matching.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
