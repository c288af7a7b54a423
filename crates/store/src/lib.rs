//! `shopledger-store` — the in-memory transactional document store.
//!
//! This crate owns committed state and the transaction engine; the domain
//! crates stay storage-agnostic. The bill lifecycle (the one multi-document
//! write path) lives here too, in [`BillingService`].

pub mod billing;
pub mod error;
pub mod memory;
pub mod sequence;
pub mod tx;


pub use billing::BillingService;
pub use error::{OperationError, StoreError};
pub use memory::MemoryStore;
pub use sequence::{SequenceKind, format_number};
pub use tx::Tx;
