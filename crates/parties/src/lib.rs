//! `shopledger-parties` — external parties the shop trades with (suppliers).

pub mod supplier;

pub use supplier::{ContactInfo, NewSupplier, Supplier, SupplierPatch};
