//! `shopledger-invoicing` — supplier (purchase) invoices.

pub mod invoice;

pub use invoice::{Invoice, InvoiceLine, InvoicePatch, NewInvoice};
