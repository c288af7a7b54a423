//! `shopledger-billing` — bills (customer sales) and customer dues.

pub mod bill;
pub mod due;

pub use bill::{Bill, LineItem, NewBill, PaymentStatus};
pub use due::{Due, DuePatch, NewDue};
