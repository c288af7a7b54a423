//! `shopledger-shop` — the shop's own profile (one document per shop).

pub mod profile;

pub use profile::{ProfileUpdate, ShopProfile};
