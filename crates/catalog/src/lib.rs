//! `shopledger-catalog` — the sellable catalog: products and kits.

pub mod kit;
pub mod product;

pub use kit::{Kit, KitComponent, KitPatch, NewKit};
pub use product::{NewProduct, Product, ProductPatch};
