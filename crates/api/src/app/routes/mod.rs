use axum::{routing::get, Router};

pub mod bills;
pub mod common;
pub mod dues;
pub mod invoices;
pub mod kits;
pub mod products;
pub mod shop;
pub mod suppliers;
pub mod system;
pub mod users;

/// Router for all authenticated (shop-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/shop", get(shop::get_profile).put(shop::update_profile))
        .nest("/products", products::router())
        .nest("/kits", kits::router())
        .nest("/suppliers", suppliers::router())
        .nest("/invoices", invoices::router())
        .nest("/bills", bills::router())
        .nest("/dues", dues::router())
        .nest("/users", users::router())
}
