//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout of this folder:
//! - `services.rs`: store wiring plus the transactional write paths behind
//!   each mutating route
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `extract.rs`: request-body extraction under the error contract
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(jwt_secret: String) -> Router {
    let codec = Arc::new(shopledger_auth::Hs256TokenCodec::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { codec };

    let services = Arc::new(services::build_services());

    // Protected routes: require auth + shop context.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
