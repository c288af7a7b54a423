//! Bearer-token gate in front of every protected route.
//!
//! Failures are bare `401`s with no JSON body. On success the request gains
//! [`ShopContext`] and [`PrincipalContext`] extensions for the handlers
//! downstream.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use shopledger_auth::{Hs256TokenCodec, validate_claims};

use crate::context::{PrincipalContext, ShopContext};

#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<Hs256TokenCodec>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    // decode checks signature and expiry (with leeway); validate_claims
    // re-checks the time window exactly.
    let claims = state.codec.decode(token).map_err(|err| {
        tracing::debug!(error = %err, "rejected bearer token");
        StatusCode::UNAUTHORIZED
    })?;
    validate_claims(&claims, Utc::now()).map_err(|_| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(ShopContext::new(claims.shop_id));
    req.extensions_mut()
        .insert(PrincipalContext::new(claims.sub, claims.roles));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
