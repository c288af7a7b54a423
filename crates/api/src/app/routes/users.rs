use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shopledger_auth::{NewUser, Permission, UserPatch};
use shopledger_core::UserId;

use crate::app::extract::ApiJson;
use crate::app::routes::common::OpAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", get(get_user).patch(update_user))
        .route("/:id/disable", post(disable_user))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    ApiJson(body): ApiJson<dto::CreateUserRequest>,
) -> axum::response::Response {
    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("users.create")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let input = NewUser {
        email: auth.inner.email,
        display_name: auth.inner.display_name,
        roles: auth.inner.roles,
    };

    match services.create_user(shop.shop_id(), input) {
        Ok(user) => (StatusCode::CREATED, Json(dto::user_to_json(user))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
) -> axum::response::Response {
    let users = match services.store.list_users(shop.shop_id()) {
        Ok(users) => users,
        Err(e) => return errors::store_error_to_response(e),
    };
    let items = users.into_iter().map(dto::user_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    match services.store.get_user(shop.shop_id(), id) {
        Ok(Some(user)) => (StatusCode::OK, Json(dto::user_to_json(user))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Role grants go through the escalation guard: the acting principal must
/// hold `admin` or the role being granted.
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::UpdateUserRequest>,
) -> axum::response::Response {
    let id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("users.update")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let patch = UserPatch {
        display_name: auth.inner.display_name,
        roles: auth.inner.roles,
    };

    match services.update_user(shop.shop_id(), id, patch, principal.roles()) {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(user))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn disable_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    let auth = OpAuth {
        inner: (),
        required: vec![Permission::new("users.disable")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.disable_user(shop.shop_id(), id) {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(user))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}
