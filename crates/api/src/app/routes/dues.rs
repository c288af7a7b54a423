use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shopledger_auth::Permission;
use shopledger_billing::{DuePatch, NewDue};
use shopledger_core::DueId;

use crate::app::extract::ApiJson;
use crate::app::routes::common::OpAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_due).get(list_dues))
        .route("/:id", get(get_due).patch(update_due).delete(delete_due))
        .route("/:id/settle", post(settle_due))
}

pub async fn create_due(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    ApiJson(body): ApiJson<dto::CreateDueRequest>,
) -> axum::response::Response {
    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("dues.create")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let input = NewDue {
        customer_name: auth.inner.customer_name,
        customer_phone: auth.inner.customer_phone,
        amount: auth.inner.amount,
        note: auth.inner.note,
    };

    match services.create_due(shop.shop_id(), input) {
        Ok(due) => (StatusCode::CREATED, Json(dto::due_to_json(due))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn list_dues(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
) -> axum::response::Response {
    let dues = match services.store.list_dues(shop.shop_id()) {
        Ok(dues) => dues,
        Err(e) => return errors::store_error_to_response(e),
    };
    let items = dues.into_iter().map(dto::due_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_due(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DueId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid due id"),
    };

    match services.store.get_due(shop.shop_id(), id) {
        Ok(Some(due)) => (StatusCode::OK, Json(dto::due_to_json(due))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "due not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_due(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::UpdateDueRequest>,
) -> axum::response::Response {
    let id: DueId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid due id"),
    };

    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("dues.update")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let patch = DuePatch {
        customer_name: auth.inner.customer_name,
        customer_phone: auth.inner.customer_phone.map(Some),
        amount: auth.inner.amount,
        note: auth.inner.note.map(Some),
    };

    match services.update_due(shop.shop_id(), id, patch) {
        Ok(due) => (StatusCode::OK, Json(dto::due_to_json(due))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}

/// Settling is one-way; a settled due only rejects further edits.
pub async fn settle_due(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DueId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid due id"),
    };

    let auth = OpAuth {
        inner: (),
        required: vec![Permission::new("dues.settle")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.settle_due(shop.shop_id(), id) {
        Ok(due) => (StatusCode::OK, Json(dto::due_to_json(due))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn delete_due(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DueId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid due id"),
    };

    let auth = OpAuth {
        inner: (),
        required: vec![Permission::new("dues.delete")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.delete_due(shop.shop_id(), id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}
