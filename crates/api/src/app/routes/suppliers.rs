use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shopledger_auth::Permission;
use shopledger_core::SupplierId;
use shopledger_parties::{NewSupplier, SupplierPatch};

use crate::app::extract::ApiJson;
use crate::app::routes::common::OpAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_supplier).get(list_suppliers))
        .route("/:id", get(get_supplier).patch(update_supplier).delete(delete_supplier))
}

pub async fn create_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    ApiJson(body): ApiJson<dto::CreateSupplierRequest>,
) -> axum::response::Response {
    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("suppliers.create")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let input = NewSupplier {
        name: auth.inner.name,
        contact: auth.inner.contact.unwrap_or_default(),
        tax_id: auth.inner.tax_id,
    };

    match services.create_supplier(shop.shop_id(), input) {
        Ok(supplier) => (StatusCode::CREATED, Json(dto::supplier_to_json(supplier))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn list_suppliers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
) -> axum::response::Response {
    let suppliers = match services.store.list_suppliers(shop.shop_id()) {
        Ok(suppliers) => suppliers,
        Err(e) => return errors::store_error_to_response(e),
    };
    let items = suppliers.into_iter().map(dto::supplier_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SupplierId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id"),
    };

    match services.store.get_supplier(shop.shop_id(), id) {
        Ok(Some(supplier)) => (StatusCode::OK, Json(dto::supplier_to_json(supplier))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "supplier not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::UpdateSupplierRequest>,
) -> axum::response::Response {
    let id: SupplierId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id"),
    };

    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("suppliers.update")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let patch = SupplierPatch {
        name: auth.inner.name,
        contact: auth.inner.contact,
        tax_id: auth.inner.tax_id.map(Some),
    };

    match services.update_supplier(shop.shop_id(), id, patch) {
        Ok(supplier) => (StatusCode::OK, Json(dto::supplier_to_json(supplier))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn delete_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SupplierId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id"),
    };

    let auth = OpAuth {
        inner: (),
        required: vec![Permission::new("suppliers.delete")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.delete_supplier(shop.shop_id(), id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}
