use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shopledger_auth::Permission;
use shopledger_catalog::{NewProduct, ProductPatch};
use shopledger_core::ProductId;

use crate::app::extract::ApiJson;
use crate::app::routes::common::OpAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product).patch(update_product).delete(delete_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    ApiJson(body): ApiJson<dto::CreateProductRequest>,
) -> axum::response::Response {
    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("products.create")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let input = NewProduct {
        name: auth.inner.name,
        quantity: auth.inner.quantity,
        price: auth.inner.price,
    };

    match services.create_product(shop.shop_id(), input) {
        Ok(product) => (StatusCode::CREATED, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
) -> axum::response::Response {
    let products = match services.store.list_products(shop.shop_id()) {
        Ok(products) => products,
        Err(e) => return errors::store_error_to_response(e),
    };
    let items = products.into_iter().map(dto::product_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    match services.store.get_product(shop.shop_id(), id) {
        Ok(Some(product)) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::UpdateProductRequest>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("products.update")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let patch = ProductPatch {
        name: auth.inner.name,
        quantity: auth.inner.quantity,
        price: auth.inner.price,
    };

    match services.update_product(shop.shop_id(), id, patch) {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    let auth = OpAuth {
        inner: (),
        required: vec![Permission::new("products.delete")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.delete_product(shop.shop_id(), id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}
