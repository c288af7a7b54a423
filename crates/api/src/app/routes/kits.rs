use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shopledger_auth::Permission;
use shopledger_catalog::{KitPatch, NewKit};
use shopledger_core::KitId;

use crate::app::extract::ApiJson;
use crate::app::routes::common::OpAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_kit).get(list_kits))
        .route("/:id", get(get_kit).patch(update_kit).delete(delete_kit))
}

pub async fn create_kit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    ApiJson(body): ApiJson<dto::CreateKitRequest>,
) -> axum::response::Response {
    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("kits.create")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let components = match dto::to_kit_components(auth.inner.components) {
        Ok(components) => components,
        Err(resp) => return resp,
    };
    let input = NewKit {
        name: auth.inner.name,
        price: auth.inner.price,
        components,
    };

    match services.create_kit(shop.shop_id(), input) {
        Ok(kit) => (StatusCode::CREATED, Json(dto::kit_to_json(kit))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn list_kits(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
) -> axum::response::Response {
    let kits = match services.store.list_kits(shop.shop_id()) {
        Ok(kits) => kits,
        Err(e) => return errors::store_error_to_response(e),
    };
    let items = kits.into_iter().map(dto::kit_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_kit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: KitId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid kit id"),
    };

    match services.store.get_kit(shop.shop_id(), id) {
        Ok(Some(kit)) => (StatusCode::OK, Json(dto::kit_to_json(kit))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "kit not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_kit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::UpdateKitRequest>,
) -> axum::response::Response {
    let id: KitId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid kit id"),
    };

    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("kits.update")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let components = match auth.inner.components {
        Some(components) => match dto::to_kit_components(components) {
            Ok(components) => Some(components),
            Err(resp) => return resp,
        },
        None => None,
    };
    let patch = KitPatch {
        name: auth.inner.name,
        price: auth.inner.price,
        components,
    };

    match services.update_kit(shop.shop_id(), id, patch) {
        Ok(kit) => (StatusCode::OK, Json(dto::kit_to_json(kit))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn delete_kit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: KitId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid kit id"),
    };

    let auth = OpAuth {
        inner: (),
        required: vec![Permission::new("kits.delete")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.delete_kit(shop.shop_id(), id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}
