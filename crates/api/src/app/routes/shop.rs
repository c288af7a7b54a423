use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use shopledger_auth::Permission;
use shopledger_shop::ProfileUpdate;

use crate::app::extract::ApiJson;
use crate::app::routes::common::OpAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
) -> axum::response::Response {
    match services.store.profile(shop.shop_id()) {
        Ok(Some(profile)) => (StatusCode::OK, Json(dto::profile_to_json(profile))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "shop profile not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    ApiJson(body): ApiJson<dto::UpdateShopRequest>,
) -> axum::response::Response {
    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("shop.update")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let input = ProfileUpdate {
        name: auth.inner.name,
        address: auth.inner.address,
        phone: auth.inner.phone,
        tax_id: auth.inner.tax_id,
    };

    match services.update_profile(shop.shop_id(), input) {
        Ok(profile) => (StatusCode::OK, Json(dto::profile_to_json(profile))).into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}
