use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shopledger_auth::Permission;
use shopledger_core::{BillId, UserId};

use crate::app::extract::ApiJson;
use crate::app::routes::common::OpAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_bill).get(list_bills))
        .route("/:id", get(get_bill).put(update_bill).delete(delete_bill))
        .route("/:id/payments", post(record_payment))
}

/// The core write path: stock deduction + bill number + document, atomically.
pub async fn create_bill(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    ApiJson(body): ApiJson<dto::CreateBillRequest>,
) -> axum::response::Response {
    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("bills.create")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let created_by = UserId::from_uuid(*principal.principal_id().as_uuid());
    let draft = auth.inner.into_draft();

    match services.billing.create_bill(shop.shop_id(), created_by, draft) {
        Ok(bill) => match dto::bill_to_json(bill) {
            Ok(body) => (StatusCode::CREATED, Json(body)).into_response(),
            Err(resp) => resp,
        },
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn list_bills(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
) -> axum::response::Response {
    let bills = match services.store.list_bills(shop.shop_id()) {
        Ok(bills) => bills,
        Err(e) => return errors::store_error_to_response(e),
    };
    let mut items = Vec::with_capacity(bills.len());
    for bill in bills {
        match dto::bill_to_json(bill) {
            Ok(body) => items.push(body),
            Err(resp) => return resp,
        }
    }
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_bill(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: BillId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid bill id"),
    };

    match services.store.get_bill(shop.shop_id(), id) {
        Ok(Some(bill)) => match dto::bill_to_json(bill) {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(resp) => resp,
        },
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "bill not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Full replacement of the bill's rows: old rows are restocked and the new
/// rows re-deducted in one transaction.
pub async fn update_bill(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::CreateBillRequest>,
) -> axum::response::Response {
    let id: BillId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid bill id"),
    };

    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("bills.update")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let draft = auth.inner.into_draft();

    match services.billing.update_bill(shop.shop_id(), id, draft) {
        Ok(bill) => match dto::bill_to_json(bill) {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(resp) => resp,
        },
        Err(e) => errors::operation_error_to_response(e),
    }
}

/// Deleting a bill returns its stock to the shelves in the same transaction.
pub async fn delete_bill(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: BillId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid bill id"),
    };

    let auth = OpAuth {
        inner: (),
        required: vec![Permission::new("bills.delete")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.billing.delete_bill(shop.shop_id(), id) {
        Ok(_bill) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn record_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::RecordPaymentRequest>,
) -> axum::response::Response {
    let id: BillId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid bill id"),
    };

    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("bills.record_payment")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.billing.record_payment(shop.shop_id(), id, auth.inner.amount) {
        Ok(bill) => match dto::bill_to_json(bill) {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(resp) => resp,
        },
        Err(e) => errors::operation_error_to_response(e),
    }
}
