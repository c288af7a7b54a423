use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shopledger_auth::Permission;
use shopledger_core::{InvoiceId, SupplierId};
use shopledger_invoicing::{InvoicePatch, NewInvoice};

use crate::app::extract::ApiJson;
use crate::app::routes::common::OpAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_invoice).get(list_invoices))
        .route("/:id", get(get_invoice).patch(update_invoice).delete(delete_invoice))
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    ApiJson(body): ApiJson<dto::CreateInvoiceRequest>,
) -> axum::response::Response {
    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("invoices.create")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let supplier_id: SupplierId = match auth.inner.supplier_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id"),
    };
    let input = NewInvoice {
        supplier_id,
        invoice_date: auth.inner.invoice_date,
        items: auth.inner.items,
    };

    match services.create_invoice(shop.shop_id(), input) {
        Ok(invoice) => match dto::invoice_to_json(invoice) {
            Ok(body) => (StatusCode::CREATED, Json(body)).into_response(),
            Err(resp) => resp,
        },
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
) -> axum::response::Response {
    let invoices = match services.store.list_invoices(shop.shop_id()) {
        Ok(invoices) => invoices,
        Err(e) => return errors::store_error_to_response(e),
    };
    let mut items = Vec::with_capacity(invoices.len());
    for invoice in invoices {
        match dto::invoice_to_json(invoice) {
            Ok(body) => items.push(body),
            Err(resp) => return resp,
        }
    }
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: InvoiceId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid invoice id"),
    };

    match services.store.get_invoice(shop.shop_id(), id) {
        Ok(Some(invoice)) => match dto::invoice_to_json(invoice) {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(resp) => resp,
        },
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::UpdateInvoiceRequest>,
) -> axum::response::Response {
    let id: InvoiceId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid invoice id"),
    };

    let auth = OpAuth {
        inner: body,
        required: vec![Permission::new("invoices.update")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let supplier_id = match auth.inner.supplier_id {
        Some(raw) => match raw.parse::<SupplierId>() {
            Ok(v) => Some(v),
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id")
            }
        },
        None => None,
    };
    let patch = InvoicePatch {
        supplier_id,
        invoice_date: auth.inner.invoice_date,
        items: auth.inner.items,
    };

    match services.update_invoice(shop.shop_id(), id, patch) {
        Ok(invoice) => match dto::invoice_to_json(invoice) {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(resp) => resp,
        },
        Err(e) => errors::operation_error_to_response(e),
    }
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(shop): Extension<crate::context::ShopContext>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: InvoiceId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid invoice id"),
    };

    let auth = OpAuth {
        inner: (),
        required: vec![Permission::new("invoices.delete")],
    };
    if let Err(e) = crate::authz::authorize_operation(&shop, &principal, &auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.delete_invoice(shop.shop_id(), id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::operation_error_to_response(e),
    }
}
