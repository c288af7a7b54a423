use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use shopledger_auth::{Role, User};
use shopledger_billing::{Bill, Due, LineItem, NewBill};
use shopledger_catalog::{Kit, KitComponent, Product};
use shopledger_core::ProductId;
use shopledger_invoicing::{Invoice, InvoiceLine};
use shopledger_parties::{ContactInfo, Supplier};
use shopledger_shop::ShopProfile;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub quantity: i64,
    pub price: u64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct KitComponentRequest {
    pub product_id: String,
    pub per_kit_qty: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateKitRequest {
    pub name: String,
    pub price: u64,
    pub components: Vec<KitComponentRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateKitRequest {
    pub name: Option<String>,
    pub price: Option<u64>,
    pub components: Option<Vec<KitComponentRequest>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub contact: Option<ContactInfo>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub contact: Option<ContactInfo>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub supplier_id: String,
    pub invoice_date: DateTime<Utc>,
    pub items: Vec<InvoiceLine>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub supplier_id: Option<String>,
    pub invoice_date: Option<DateTime<Utc>>,
    pub items: Option<Vec<InvoiceLine>>,
}

/// Bill creation body. Key casing follows the bill export contract
/// (`customerName`, `billDate`, rows tagged by `itemType`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillRequest {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub bill_date: DateTime<Utc>,
    pub items: Vec<LineItem>,
}

impl CreateBillRequest {
    pub fn into_draft(self) -> NewBill {
        NewBill {
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            bill_date: self.bill_date,
            items: self.items,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateDueRequest {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub amount: u64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDueRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub amount: Option<u64>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub roles: Option<Vec<Role>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateShopRequest {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
}

pub fn to_kit_components(
    req_components: Vec<KitComponentRequest>,
) -> Result<Vec<KitComponent>, axum::response::Response> {
    let mut components = Vec::with_capacity(req_components.len());
    for c in req_components {
        let product_id: ProductId = match c.product_id.parse() {
            Ok(id) => id,
            Err(_) => {
                return Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    format!("invalid product id '{}'", c.product_id),
                ));
            }
        };
        components.push(KitComponent {
            product_id,
            per_kit_qty: c.per_kit_qty,
        });
    }
    Ok(components)
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(product: Product) -> serde_json::Value {
    serde_json::json!({
        "id": product.id.to_string(),
        "code": product.code,
        "name": product.name,
        "quantity": product.quantity,
        "price": product.price,
    })
}

pub fn kit_to_json(kit: Kit) -> serde_json::Value {
    serde_json::json!({
        "id": kit.id.to_string(),
        "code": kit.code,
        "name": kit.name,
        "price": kit.price,
        "components": kit.components.iter().map(|c| serde_json::json!({
            "product_id": c.product_id.to_string(),
            "per_kit_qty": c.per_kit_qty,
        })).collect::<Vec<_>>(),
    })
}

pub fn supplier_to_json(supplier: Supplier) -> serde_json::Value {
    serde_json::json!({
        "id": supplier.id.to_string(),
        "name": supplier.name,
        "contact": {
            "email": supplier.contact.email,
            "phone": supplier.contact.phone,
            "address": supplier.contact.address,
        },
        "tax_id": supplier.tax_id,
    })
}

pub fn invoice_to_json(invoice: Invoice) -> Result<serde_json::Value, axum::response::Response> {
    let mut items = Vec::with_capacity(invoice.items.len());
    for line in &invoice.items {
        let total = line.total().map_err(errors::domain_error_to_response)?;
        items.push(serde_json::json!({
            "name": line.name,
            "quantity": line.quantity,
            "rate": line.rate,
            "total": total,
        }));
    }

    Ok(serde_json::json!({
        "id": invoice.id.to_string(),
        "number": invoice.number,
        "supplier_id": invoice.supplier_id.to_string(),
        "invoice_date": invoice.invoice_date.to_rfc3339(),
        "items": items,
        "grand_total": invoice.grand_total,
    }))
}

/// Bill responses keep the export contract shape: camelCase keys, every row
/// carrying `name`/`quantity`/`rate`/`total`, plus `grandTotal` and the
/// derived `paymentStatus`.
pub fn bill_to_json(bill: Bill) -> Result<serde_json::Value, axum::response::Response> {
    let mut items = Vec::with_capacity(bill.items.len());
    for item in &bill.items {
        items.push(line_item_to_json(item)?);
    }
    let payment_status = bill.payment_status();
    let outstanding = bill.outstanding_amount();

    Ok(serde_json::json!({
        "id": bill.id.to_string(),
        "billNumber": bill.bill_number,
        "customerName": bill.customer_name,
        "customerPhone": bill.customer_phone,
        "billDate": bill.bill_date.to_rfc3339(),
        "items": items,
        "grandTotal": bill.grand_total,
        "paidAmount": bill.paid_amount,
        "outstandingAmount": outstanding,
        "paymentStatus": payment_status,
        "createdBy": bill.created_by.to_string(),
        "createdAt": bill.created_at.to_rfc3339(),
    }))
}

fn line_item_to_json(item: &LineItem) -> Result<serde_json::Value, axum::response::Response> {
    let total = item.total().map_err(errors::domain_error_to_response)?;
    let mut row = serde_json::json!({
        "name": item.name(),
        "quantity": item.quantity(),
        "rate": item.rate(),
        "total": total,
    });
    match item {
        LineItem::Simple { .. } => {
            row["itemType"] = "Simple".into();
        }
        LineItem::Product { product_id, .. } => {
            row["itemType"] = "Product".into();
            row["itemId"] = product_id.to_string().into();
        }
        LineItem::Kit { kit_id, .. } => {
            row["itemType"] = "Kit".into();
            row["itemId"] = kit_id.to_string().into();
        }
    }
    Ok(row)
}

pub fn due_to_json(due: Due) -> serde_json::Value {
    serde_json::json!({
        "id": due.id.to_string(),
        "customer_name": due.customer_name,
        "customer_phone": due.customer_phone,
        "amount": due.amount,
        "note": due.note,
        "settled": due.settled,
        "settled_at": due.settled_at.map(|t| t.to_rfc3339()),
    })
}

pub fn user_to_json(user: User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id.to_string(),
        "email": user.email,
        "display_name": user.display_name,
        "roles": user.roles.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "status": format!("{:?}", user.status).to_lowercase(),
    })
}

pub fn profile_to_json(profile: ShopProfile) -> serde_json::Value {
    serde_json::json!({
        "shop_id": profile.shop_id.to_string(),
        "name": profile.name,
        "address": profile.address,
        "phone": profile.phone,
        "tax_id": profile.tax_id,
        "updated_at": profile.updated_at.to_rfc3339(),
    })
}
