use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;
use shopledger_auth::PrincipalId;
use shopledger_core::ShopId;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = shopledger_api::app::build_app(jwt_secret.to_string());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Claims in the wire shape the API expects (numeric `iat`/`exp`).
#[derive(serde::Serialize)]
struct Claims {
    sub: String,
    shop_id: String,
    roles: Vec<String>,
    iat: i64,
    exp: i64,
}

fn mint_jwt_at(
    jwt_secret: &str,
    shop_id: ShopId,
    roles: &[&str],
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> String {
    let claims = Claims {
        sub: PrincipalId::new().to_string(),
        shop_id: shop_id.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn mint_jwt(jwt_secret: &str, shop_id: ShopId, roles: &[&str]) -> String {
    let now = Utc::now();
    mint_jwt_at(jwt_secret, shop_id, roles, now, now + ChronoDuration::minutes(10))
}

async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
    quantity: i64,
    price: u64,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/products", base_url))
        .bearer_auth(token)
        .json(&json!({ "name": name, "quantity": quantity, "price": price }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn product_quantity(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    id: &str,
) -> i64 {
    let res = client
        .get(format!("{}/products/{}", base_url, id))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["quantity"].as_i64().unwrap()
}

#[tokio::test]
async fn health_does_not_require_auth() {
    let srv = TestServer::spawn("test-secret").await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn("test-secret").await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_tokens_are_rejected() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let now = Utc::now();
    // Well past the decoder's leeway.
    let token = mint_jwt_at(
        jwt_secret,
        ShopId::new(),
        &["admin"],
        now - ChronoDuration::minutes(30),
        now - ChronoDuration::minutes(10),
    );

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn shop_context_is_derived_from_token() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let shop_id = ShopId::new();
    let token = mint_jwt(jwt_secret, shop_id, &["admin"]);

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["shop_id"].as_str().unwrap(), shop_id.to_string());
    assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "admin"));
}

#[tokio::test]
async fn writes_require_a_permitted_role() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let shop_id = ShopId::new();
    let cashier = mint_jwt(jwt_secret, shop_id, &["cashier"]);

    let client = reqwest::Client::new();

    // Reads only need a valid token.
    let res = client
        .get(format!("{}/products", srv.base_url))
        .bearer_auth(&cashier)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Writes need a permission the cashier role does not carry.
    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&cashier)
        .json(&json!({ "name": "Tea 250g", "quantity": 5, "price": 500 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "forbidden");
}

#[tokio::test]
async fn bill_lifecycle_deducts_edits_and_restocks() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    let product = create_product(&client, &srv.base_url, &token, "Tea 250g", 10, 500).await;
    let product_id = product["id"].as_str().unwrap().to_string();
    assert_eq!(product["code"].as_str().unwrap(), "PRD-0001");

    // Create: 4 units come off the shelf, bill number is minted.
    let res = client
        .post(format!("{}/bills", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "customerName": "Asad",
            "customerPhone": "0333-7654321",
            "billDate": "2025-06-01T10:00:00Z",
            "items": [
                { "itemType": "Product", "itemId": product_id, "name": "Tea 250g", "quantity": 4, "rate": 500 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let bill: serde_json::Value = res.json().await.unwrap();
    let bill_id = bill["id"].as_str().unwrap().to_string();
    assert_eq!(bill["billNumber"].as_str().unwrap(), "BILL-2025-0001");
    assert_eq!(bill["grandTotal"].as_u64().unwrap(), 2000);
    assert_eq!(bill["items"][0]["total"].as_u64().unwrap(), 2000);
    assert_eq!(bill["paymentStatus"].as_str().unwrap(), "unpaid");

    assert_eq!(product_quantity(&client, &srv.base_url, &token, &product_id).await, 6);

    // Edit: old rows restocked, new rows deducted, number kept.
    let res = client
        .put(format!("{}/bills/{}", srv.base_url, bill_id))
        .bearer_auth(&token)
        .json(&json!({
            "customerName": "Asad",
            "billDate": "2025-06-01T10:00:00Z",
            "items": [
                { "itemType": "Product", "itemId": product_id, "name": "Tea 250g", "quantity": 9, "rate": 500 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let revised: serde_json::Value = res.json().await.unwrap();
    assert_eq!(revised["billNumber"].as_str().unwrap(), "BILL-2025-0001");
    assert_eq!(revised["grandTotal"].as_u64().unwrap(), 4500);

    assert_eq!(product_quantity(&client, &srv.base_url, &token, &product_id).await, 1);

    // Delete: the sold units go back on the shelf.
    let res = client
        .delete(format!("{}/bills/{}", srv.base_url, bill_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    assert_eq!(product_quantity(&client, &srv.base_url, &token, &product_id).await, 10);

    let res = client
        .get(format!("{}/bills/{}", srv.base_url, bill_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn overdrawn_bill_is_rejected_and_leaves_no_trace() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    let product = create_product(&client, &srv.base_url, &token, "Sugar 1kg", 3, 950).await;
    let product_id = product["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/bills", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "customerName": "Bilal",
            "billDate": "2025-06-01T10:00:00Z",
            "items": [
                { "itemType": "Product", "itemId": product_id, "name": "Sugar 1kg", "quantity": 5, "rate": 950 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "insufficient_stock");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Sugar 1kg"));
    assert!(message.contains("available 3"));
    assert!(message.contains("requested 5"));

    // Nothing changed: stock intact, no bill document.
    assert_eq!(product_quantity(&client, &srv.base_url, &token, &product_id).await, 3);
    let res = client
        .get(format!("{}/bills", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn overflowing_bill_totals_are_rejected() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    let product = create_product(&client, &srv.base_url, &token, "Sugar 1kg", 10, 950).await;
    let product_id = product["id"].as_str().unwrap().to_string();

    // 4 * u64::MAX does not fit in u64; the stock check alone would pass.
    let res = client
        .post(format!("{}/bills", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "customerName": "Bilal",
            "billDate": "2025-06-01T10:00:00Z",
            "items": [
                { "itemType": "Product", "itemId": product_id, "name": "Sugar 1kg", "quantity": 4, "rate": u64::MAX }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "validation_error");

    // The transaction aborted: stock intact, no bill document.
    assert_eq!(product_quantity(&client, &srv.base_url, &token, &product_id).await, 10);
    let res = client
        .get(format!("{}/bills", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());

    // The server is still healthy; the next bill takes the first number.
    let res = client
        .post(format!("{}/bills", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "customerName": "Bilal",
            "billDate": "2025-06-01T10:00:00Z",
            "items": [
                { "itemType": "Product", "itemId": product_id, "name": "Sugar 1kg", "quantity": 2, "rate": 950 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let bill: serde_json::Value = res.json().await.unwrap();
    assert_eq!(bill["billNumber"].as_str().unwrap(), "BILL-2025-0001");
}

#[tokio::test]
async fn kit_rows_expand_into_component_deductions() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    let tea = create_product(&client, &srv.base_url, &token, "Tea 250g", 10, 500).await;
    let sugar = create_product(&client, &srv.base_url, &token, "Sugar 1kg", 10, 950).await;
    let tea_id = tea["id"].as_str().unwrap().to_string();
    let sugar_id = sugar["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/kits", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Chai Combo",
            "price": 1800,
            "components": [
                { "product_id": tea_id, "per_kit_qty": 2 },
                { "product_id": sugar_id, "per_kit_qty": 1 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let kit: serde_json::Value = res.json().await.unwrap();
    let kit_id = kit["id"].as_str().unwrap().to_string();
    assert_eq!(kit["code"].as_str().unwrap(), "KIT-0001");

    let res = client
        .post(format!("{}/bills", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "customerName": "Dawood",
            "billDate": "2025-06-01T10:00:00Z",
            "items": [
                { "itemType": "Kit", "itemId": kit_id, "name": "Chai Combo", "quantity": 3, "rate": 1800 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    assert_eq!(product_quantity(&client, &srv.base_url, &token, &tea_id).await, 4);
    assert_eq!(product_quantity(&client, &srv.base_url, &token, &sugar_id).await, 7);
}

#[tokio::test]
async fn kits_reject_unknown_component_products() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/kits", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Ghost Combo",
            "price": 1000,
            "components": [
                { "product_id": PrincipalId::new().to_string(), "per_kit_qty": 1 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "not_found");
    assert!(body["message"].as_str().unwrap().starts_with("product "));
}

#[tokio::test]
async fn shops_are_isolated_by_token() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token_a = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let token_b = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    let product = create_product(&client, &srv.base_url, &token_a, "Tea 250g", 10, 500).await;
    let product_id = product["id"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/products", srv.base_url))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());

    let res = client
        .get(format!("{}/products/{}", srv.base_url, product_id))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn payments_drive_the_derived_status() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    let product = create_product(&client, &srv.base_url, &token, "Tea 250g", 10, 500).await;
    let product_id = product["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/bills", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "customerName": "Asad",
            "billDate": "2025-06-01T10:00:00Z",
            "items": [
                { "itemType": "Product", "itemId": product_id, "name": "Tea 250g", "quantity": 5, "rate": 500 }
            ]
        }))
        .send()
        .await
        .unwrap();
    let bill: serde_json::Value = res.json().await.unwrap();
    let bill_id = bill["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/bills/{}/payments", srv.base_url, bill_id))
        .bearer_auth(&token)
        .json(&json!({ "amount": 1000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["paymentStatus"].as_str().unwrap(), "partial");
    assert_eq!(body["outstandingAmount"].as_u64().unwrap(), 1500);

    // Overpayment is capped at the grand total.
    let res = client
        .post(format!("{}/bills/{}/payments", srv.base_url, bill_id))
        .bearer_auth(&token)
        .json(&json!({ "amount": 9000 }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["paymentStatus"].as_str().unwrap(), "paid");
    assert_eq!(body["paidAmount"].as_u64().unwrap(), 2500);

    // Paying a settled bill conflicts.
    let res = client
        .post(format!("{}/bills/{}/payments", srv.base_url, bill_id))
        .bearer_auth(&token)
        .json(&json!({ "amount": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn suppliers_with_invoices_on_file_cannot_be_deleted() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/suppliers", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Karachi Wholesale", "contact": { "phone": "021-1234567" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let supplier: serde_json::Value = res.json().await.unwrap();
    let supplier_id = supplier["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/invoices", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "supplier_id": supplier_id,
            "invoice_date": "2025-03-05T00:00:00Z",
            "items": [ { "name": "Flour bags", "quantity": 10, "rate": 1200 } ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let invoice: serde_json::Value = res.json().await.unwrap();
    let invoice_id = invoice["id"].as_str().unwrap().to_string();
    assert_eq!(invoice["number"].as_str().unwrap(), "INV-2025-0001");
    assert_eq!(invoice["grand_total"].as_u64().unwrap(), 12000);

    let res = client
        .delete(format!("{}/suppliers/{}", srv.base_url, supplier_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Once the invoice is gone the supplier can be removed.
    let res = client
        .delete(format!("{}/invoices/{}", srv.base_url, invoice_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(format!("{}/suppliers/{}", srv.base_url, supplier_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn dues_settle_exactly_once() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/dues", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "customer_name": "Hamza", "amount": 1500, "note": "owed since March" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let due: serde_json::Value = res.json().await.unwrap();
    let due_id = due["id"].as_str().unwrap().to_string();
    assert!(!due["settled"].as_bool().unwrap());

    let res = client
        .post(format!("{}/dues/{}/settle", srv.base_url, due_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["settled"].as_bool().unwrap());
    assert!(body["settled_at"].is_string());

    let res = client
        .post(format!("{}/dues/{}/settle", srv.base_url, due_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Settled dues reject edits too.
    let res = client
        .patch(format!("{}/dues/{}", srv.base_url, due_id))
        .bearer_auth(&token)
        .json(&json!({ "amount": 900 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn users_have_unique_emails_and_can_be_disabled() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/users", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "email": "  Ayesha@Example.COM ",
            "display_name": "  Ayesha  ",
            "roles": ["cashier"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let user: serde_json::Value = res.json().await.unwrap();
    let user_id = user["id"].as_str().unwrap().to_string();
    assert_eq!(user["email"].as_str().unwrap(), "ayesha@example.com");
    assert_eq!(user["display_name"].as_str().unwrap(), "Ayesha");
    assert_eq!(user["status"].as_str().unwrap(), "active");

    let res = client
        .post(format!("{}/users", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "email": "ayesha@example.com", "display_name": "Other" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .post(format!("{}/users/{}/disable", srv.base_url, user_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"].as_str().unwrap(), "disabled");

    let res = client
        .post(format!("{}/users/{}/disable", srv.base_url, user_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn shop_profile_upserts_in_place() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/shop", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .put(format!("{}/shop", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Madina General Store",
            "address": "Shop 4, Main Bazaar",
            "phone": "042-1112223"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/shop", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["name"].as_str().unwrap(), "Madina General Store");
    assert_eq!(body["address"].as_str().unwrap(), "Shop 4, Main Bazaar");
}

#[tokio::test]
async fn malformed_ids_map_to_bad_request() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/products/not-a-uuid", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "invalid_id");
}

#[tokio::test]
async fn undeserializable_bodies_map_to_bad_request() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, ShopId::new(), &["admin"]);
    let client = reqwest::Client::new();

    // Wrong type for a field: still a 400 with the error envelope, not
    // axum's plain-text 422.
    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Tea 250g", "quantity": "five", "price": 500 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "validation_error");
    assert!(!body["message"].as_str().unwrap().is_empty());

    // A negative number can never land in an unsigned field.
    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Tea 250g", "quantity": 5, "price": -500 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "validation_error");

    // Missing JSON content type gets the same envelope, not a bare 415.
    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&token)
        .body(r#"{ "name": "Tea 250g", "quantity": 5, "price": 500 }"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "validation_error");
}
