use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use shop_api::{AppState, AppStateInner, seed::seed_demo_data};
use shop_db::Database;

fn app() -> Router {
    let db = Database::open_in_memory().unwrap();
    seed_demo_data(&db).unwrap();
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: "integration-test-secret".to_string(),
        token_ttl: chrono::Duration::hours(1),
    });
    shop_api::router(state)
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {}: {}", username, body);
    body["token"].as_str().unwrap().to_string()
}

async fn first_category_leaf(app: &Router) -> String {
    let (_, tree) = send(app, Method::GET, "/api/categories", None, None).await;
    tree[0]["children"][0]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_and_duplicate_username() {
    let app = app();
    let body = json!({
        "username": "newbie",
        "password": "newbie1234",
        "phone": "010-5555-5555",
        "company_name": "새내기건설",
        "business_number": "111-22-33333"
    });

    let (status, user) = send(&app, Method::POST, "/api/auth/register", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], "newbie");
    assert_eq!(user["role"], "user");
    assert_eq!(user["company_name"], "새내기건설");
    assert_eq!(user["business_status"], "pending");
    assert!(user.get("password_hash").is_none());

    let (status, _) = send(&app, Method::POST, "/api/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_validates_input() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "ab", "password": "password1", "phone": "010" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "shorty", "password": "short", "phone": "010" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_and_me() {
    let app = app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "seller", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/users/me", Some("not.a.token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app, "seller", "seller1234").await;
    let (status, me) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "seller");
    assert_eq!(me["company_name"], "대박가설");
    assert_eq!(me["business_status"], "approved");
}

#[tokio::test]
async fn test_update_me_changes_contact_and_password() {
    let app = app();
    let token = login(&app, "buyer", "buyer1234").await;

    let (status, me) = send(
        &app,
        Method::PUT,
        "/api/users/me",
        Some(&token),
        Some(json!({ "email": "buyer@example.com", "office_address": "부산광역시", "password": "fresh-pass-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "buyer@example.com");
    assert_eq!(me["office_address"], "부산광역시");
    assert_eq!(me["name"], "이구매");

    login(&app, "buyer", "fresh-pass-1").await;
}

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let app = app();
    let buyer = login(&app, "buyer", "buyer1234").await;

    let (status, _) = send(&app, Method::GET, "/api/admin/business-profiles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/admin/business-profiles", Some(&buyer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = login(&app, "admin", "admin1234").await;
    let (status, body) = send(&app, Method::GET, "/api/admin/business-profiles", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_business_profile_approval() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": "builder",
            "password": "builder1234",
            "phone": "010-7777-7777",
            "company_name": "든든건설",
            "business_number": "222-33-44444"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let admin = login(&app, "admin", "admin1234").await;
    let (_, pending) = send(&app, Method::GET, "/api/admin/business-profiles?status=pending", Some(&admin), None).await;
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    let profile_id = pending[0]["id"].as_str().unwrap().to_string();

    let (status, profile) = send(
        &app,
        Method::POST,
        &format!("/api/admin/business-profiles/{}/approve", profile_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["status"], "approved");
    assert!(profile["approved_at"].is_string());

    let builder = login(&app, "builder", "builder1234").await;
    let (_, me) = send(&app, Method::GET, "/api/users/me", Some(&builder), None).await;
    assert_eq!(me["business_status"], "approved");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/business-profiles/00000000-0000-0000-0000-000000000000/reject",
        Some(&admin),
        Some(json!({ "reason": "unknown" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_second_profile_can_become_main() {
    let app = app();
    let seller = login(&app, "seller", "seller1234").await;

    let (status, profile) = send(
        &app,
        Method::POST,
        "/api/users/me/profiles",
        Some(&seller),
        Some(json!({ "business_name": "대박가설 2공장", "business_number": "123-45-00001" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(profile["is_main"], false);
    assert_eq!(profile["status"], "pending");

    let id = profile["id"].as_str().unwrap();
    let (status, profiles) = send(
        &app,
        Method::PUT,
        &format!("/api/users/me/profiles/{}/main", id),
        Some(&seller),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let profiles = profiles.as_array().unwrap();
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0]["id"], id);
    assert_eq!(profiles[0]["is_main"], true);
    assert_eq!(profiles[1]["is_main"], false);

    let buyer = login(&app, "buyer", "buyer1234").await;
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/users/me/profiles/{}/main", id),
        Some(&buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_listing_and_review() {
    let app = app();

    let (status, products) = send(&app, Method::GET, "/api/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(products.as_array().unwrap().len(), 20);

    let seller = login(&app, "seller", "seller1234").await;
    let category_id = first_category_leaf(&app).await;
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/users/me/products",
        Some(&seller),
        Some(json!({
            "category_id": category_id,
            "item_name": "Steel Pipe 6m",
            "item_condition": "new",
            "unit_price": 12000,
            "sale_unit": "ea",
            "stock_quantity": 5,
            "image_urls": ["https://img.example.com/a.jpg", "https://img.example.com/b.jpg"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["is_displayed"], false);
    assert_eq!(created["total_amount"], 60000);
    assert_eq!(created["seller_name"], "대박가설");
    assert!(created["slug"].as_str().unwrap().starts_with("steel-pipe-6m-"));

    // Pending listings stay out of the public list but resolve by id and slug
    let (_, products) = send(&app, Method::GET, "/api/products", None, None).await;
    assert_eq!(products.as_array().unwrap().len(), 20);

    let id = created["id"].as_str().unwrap();
    let slug = created["slug"].as_str().unwrap();
    let (status, by_id) = send(&app, Method::GET, &format!("/api/products/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, by_slug) = send(&app, Method::GET, &format!("/api/products/{}", slug), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id, by_slug);
    assert_eq!(by_id["image_urls"], json!(["https://img.example.com/a.jpg", "https://img.example.com/b.jpg"]));

    let (_, mine) = send(&app, Method::GET, "/api/users/me/products", Some(&seller), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 21);

    let admin = login(&app, "admin", "admin1234").await;
    let (status, approved) = send(
        &app,
        Method::POST,
        &format!("/api/admin/products/{}/approve", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "selling");
    assert_eq!(approved["is_displayed"], true);

    let (_, found) = send(&app, Method::GET, "/api/products?item_name=Steel", None, None).await;
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], id);

    let (status, _) = send(&app, Method::GET, "/api/products/no-such-slug", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_filters_and_sort() {
    let app = app();

    let (_, cheapest_first) = send(&app, Method::GET, "/api/products?sort=price-asc", None, None).await;
    let prices: Vec<i64> = cheapest_first
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["unit_price"].as_i64().unwrap())
        .collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));

    // A root category matches products filed under its children
    let (_, tree) = send(&app, Method::GET, "/api/categories", None, None).await;
    let root_id = tree[0]["id"].as_str().unwrap();
    let (_, under_root) = send(&app, Method::GET, &format!("/api/products?category_id={}", root_id), None, None).await;
    assert!(!under_root.as_array().unwrap().is_empty());
    assert!(under_root.as_array().unwrap().len() < 20);

    let (status, _) = send(&app, Method::GET, "/api/products?category_id=pipes", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, used) = send(&app, Method::GET, "/api/products?item_condition=used", None, None).await;
    assert!(used.as_array().unwrap().iter().all(|p| p["item_condition"] == "used"));
}

#[tokio::test]
async fn test_category_creation() {
    let app = app();
    let admin = login(&app, "admin", "admin1234").await;
    let leaf = first_category_leaf(&app).await;

    let (status, node) = send(
        &app,
        Method::POST,
        "/api/admin/categories",
        Some(&admin),
        Some(json!({ "name": "비계 파이프", "parent_id": leaf })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(node["depth"], 2);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/categories",
        Some(&admin),
        Some(json!({ "name": "고아", "parent_id": "00000000-0000-0000-0000-000000000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, tree) = send(&app, Method::GET, "/api/categories", None, None).await;
    assert_eq!(tree[0]["children"][0]["children"][0]["name"], "비계 파이프");
}

#[tokio::test]
async fn test_order_creation() {
    let app = app();
    let buyer = login(&app, "buyer", "buyer1234").await;

    let (_, products) = send(&app, Method::GET, "/api/products", None, None).await;
    let product = &products.as_array().unwrap()[0];
    let product_id = product["id"].as_str().unwrap().to_string();
    let unit_price = product["unit_price"].as_i64().unwrap();

    let (status, order) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&buyer),
        Some(json!({
            "items": [
                { "product_id": product_id, "quantity": 2 },
                { "product_id": product_id, "quantity": 1 }
            ],
            "recipient_name": "이구매",
            "shipping_unloading_address": "경기도 수원시"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", order);
    assert!(order["order_number"].as_str().unwrap().starts_with("ORD-"));
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment_status"], "unpaid");
    assert_eq!(order["order_type"], "platform");
    assert_eq!(order["total_amount"], unit_price * 3);
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["items"][0]["quantity"], 3);
    assert_eq!(order["buyer"]["username"], "buyer");
    assert_eq!(order["seller"]["username"], "seller");

    let (_, after) = send(&app, Method::GET, &format!("/api/products/{}", product_id), None, None).await;
    assert_eq!(after["stock_quantity"], product["stock_quantity"].as_i64().unwrap() - 3);

    let order_id = order["id"].as_str().unwrap();
    let (status, _) = send(&app, Method::GET, &format!("/api/orders/{}", order_id), Some(&buyer), None).await;
    assert_eq!(status, StatusCode::OK);

    let seller = login(&app, "seller", "seller1234").await;
    let (_, sales) = send(&app, Method::GET, "/api/orders?as=seller", Some(&seller), None).await;
    assert_eq!(sales.as_array().unwrap().len(), 1);
    let (_, purchases) = send(&app, Method::GET, "/api/orders", Some(&seller), None).await;
    assert!(purchases.as_array().unwrap().is_empty());

    // Sellers can't buy their own listings
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&seller),
        Some(json!({ "items": [{ "product_id": product_id, "quantity": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_rejections() {
    let app = app();
    let buyer = login(&app, "buyer", "buyer1234").await;
    let (_, products) = send(&app, Method::GET, "/api/products", None, None).await;
    let product_id = products[0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, "/api/orders", Some(&buyer), Some(json!({ "items": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&buyer),
        Some(json!({ "items": [{ "product_id": product_id, "quantity": 100000 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("in stock"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&buyer),
        Some(json!({ "items": [{ "product_id": "00000000-0000-0000-0000-000000000000", "quantity": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_total_overflow_rejected() {
    let app = app();
    let seller = login(&app, "seller", "seller1234").await;
    let category_id = first_category_leaf(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users/me/products",
        Some(&seller),
        Some(json!({
            "category_id": category_id,
            "item_name": "Tower Crane",
            "item_condition": "used",
            "unit_price": 10_000_000_000_i64,
            "sale_unit": "ea",
            "stock_quantity": 10_000_000_000_i64
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("too large"));

    // Nothing was stored, so the seller's listing still renders
    let (status, mine) = send(&app, Method::GET, "/api/users/me/products", Some(&seller), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_order_quantity_overflow_rejected() {
    let app = app();
    let buyer = login(&app, "buyer", "buyer1234").await;
    let (_, products) = send(&app, Method::GET, "/api/products", None, None).await;
    let product = &products.as_array().unwrap()[0];
    let product_id = product["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&buyer),
        Some(json!({
            "items": [
                { "product_id": product_id, "quantity": i64::MAX },
                { "product_id": product_id, "quantity": 1 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, after) = send(&app, Method::GET, &format!("/api/products/{}", product_id), None, None).await;
    assert_eq!(after["stock_quantity"], product["stock_quantity"]);
}

#[tokio::test]
async fn test_order_amount_overflow_rejected() {
    let app = app();
    let seller = login(&app, "seller", "seller1234").await;
    let admin = login(&app, "admin", "admin1234").await;
    let buyer = login(&app, "buyer", "buyer1234").await;
    let category_id = first_category_leaf(&app).await;

    // Each line fits in i64 on its own; the order total does not
    let mut ids = Vec::new();
    for name in ["Crawler Crane", "Pile Driver"] {
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/users/me/products",
            Some(&seller),
            Some(json!({
                "category_id": category_id,
                "item_name": name,
                "item_condition": "used",
                "unit_price": i64::MAX / 2 + 1,
                "sale_unit": "ea",
                "stock_quantity": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", created);
        let id = created["id"].as_str().unwrap().to_string();
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/admin/products/{}/approve", id),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        ids.push(id);
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&buyer),
        Some(json!({
            "items": [
                { "product_id": ids[0], "quantity": 1 },
                { "product_id": ids[1], "quantity": 1 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("too large"));

    let (_, crane) = send(&app, Method::GET, &format!("/api/products/{}", ids[0]), None, None).await;
    assert_eq!(crane["stock_quantity"], 1);
}

#[tokio::test]
async fn test_rejection_reason_visible_to_owner_and_admin() {
    let app = app();
    let seller = login(&app, "seller", "seller1234").await;
    let admin = login(&app, "admin", "admin1234").await;
    let buyer = login(&app, "buyer", "buyer1234").await;
    let category_id = first_category_leaf(&app).await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/users/me/products",
        Some(&seller),
        Some(json!({
            "category_id": category_id,
            "item_name": "Rusty Scaffold",
            "item_condition": "used",
            "unit_price": 3000,
            "sale_unit": "ea",
            "stock_quantity": 40
        })),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, rejected) = send(
        &app,
        Method::POST,
        &format!("/api/admin/products/{}/reject", id),
        Some(&admin),
        Some(json!({ "reason": "사진이 불분명합니다" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");

    let uri = format!("/api/products/{}", id);
    let (status, anonymous) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(anonymous["status"], "rejected");
    assert!(anonymous["rejection_reason"].is_null());

    let (_, other_user) = send(&app, Method::GET, &uri, Some(&buyer), None).await;
    assert!(other_user["rejection_reason"].is_null());

    // A bad token on a public route reads as anonymous
    let (status, forged) = send(&app, Method::GET, &uri, Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(forged["rejection_reason"].is_null());

    let (_, owner) = send(&app, Method::GET, &uri, Some(&seller), None).await;
    assert_eq!(owner["rejection_reason"], "사진이 불분명합니다");

    let (_, as_admin) = send(&app, Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(as_admin["rejection_reason"], "사진이 불분명합니다");
}

#[tokio::test]
async fn test_account_recovery() {
    let app = app();

    let (status, found) = send(
        &app,
        Method::POST,
        "/api/auth/find-id",
        None,
        Some(json!({ "name": "김판매", "phone": "010-1111-1111" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["username"], "sel***");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/find-id",
        None,
        Some(json!({ "name": "김판매", "phone": "010-9999-9999" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, taken) = send(&app, Method::POST, "/api/auth/check-phone", None, Some(json!({ "phone": "010-1111-1111" }))).await;
    assert_eq!(taken["available"], false);
    let (_, free) = send(&app, Method::POST, "/api/auth/check-phone", None, Some(json!({ "phone": "010-3333-3333" }))).await;
    assert_eq!(free["available"], true);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/reset-password",
        None,
        Some(json!({ "username": "seller", "phone": "010-0000-1234", "new_password": "another-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/reset-password",
        None,
        Some(json!({ "username": "seller", "phone": "010-1111-1111", "new_password": "another-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    login(&app, "seller", "another-pass").await;
}

#[tokio::test]
async fn test_registration_requests() {
    let app = app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/registration-requests",
        None,
        Some(json!({ "email": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, request) = send(
        &app,
        Method::POST,
        "/api/registration-requests",
        None,
        Some(json!({ "email": "owner@example.com", "bank_name": "국민은행" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "pending");

    let admin = login(&app, "admin", "admin1234").await;
    let id = request["id"].as_str().unwrap();
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/admin/registration-requests/{}/status", id),
        Some(&admin),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "approved");

    let (_, pending) = send(&app, Method::GET, "/api/admin/registration-requests?status=pending", Some(&admin), None).await;
    assert!(pending.as_array().unwrap().is_empty());
    let (_, all) = send(&app, Method::GET, "/api/admin/registration-requests", Some(&admin), None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_license_submission_and_review() {
    let app = app();
    let buyer = login(&app, "buyer", "buyer1234").await;

    let (status, license) = send(
        &app,
        Method::POST,
        "/api/users/me/licenses",
        Some(&buyer),
        Some(json!({ "file_url": "https://files.example.com/license.pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(license["status"], "pending");

    let admin = login(&app, "admin", "admin1234").await;
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/admin/business-licenses/{}/status", license["id"].as_str().unwrap()),
        Some(&admin),
        Some(json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, licenses) = send(&app, Method::GET, "/api/users/me/licenses", Some(&buyer), None).await;
    assert_eq!(licenses[0]["status"], "rejected");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/nothing-here", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}
