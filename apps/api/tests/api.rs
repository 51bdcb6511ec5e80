//! Router tests: requests go through the full axum stack against an
//! in-memory database.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use grill_api::{build_router, AppState};
use grill_db::{CheckoutOptions, Database, DbConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    build_router(AppState::new(db, CheckoutOptions::default()))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        request = request.header("x-user-id", user);
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, user) = send(
        app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "email": email, "name": "Ana" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    user["id"].as_str().unwrap().to_string()
}

/// Classic Burger made from one Bun each; returns (product id, bun id).
async fn burger_with_buns(app: &Router, buns: u32) -> (String, String) {
    let (status, bun) = send(
        app,
        Method::POST,
        "/api/ingredients",
        None,
        Some(json!({
            "name": "Bun",
            "unit": "unit",
            "stock": buns,
            "package_price_cents": 1200,
            "package_size": 24
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{bun}");

    let (status, burger) = send(
        app,
        Method::POST,
        "/api/products",
        None,
        Some(json!({ "name": "Classic Burger", "price_cents": 899 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{burger}");

    let burger_id = burger["id"].as_str().unwrap().to_string();
    let bun_id = bun["id"].as_str().unwrap().to_string();

    let (status, lines) = send(
        app,
        Method::POST,
        &format!("/api/products/{burger_id}/recipe"),
        None,
        Some(json!([{ "ingredient_id": bun_id, "quantity_per_unit": 1 }])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{lines}");

    (burger_id, bun_id)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn cart_is_capped_by_ingredient_stock_and_checkout_deducts_it() {
    let app = app().await;
    let user = register(&app, "ana@example.com").await;
    let (burger, bun) = burger_with_buns(&app, 10).await;

    let (status, availability) = send(
        &app,
        Method::GET,
        &format!("/api/products/{burger}/availability"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(availability["availability"], json!({ "kind": "limited", "units": 10 }));
    assert_eq!(availability["limited_by"], "Bun");

    let (status, err) = send(
        &app,
        Method::POST,
        "/api/cart/items",
        Some(&user),
        Some(json!({ "product_id": burger, "quantity": 12 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "INSUFFICIENT_STOCK");

    let (status, cart) = send(
        &app,
        Method::POST,
        "/api/cart/items",
        Some(&user),
        Some(json!({ "product_id": burger, "quantity": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 10);
    assert_eq!(cart["total_cents"], 8990);

    let (status, order) = send(
        &app,
        Method::POST,
        "/api/cart/checkout",
        Some(&user),
        Some(json!({ "delivery_type": "pickup", "payment_method": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["status"], "pending");
    assert_eq!(order["lines"].as_array().unwrap().len(), 1);

    let (_, ingredient) = send(&app, Method::GET, &format!("/api/ingredients/{bun}"), None, None).await;
    assert_eq!(ingredient["stock"], "0.00");

    let (_, movements) = send(
        &app,
        Method::GET,
        &format!("/api/inventory/movements?ingredient_id={bun}"),
        None,
        None,
    )
    .await;
    let newest = &movements.as_array().unwrap()[0];
    assert_eq!(newest["kind"], "out");
    assert_eq!(newest["stock_before"], "10.00");
    assert_eq!(newest["stock_after"], "0.00");

    let (_, cart) = send(&app, Method::GET, "/api/cart", Some(&user), None).await;
    assert_eq!(cart["item_count"], 0);

    let (_, menu) = send(&app, Method::GET, "/api/menu?available_only=true", None, None).await;
    assert!(menu.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn caller_identity_is_required() {
    let app = app().await;
    let (status, err) = send(&app, Method::GET, "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["code"], "UNAUTHORIZED");

    let (status, err) = send(&app, Method::GET, "/api/users/me", Some("nobody"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");
}

#[tokio::test]
async fn invalid_input_is_a_structured_400() {
    let app = app().await;
    let (_, bun) = burger_with_buns(&app, 5).await;

    let (status, err) = send(
        &app,
        Method::POST,
        &format!("/api/ingredients/{bun}/adjust"),
        None,
        Some(json!({ "new_stock": 3, "reason": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION_ERROR");
    assert_eq!(err["field"], "reason");

    let (status, err) = send(
        &app,
        Method::POST,
        "/api/products",
        None,
        Some(json!({ "name": "Fries" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/cart/checkout",
        Some("someone"),
        Some(json!({ "delivery_type": "delivery", "payment_method": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn adjustment_always_records_a_movement() {
    let app = app().await;
    let (_, bun) = burger_with_buns(&app, 5).await;

    let (status, movement) = send(
        &app,
        Method::POST,
        &format!("/api/ingredients/{bun}/adjust"),
        None,
        Some(json!({ "new_stock": 5, "reason": "Weekly count" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(movement["kind"], "adjustment");
    assert_eq!(movement["stock_before"], "5.00");
    assert_eq!(movement["stock_after"], "5.00");
    assert_eq!(movement["reason"], "Weekly count");
}

#[tokio::test]
async fn orders_are_private_and_follow_the_status_machine() {
    let app = app().await;
    let ana = register(&app, "ana@example.com").await;
    let ben = register(&app, "ben@example.com").await;
    let (burger, _) = burger_with_buns(&app, 5).await;

    send(
        &app,
        Method::POST,
        "/api/cart/items",
        Some(&ana),
        Some(json!({ "product_id": burger, "quantity": 1 })),
    )
    .await;
    let (_, order) = send(
        &app,
        Method::POST,
        "/api/cart/checkout",
        Some(&ana),
        Some(json!({
            "delivery_type": "delivery",
            "payment_method": "card",
            "delivery_address": "742 Evergreen Terrace"
        })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::GET, &format!("/api/orders/{order_id}"), Some(&ben), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, invoice) = send(
        &app,
        Method::GET,
        &format!("/api/orders/{order_id}/invoice"),
        Some(&ana),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["total_cents"], 899);

    let status_uri = format!("/api/staff/orders/{order_id}/status");
    let (status, err) = send(&app, Method::PUT, &status_uri, None, Some(json!({ "status": "ready" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["field"], "status");

    let (status, updated) =
        send(&app, Method::PUT, &status_uri, None, Some(json!({ "status": "preparing" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "preparing");

    let (_, preparing) = send(&app, Method::GET, "/api/staff/orders?status=preparing", None, None).await;
    assert_eq!(preparing.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn finished_goods_stock_requires_tracking() {
    let app = app().await;
    let (burger, _) = burger_with_buns(&app, 5).await;

    let (status, err) = send(
        &app,
        Method::PUT,
        &format!("/api/products/{burger}/stock"),
        None,
        Some(json!({ "stock": 20 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn promotion_codes_discount_the_order() {
    let app = app().await;
    let ana = register(&app, "ana@example.com").await;
    let (burger, _) = burger_with_buns(&app, 5).await;

    let (status, promo) = send(
        &app,
        Method::POST,
        "/api/promotions",
        None,
        Some(json!({
            "code": "grill10",
            "description": "Ten percent off",
            "percent_off_bp": 1000,
            "starts_at": "2020-01-01T00:00:00Z",
            "ends_at": "2099-12-31T23:59:59Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{promo}");
    assert_eq!(promo["code"], "GRILL10");

    send(
        &app,
        Method::POST,
        "/api/cart/items",
        Some(&ana),
        Some(json!({ "product_id": burger, "quantity": 2 })),
    )
    .await;

    let (status, err) = send(
        &app,
        Method::POST,
        "/api/cart/checkout",
        Some(&ana),
        Some(json!({ "delivery_type": "pickup", "payment_method": "cash", "promo_code": "NOPE" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["field"], "promo_code");

    let (status, order) = send(
        &app,
        Method::POST,
        "/api/cart/checkout",
        Some(&ana),
        Some(json!({ "delivery_type": "pickup", "payment_method": "cash", "promo_code": "Grill10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    // 10 % of 17.98 = 1.798
    assert_eq!(order["discount_cents"], 180);
    assert_eq!(order["total_cents"], 1618);

    let order_id = order["id"].as_str().unwrap();
    let (_, invoice) = send(
        &app,
        Method::GET,
        &format!("/api/orders/{order_id}/invoice"),
        Some(&ana),
        None,
    )
    .await;
    assert_eq!(invoice["subtotal_cents"], 1798);
    assert_eq!(invoice["discount_cents"], 180);
    assert_eq!(invoice["promotion_code"], "GRILL10");

    let promo_id = promo["id"].as_str().unwrap();
    let (status, _) = send(&app, Method::DELETE, &format!("/api/promotions/{promo_id}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/api/promotions/{promo_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_recipe_ratio_is_a_400() {
    let app = app().await;
    let (burger, bun) = burger_with_buns(&app, 5).await;

    let (status, err) = send(
        &app,
        Method::POST,
        &format!("/api/products/{burger}/recipe"),
        None,
        Some(json!([{ "ingredient_id": bun, "quantity_per_unit": "100000000" }])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{err}");
    assert_eq!(err["field"], "quantity_per_unit");
}
