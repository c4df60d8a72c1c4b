mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{app_state, seed_shop, Shop, PASSWORD};
use serde_json::{json, Value};
use tenant_ledger::{db::MemoryStore, routes::build_router};
use tower::ServiceExt;

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
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
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

// POST cru em /api/auth/login, sem passar o corpo pelo serde_json
async fn post_login_raw(app: &Router, content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(Method::POST).uri("/api/auth/login");
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn setup() -> (Router, MemoryStore, Shop) {
    let store = MemoryStore::new();
    let shop = seed_shop(&store, "acme", "ana@acme.com").await;
    (build_router(app_state(&store)), store, shop)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "subdomain": "acme", "email": "ana@acme.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _, _) = setup().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Healthy");
    assert!(body["timestamp"].is_string());
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn login_success_and_uniform_failure_shape() {
    let (app, _, shop) = setup().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "subdomain": "acme", "email": "ana@acme.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["tenantId"], shop.tenant_id);
    assert_eq!(body["userId"], shop.user_id);
    assert!(body["token"].is_string());

    let wrong_password = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "subdomain": "acme", "email": "ana@acme.com", "password": "nope" })),
    )
    .await;
    let unknown_tenant = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "subdomain": "globex", "email": "ana@acme.com", "password": PASSWORD })),
    )
    .await;
    let missing_fields = send(&app, Method::POST, "/api/auth/login", None, Some(json!({}))).await;
    let null_field = post_login_raw(
        &app,
        Some("application/json"),
        r#"{"subdomain":"acme","email":null,"password":"x"}"#,
    )
    .await;
    let non_string_field = post_login_raw(
        &app,
        Some("application/json"),
        r#"{"subdomain":"acme","email":5,"password":"x"}"#,
    )
    .await;
    let not_json = post_login_raw(&app, Some("application/json"), "not json").await;
    let no_content_type = post_login_raw(
        &app,
        None,
        r#"{"subdomain":"acme","email":"ana@acme.com","password":"x"}"#,
    )
    .await;

    for (status, body) in [
        &wrong_password,
        &unknown_tenant,
        &missing_fields,
        &null_field,
        &non_string_field,
        &not_json,
        &no_content_type,
    ] {
        assert_eq!(*status, StatusCode::UNAUTHORIZED);
        assert_eq!(*body, json!({ "success": false, "message": "Credenciais inválidas." }));
    }
}

#[tokio::test]
async fn guarded_routes_require_a_valid_bearer_token() {
    let (app, _, shop) = setup().await;
    let uri = format!("/api/inventory/stock?productId={}&warehouseId={}", shop.product_id, shop.w1);

    let (status, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, &uri, Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn purchase_sale_and_transfer_over_http() {
    let (app, _, shop) = setup().await;
    let token = login(&app).await;
    let p = shop.product_id;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/inventory/purchases",
        Some(&token),
        Some(json!({ "productId": p, "warehouseId": shop.w1, "quantity": 10, "unitPrice": 2.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], 10);
    assert_eq!(body["kind"], "PURCHASE");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/inventory/sales",
        Some(&token),
        Some(json!({ "productId": p, "warehouseId": shop.w1, "quantity": 7, "unitPrice": 3.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/inventory/sales",
        Some(&token),
        Some(json!({ "productId": p, "warehouseId": shop.w1, "quantity": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/inventory/transfers",
        Some(&token),
        Some(json!({ "productId": p, "fromWarehouseId": shop.w1, "toWarehouseId": shop.w2, "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["out"]["quantity"], -3);
    assert_eq!(body["in"]["quantity"], 3);

    let uri = format!("/api/inventory/stock?productId={p}&warehouseId={}", shop.w2);
    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 3);

    let uri = format!("/api/inventory/movements?productId={p}");
    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn validation_and_not_found_map_to_client_errors() {
    let (app, _, shop) = setup().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/inventory/purchases",
        Some(&token),
        Some(json!({ "productId": shop.product_id, "warehouseId": shop.w1, "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["quantity"].is_array());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/inventory/adjustments",
        Some(&token),
        Some(json!({ "productId": shop.product_id, "warehouseId": shop.w1, "quantityDelta": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/inventory/purchases",
        Some(&token),
        Some(json!({ "productId": 424242, "warehouseId": shop.w1, "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn token_for_a_deactivated_tenant_is_refused_by_the_ledger() {
    let (app, store, shop) = setup().await;
    let token = login(&app).await;
    store.set_tenant_active(shop.tenant_id, false).await;

    let uri = format!("/api/inventory/stock?productId={}&warehouseId={}", shop.product_id, shop.w1);
    let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn me_and_feature_endpoints_use_the_token() {
    let (app, store, shop) = setup().await;
    let module = store.add_module("crm", true).await;
    store.set_tenant_module(shop.tenant_id, module, true).await;
    let token = login(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], shop.user_id);
    assert_eq!(body["tenantId"], shop.tenant_id);
    assert_eq!(body["email"], "ana@acme.com");

    let (status, body) = send(&app, Method::GET, "/api/features/crm", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "module": "crm", "enabled": true }));

    let (_, body) = send(&app, Method::GET, "/api/features/billing", Some(&token), None).await;
    assert_eq!(body["enabled"], false);
}
