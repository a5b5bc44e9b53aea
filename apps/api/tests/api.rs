//! End-to-end tests over the HTTP router.
//!
//! Each test drives the real router against an in-memory database, so
//! the full path (extractors, role guards, repositories, checkout
//! transaction, error rendering) is exercised exactly as in
//! production, minus the TCP listener.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use bazaar_api::auth::hash_password;
use bazaar_api::notifier::spawn_notifier;
use bazaar_api::{ApiConfig, AppState};
use bazaar_core::Role;
use bazaar_db::repository::user::NewUser;
use bazaar_db::{Database, DbConfig};

struct TestApp {
    router: Router,
    db: Database,
}

async fn spawn_app() -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let config = ApiConfig {
        http_port: 0,
        database_path: ":memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_access_lifetime_secs: 3600,
        jwt_refresh_lifetime_secs: 86400,
        stock_scan_interval_secs: 900,
        daily_summary_interval_secs: 86400,
    };

    let (notifier, _handle) = spawn_notifier(db.clone(), Arc::new(bazaar_api::notifier::LogMailer));
    let state = Arc::new(AppState::new(db.clone(), notifier, config));

    TestApp {
        router: bazaar_api::routes::router(state),
        db,
    }
}

impl TestApp {
    async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
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

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    /// Register a customer through the API and return an access token.
    async fn register_customer(&self, email: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "name": "Casey",
                    "age": 28,
                    "password": "supersecret",
                    "password2": "supersecret",
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        body["token"]["access"].as_str().unwrap().to_string()
    }

    /// Seed a staff account directly (registration of staff roles
    /// requires an existing admin) and log it in.
    async fn login_seeded_staff(&self, email: &str, role: Role) -> String {
        self.db
            .users()
            .create(NewUser {
                email: email.to_string(),
                name: "Staff".to_string(),
                age: 35,
                password_hash: hash_password("supersecret").unwrap(),
                role,
            })
            .await
            .unwrap();

        let (status, body) = self
            .request(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": "supersecret" })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        body["token"]["access"].as_str().unwrap().to_string()
    }

    async fn create_product(
        &self,
        staff_token: &str,
        name: &str,
        price_cents: i64,
        quantity: i64,
    ) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/products",
                Some(staff_token),
                Some(json!({
                    "name": name,
                    "price_cents": price_cents,
                    "quantity": quantity,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_register_then_login() {
    let app = spawn_app().await;

    let (status, body) = app
        .request(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "email": "casey@example.com",
                "name": "Casey",
                "age": 28,
                "password": "supersecret",
                "password2": "supersecret",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Registration Successful!");
    assert!(body["token"]["access"].is_string());
    assert!(body["token"]["refresh"].is_string());

    let (status, body) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "casey@example.com", "password": "supersecret" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login Successful!");
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = spawn_app().await;

    // Mismatched password confirmation.
    let (status, _) = app
        .request(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "email": "a@example.com",
                "name": "A",
                "age": 28,
                "password": "supersecret",
                "password2": "different11",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Under-age account.
    let (status, _) = app
        .request(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "email": "a@example.com",
                "name": "A",
                "age": 17,
                "password": "supersecret",
                "password2": "supersecret",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_staff_registration_requires_admin() {
    let app = spawn_app().await;

    let (status, _) = app
        .request(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "email": "rogue@example.com",
                "name": "Rogue",
                "age": 30,
                "password": "supersecret",
                "password2": "supersecret",
                "role": "EMPLOYEE",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);

    // With an admin token the same request succeeds.
    let admin = app.login_seeded_staff("admin@example.com", Role::Admin).await;
    let (status, _) = app
        .request(
            "POST",
            "/auth/register",
            Some(&admin),
            Some(json!({
                "email": "new-employee@example.com",
                "name": "Emery",
                "age": 30,
                "password": "supersecret",
                "password2": "supersecret",
                "role": "EMPLOYEE",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let app = spawn_app().await;
    app.register_customer("casey@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "casey@example.com", "password": "wrong-password" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_catalog_writes_are_role_gated() {
    let app = spawn_app().await;
    let customer = app.register_customer("casey@example.com").await;

    let payload = json!({ "name": "Widget", "price_cents": 1000, "quantity": 5 });

    // Unauthenticated.
    let (status, _) = app
        .request("POST", "/products", None, Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Customer.
    let (status, _) = app
        .request("POST", "/products", Some(&customer), Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Employee.
    let employee = app
        .login_seeded_staff("employee@example.com", Role::Employee)
        .await;
    let (status, _) = app
        .request("POST", "/products", Some(&employee), Some(payload))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Admin may manage the catalog too.
    let admin = app.login_seeded_staff("admin@example.com", Role::Admin).await;
    let (status, _) = app
        .request(
            "POST",
            "/products",
            Some(&admin),
            Some(json!({ "name": "Gadget", "price_cents": 2000, "quantity": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Reads stay public.
    let (status, body) = app.request("GET", "/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cart_requires_customer() {
    let app = spawn_app().await;
    let employee = app
        .login_seeded_staff("employee@example.com", Role::Employee)
        .await;

    let (status, _) = app.request("GET", "/cart", Some(&employee), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request("GET", "/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cart_add_unknown_product() {
    let app = spawn_app().await;
    let customer = app.register_customer("casey@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            "/cart/items",
            Some(&customer),
            Some(json!({ "product_id": "no-such-product", "quantity": 1 })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn test_full_checkout_flow() {
    let app = spawn_app().await;
    let employee = app
        .login_seeded_staff("employee@example.com", Role::Employee)
        .await;
    let customer = app.register_customer("casey@example.com").await;

    let product_id = app.create_product(&employee, "Widget", 10_000, 10).await;

    // Cart the product twice; the line accumulates.
    for _ in 0..2 {
        let (status, _) = app
            .request(
                "POST",
                "/cart/items",
                Some(&customer),
                Some(json!({ "product_id": product_id, "quantity": 1 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, cart) = app.request("GET", "/cart", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"][0]["quantity"], 2);

    // Checkout.
    let (status, bill) = app
        .request("POST", "/bills/generate", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bill["total_cents"], 20_000);
    assert_eq!(bill["items"][0]["name_snapshot"], "Widget");

    // Stock went down, cart is empty.
    let (_, product) = app
        .request("GET", &format!("/products/{product_id}"), None, None)
        .await;
    assert_eq!(product["quantity"], 8);

    let (_, cart) = app.request("GET", "/cart", Some(&customer), None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());

    // A second checkout finds nothing to bill.
    let (status, body) = app
        .request("POST", "/bills/generate", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cart is empty");

    // The bill is retrievable by its owner.
    let bill_id = bill["id"].as_str().unwrap();
    let (status, fetched) = app
        .request("GET", &format!("/bills/{bill_id}"), Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["total_cents"], 20_000);

    // But not by another customer.
    let other = app.register_customer("other@example.com").await;
    let (status, _) = app
        .request("GET", &format!("/bills/{bill_id}"), Some(&other), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_insufficient_stock() {
    let app = spawn_app().await;
    let employee = app
        .login_seeded_staff("employee@example.com", Role::Employee)
        .await;
    let customer = app.register_customer("casey@example.com").await;

    let product_id = app.create_product(&employee, "Scarce", 5_000, 2).await;

    let (status, _) = app
        .request(
            "POST",
            "/cart/items",
            Some(&customer),
            Some(json!({ "product_id": product_id, "quantity": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .request("POST", "/bills/generate", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Not enough stock for Scarce");

    // Stock and cart untouched.
    let (_, product) = app
        .request("GET", &format!("/products/{product_id}"), None, None)
        .await;
    assert_eq!(product["quantity"], 2);

    let (_, cart) = app.request("GET", "/cart", Some(&customer), None).await;
    assert_eq!(cart["items"][0]["quantity"], 5);
}
