//! Router tests for the catalog API.
//!
//! Drive the real router in-process with `tower::ServiceExt::oneshot` over
//! the in-memory stores, so no database or network is needed.

#![allow(clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use chrono::{TimeDelta, Utc};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use atelier_api::config::ApiConfig;
use atelier_api::db::memory::MemoryStore;
use atelier_api::routes::app;
use atelier_api::services::token::TokenService;
use atelier_api::state::AppState;

const JWT_SECRET: &str = "kT9#vQ2$mW7@pL4!xR8^nB3&cF6*hJ1%";

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://unused@localhost/atelier"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        jwt_secret: SecretString::from(JWT_SECRET),
        token_ttl: TimeDelta::minutes(30),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_stores(&test_config(), store.clone(), store.clone());
    TestApp {
        router: app(state),
        store,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token, None)).await
    }

    async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: &Value,
    ) -> TestResponse {
        self.send(request(method, uri, token, Some(body))).await
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        self.json(
            Method::POST,
            "/register",
            None,
            &json!({"username": username, "email": email, "password": password}),
        )
        .await
    }

    async fn login(&self, username: &str, password: &str) -> TestResponse {
        let body = format!("username={username}&password={password}");
        let request = Request::builder()
            .method(Method::POST)
            .uri("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Register alice and return a bearer token for her.
    async fn alice_token(&self) -> String {
        let response = self
            .register("alice", "alice@x.com", "password123")
            .await;
        assert_eq!(response.status, StatusCode::OK);
        let response = self.login("alice", "password123").await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    async fn create_shirt(&self, token: &str) -> Value {
        let response = self
            .json(
                Method::POST,
                "/items",
                Some(token),
                &json!({"name": "Shirt", "price": 19.99, "description": "cotton"}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()
    }
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn assert_unauthorized(response: &TestResponse) {
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers.get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

// ============================================================================
// Public Routes
// ============================================================================

#[tokio::test]
async fn test_welcome() {
    let app = test_app();
    let response = app.get("/", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"Welcome to the API");
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = test_app();
    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"ok");

    let response = app.get("/health/ready", None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_generated_and_propagated() {
    let app = test_app();

    let response = app.get("/", None).await;
    let generated = response.headers.get("x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());

    let request = Request::builder()
        .uri("/items")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.headers.get("x-request-id").unwrap(), "req-42");
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_then_duplicate() {
    let app = test_app();

    let response = app.register("alice", "alice@x.com", "password123").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"username": "alice", "email": "alice@x.com"})
    );

    let response = app.register("alice", "alice@x.com", "password123").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json(), json!({"detail": "Username already taken"}));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = test_app();
    app.register("alice", "alice@x.com", "password123").await;

    let response = app.register("bob", "alice@x.com", "password123").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"detail": "Email already registered"})
    );
}

#[tokio::test]
async fn test_register_invalid_input() {
    let app = test_app();

    for (username, email, password) in [
        ("", "a@x.com", "password123"),
        ("   ", "a@x.com", "password123"),
        ("alice", "not-an-email", "password123"),
        ("alice", "alice@x.com", "short"),
    ] {
        let response = app.register(username, email, password).await;
        assert_eq!(
            response.status,
            StatusCode::UNPROCESSABLE_ENTITY,
            "{username:?} {email:?} {password:?}"
        );
        assert!(response.json()["detail"].is_string());
    }
}

#[tokio::test]
async fn test_register_malformed_body() {
    let app = test_app();

    let response = app
        .json(Method::POST, "/register", None, &json!({"username": "alice"}))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json()["detail"].is_string());
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_returns_bearer_token() {
    let app = test_app();
    app.register("alice", "alice@x.com", "password123").await;

    let response = app.login("alice", "password123").await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["token_type"], "bearer");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert!(response.headers.get(header::WWW_AUTHENTICATE).is_none());
}

#[tokio::test]
async fn test_login_failures_are_identical() {
    let app = test_app();
    app.register("alice", "alice@x.com", "password123").await;

    let wrong_password = app.login("alice", "wrong-password").await;
    let unknown_user = app.login("nobody", "password123").await;

    assert_unauthorized(&wrong_password);
    assert_unauthorized(&unknown_user);
    assert_eq!(wrong_password.body, unknown_user.body);
    assert_eq!(
        wrong_password.json(),
        json!({"detail": "Incorrect username or password"})
    );
}

#[tokio::test]
async fn test_login_missing_field() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=alice"))
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Auth Guard
// ============================================================================

#[tokio::test]
async fn test_items_require_token() {
    let app = test_app();
    let token = app.alice_token().await;
    let item = app.create_shirt(&token).await;
    let existing = format!("/items/{}", item["id"]);

    for uri in ["/items", existing.as_str(), "/items/999"] {
        assert_unauthorized(&app.get(uri, None).await);
        assert_unauthorized(&app.get(uri, Some("garbage")).await);
    }
    assert_unauthorized(
        &app.send(request(Method::DELETE, &existing, None, None))
            .await,
    );
    assert_unauthorized(
        &app.json(Method::POST, "/items", None, &json!({"name": "Hat", "price": 5}))
            .await,
    );
}

#[tokio::test]
async fn test_wrong_scheme_rejected() {
    let app = test_app();
    let token = app.alice_token().await;

    let request = Request::builder()
        .uri("/items")
        .header(header::AUTHORIZATION, format!("Basic {token}"))
        .body(Body::empty())
        .unwrap();
    assert_unauthorized(&app.send(request).await);
}

#[tokio::test]
async fn test_token_failures_are_indistinguishable() {
    let app = test_app();
    app.alice_token().await;

    let tokens = TokenService::new(&SecretString::from(JWT_SECRET), TimeDelta::minutes(30));
    let expired = tokens
        .issue_at(
            "alice",
            Utc::now() - TimeDelta::hours(2),
            TimeDelta::minutes(30),
        )
        .unwrap();
    let forged = TokenService::new(
        &SecretString::from("Zp4!rN8@tY2#wQ6$eU1%oI5^aS9&dG3*"),
        TimeDelta::minutes(30),
    )
    .issue("alice")
    .unwrap();

    let expired = app.get("/items", Some(&expired)).await;
    let forged = app.get("/items", Some(&forged)).await;
    let garbage = app.get("/items", Some("not.a.token")).await;

    assert_unauthorized(&expired);
    assert_eq!(expired.body, forged.body);
    assert_eq!(expired.body, garbage.body);
}

#[tokio::test]
async fn test_token_for_deleted_user_rejected() {
    let app = test_app();
    let token = app.alice_token().await;
    assert_eq!(app.get("/items", Some(&token)).await.status, StatusCode::OK);

    assert!(app.store.remove_user("alice").await);

    assert_unauthorized(&app.get("/items", Some(&token)).await);
}

// ============================================================================
// Items
// ============================================================================

#[tokio::test]
async fn test_create_and_read_item() {
    let app = test_app();
    let token = app.alice_token().await;

    let created = app.create_shirt(&token).await;
    assert!(created["id"].is_i64());
    assert_eq!(created["name"], "Shirt");
    assert_eq!(created["price"], 19.99);
    assert_eq!(created["description"], "cotton");

    let response = app
        .get(&format!("/items/{}", created["id"]), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), created);
}

#[tokio::test]
async fn test_description_defaults_to_empty() {
    let app = test_app();
    let token = app.alice_token().await;

    let response = app
        .json(
            Method::POST,
            "/items",
            Some(&token),
            &json!({"name": "Hat", "price": 5}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["description"], "");
}

#[tokio::test]
async fn test_create_validation() {
    let app = test_app();
    let token = app.alice_token().await;

    for body in [
        json!({"name": "", "price": 5}),
        json!({"name": "Hat", "price": 0}),
        json!({"name": "Hat", "price": -1.5}),
        json!({"name": "Hat", "price": "cheap"}),
        json!({"price": 5}),
        json!({"name": "Hat"}),
    ] {
        let response = app.json(Method::POST, "/items", Some(&token), &body).await;
        assert_eq!(
            response.status,
            StatusCode::UNPROCESSABLE_ENTITY,
            "{body}"
        );
        assert!(response.json()["detail"].is_string());
    }
}

#[tokio::test]
async fn test_list_items_ordered_by_id() {
    let app = test_app();
    let token = app.alice_token().await;

    let response = app.get("/items", Some(&token)).await;
    assert_eq!(response.json(), json!([]));

    let first = app.create_shirt(&token).await;
    let second = app.create_shirt(&token).await;

    let response = app.get("/items", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([first, second]));
}

#[tokio::test]
async fn test_put_replaces_every_field() {
    let app = test_app();
    let token = app.alice_token().await;
    let created = app.create_shirt(&token).await;
    let uri = format!("/items/{}", created["id"]);

    let response = app
        .json(
            Method::PUT,
            &uri,
            Some(&token),
            &json!({"name": "Tee", "price": 9.5}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"id": created["id"], "name": "Tee", "price": 9.5, "description": ""})
    );

    let response = app
        .json(
            Method::PUT,
            &uri,
            Some(&token),
            &json!({"name": "Tee", "price": 0}),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_patch_changes_only_present_fields() {
    let app = test_app();
    let token = app.alice_token().await;
    let created = app.create_shirt(&token).await;
    let uri = format!("/items/{}", created["id"]);

    let response = app
        .json(Method::PATCH, &uri, Some(&token), &json!({"price": 24.99}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({
            "id": created["id"],
            "name": "Shirt",
            "price": 24.99,
            "description": "cotton"
        })
    );

    let response = app
        .json(Method::PATCH, &uri, Some(&token), &json!({}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["price"], 24.99);

    let response = app
        .json(Method::PATCH, &uri, Some(&token), &json!({"name": ""}))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_item_is_not_found() {
    let app = test_app();
    let token = app.alice_token().await;

    let response = app.get("/items/999", Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json(), json!({"detail": "Item not found"}));

    let response = app
        .json(
            Method::PUT,
            "/items/999",
            Some(&token),
            &json!({"name": "Tee", "price": 9.5}),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    for body in [json!({"price": 1.0}), json!({})] {
        let response = app
            .json(Method::PATCH, "/items/999", Some(&token), &body)
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_non_integer_id_is_validation_error() {
    let app = test_app();
    let token = app.alice_token().await;

    let response = app.get("/items/abc", Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json(), json!({"detail": "id: must be an integer"}));

    let response = app.get("/items/99999999999", Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json(), json!({"detail": "id: must be an integer"}));
}

#[tokio::test]
async fn test_delete_item() {
    let app = test_app();
    let token = app.alice_token().await;

    let response = app
        .send(request(Method::DELETE, "/items/999", Some(&token), None))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let created = app.create_shirt(&token).await;
    let uri = format!("/items/{}", created["id"]);

    let response = app
        .send(request(Method::DELETE, &uri, Some(&token), None))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"message": "Item deleted"}));

    let response = app.get(&uri, Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_any_user_may_mutate_any_item() {
    let app = test_app();
    let alice = app.alice_token().await;
    let created = app.create_shirt(&alice).await;

    app.register("bob", "bob@x.com", "password456").await;
    let bob = app.login("bob", "password456").await.json()["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .send(request(
            Method::DELETE,
            &format!("/items/{}", created["id"]),
            Some(&bob),
            None,
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK);
}
