//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /              - Welcome message
//! GET    /health        - Liveness
//! GET    /health/ready  - Readiness (database)
//!
//! # Auth
//! POST   /register      - Create an account (JSON)
//! POST   /token         - Login, returns a bearer token (form)
//!
//! # Items (bearer token required)
//! GET    /items         - List items
//! POST   /items         - Create item
//! GET    /items/{id}    - Get item
//! PUT    /items/{id}    - Replace item
//! PATCH  /items/{id}    - Update some fields
//! DELETE /items/{id}    - Delete item
//! ```

pub mod auth;
pub mod extract;
pub mod home;
pub mod items;

use axum::{
    Router,
    extract::Request,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the item routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(items::list).post(items::create))
        .route(
            "/{id}",
            get(items::show)
                .put(items::replace)
                .patch(items::patch)
                .delete(items::delete),
        )
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::welcome))
        .route("/health", get(home::health))
        .route("/health/ready", get(home::readiness))
        .route("/register", post(auth::register))
        .route("/token", post(auth::token))
        .nest("/items", item_routes())
}

/// Build the complete application with middleware.
pub fn app(state: AppState) -> Router {
    routes()
        .with_state(state)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                user_id = tracing::field::Empty,
            )
        }))
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
