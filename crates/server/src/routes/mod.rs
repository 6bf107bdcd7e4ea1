//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Liveness check
//! GET    /health/ready          - Readiness check (store ping)
//!
//! # Auth
//! POST   /auth/register         - Create an account
//! POST   /auth/login            - Exchange email + password for a bearer token
//!
//! # Accounts (requires auth, self only)
//! GET    /accounts/me           - Caller's account
//! PUT    /accounts/{id}         - Update name, email, password
//! DELETE /accounts/{id}         - Delete account, lists, and items
//! GET    /accounts/{id}/lists   - Lists owned by the account
//!
//! # Lists (requires auth, owner only)
//! GET    /lists                 - Caller's lists
//! POST   /lists                 - Create a list
//! GET    /lists/{id}            - List detail
//! PUT    /lists/{id}            - Rename
//! DELETE /lists/{id}            - Delete list and its items
//! GET    /lists/{id}/items      - Items on a list
//!
//! # Items (requires auth, owner of the parent list only)
//! POST   /items                 - Create an item
//! GET    /items/{id}            - Item detail
//! PUT    /items/{id}            - Patch name, completed, quantity
//! DELETE /items/{id}            - Delete an item
//! POST   /items/batch-create    - Create many items on one list, all or nothing
//! DELETE /items/batch-delete    - Delete many items, all or nothing
//! ```

pub mod accounts;
pub mod auth;
mod extract;
pub mod items;
pub mod lists;

use axum::{
    Router,
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

pub use extract::{ApiJson, ApiPath};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// All API routes, without state or layers.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Accounts
        .route("/accounts/me", get(accounts::me))
        .route("/accounts/{id}", put(accounts::update).delete(accounts::delete))
        .route("/accounts/{id}/lists", get(accounts::lists))
        // Lists
        .route("/lists", get(lists::index).post(lists::create))
        .route(
            "/lists/{id}",
            get(lists::show).put(lists::rename).delete(lists::delete),
        )
        .route("/lists/{id}/items", get(lists::items))
        // Items
        .route("/items", post(items::create))
        .route("/items/batch-create", post(items::batch_create))
        .route("/items/batch-delete", delete(items::batch_delete))
        .route(
            "/items/{id}",
            get(items::show).put(items::update).delete(items::delete),
        )
}

/// The complete application: routes, state, tracing, and request IDs.
///
/// Sentry layers are added by the binary so tests can drive this router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    matched_path,
                    request_id = tracing::field::Empty,
                    account_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
