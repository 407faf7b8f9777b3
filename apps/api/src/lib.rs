//! # Remedy API
//!
//! HTTP server for the Remedy pharmacy back office.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Request Flow                                    │
//! │                                                                         │
//! │  Client ──► axum Router ──► CurrentUser extractor ──► handler          │
//! │                                  │ (verify token)        │              │
//! │                                  │                       ▼              │
//! │                                  │                  authorize(role)     │
//! │                                  │                       │              │
//! │                                  ▼                       ▼              │
//! │                              401 on failure        repositories         │
//! │                                                    (remedy-db)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The router is exposed as a function over [`AppState`] so integration
//! tests can drive it without binding a socket.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use remedy_db::Database;

use crate::auth::AccessGate;

/// Shared application state.
///
/// Cloned per request by axum; both members are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub gate: AccessGate,
}

/// Builds the API router over the given state.
///
/// Route table (roles enforced inside the handlers):
///
/// | Route                      | Access        |
/// |----------------------------|---------------|
/// | `POST /api/auth/login`     | public        |
/// | `GET/POST /api/inventory`  | any role      |
/// | `PUT/DELETE /api/inventory/:id` | any role |
/// | `GET/POST /api/sales`      | any role      |
/// | `GET/POST /api/users`      | admin only    |
/// | `PUT/DELETE /api/users/:id`| admin only    |
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .route(
            "/api/inventory",
            get(routes::inventory::list_products).post(routes::inventory::create_product),
        )
        .route(
            "/api/inventory/:id",
            put(routes::inventory::update_product).delete(routes::inventory::delete_product),
        )
        .route(
            "/api/sales",
            get(routes::sales::list_sales).post(routes::sales::record_sale),
        )
        .route(
            "/api/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/api/users/:id",
            put(routes::users::update_user).delete(routes::users::delete_user),
        )
        .layer(TraceLayer::new_for_http())
        // The dashboard is served from another origin in development.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
