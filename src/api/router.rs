use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth;
use super::cart;
use super::health;
use super::products;
use super::state::AppState;
use super::users;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Probes (readiness needs the pool from state)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        // Public + authed API
        .nest("/api/auth", auth::router())
        .nest("/api/productos", products::router())
        .nest("/api/carrito", cart::router())
        .nest("/api/user", users::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
