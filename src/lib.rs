//! Campus Market API
//!
//! A second-hand marketplace for campus communities:
//! - Accounts with academic profiles, JWT authentication and a vendor role
//! - Product listings with images, owned by vendor accounts
//! - One active shopping cart per user with stock-guarded mutations
//! - Order history built from completed carts

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::auth::{JwtConfig, JwtService};
use infrastructure::cart::{CartService, PostgresCartRepository};
use infrastructure::db::{self, PostgresConfig};
use infrastructure::media::LocalFileStore;
use infrastructure::product::{PostgresProductRepository, ProductService};
use infrastructure::user::{Argon2Hasher, PostgresUserRepository, UserService};

/// Directory where upstream upload processing drops image files
const UPLOADS_DIR: &str = "uploads/products";

/// Build the application state from configuration: connect to Postgres,
/// ensure the schema exists and wire the services together.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let pool = db::connect(
        &PostgresConfig::new(&config.database.url)
            .with_max_connections(config.database.max_connections)
            .with_min_connections(config.database.min_connections),
    )
    .await?;

    db::ensure_schema(&pool).await?;

    let jwt_service = Arc::new(JwtService::new(JwtConfig::new(
        &config.auth.jwt_secret,
        config.auth.token_expiration_hours,
    )));

    let user_service = Arc::new(UserService::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(Argon2Hasher::new()),
    ));

    let product_service = Arc::new(ProductService::new(
        Arc::new(PostgresProductRepository::new(pool.clone())),
        Arc::new(LocalFileStore::new(UPLOADS_DIR)),
    ));

    let cart_service = Arc::new(CartService::new(Arc::new(PostgresCartRepository::new(
        pool.clone(),
    ))));

    Ok(AppState::new(
        user_service,
        product_service,
        cart_service,
        jwt_service,
        pool,
    ))
}
