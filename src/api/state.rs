//! Shared application state for API handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::cart::CartService;
use crate::infrastructure::product::ProductService;
use crate::infrastructure::user::UserService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub product_service: Arc<ProductService>,
    pub cart_service: Arc<CartService>,
    pub jwt_service: Arc<dyn JwtGenerator>,
    /// Pool handle kept for the readiness probe
    pub db: PgPool,
}

impl AppState {
    pub fn new(
        user_service: Arc<UserService>,
        product_service: Arc<ProductService>,
        cart_service: Arc<CartService>,
        jwt_service: Arc<dyn JwtGenerator>,
        db: PgPool,
    ) -> Self {
        Self {
            user_service,
            product_service,
            cart_service,
            jwt_service,
            db,
        }
    }
}
