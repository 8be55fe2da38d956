//! API layer - HTTP endpoints and middleware

pub mod auth;
pub mod cart;
pub mod health;
pub mod middleware;
pub mod products;
pub mod router;
pub mod state;
pub mod types;
pub mod users;

pub use middleware::{RequireUser, RequireVendor};
pub use router::create_router;
pub use state::AppState;
