//! Cart infrastructure: repositories and the cart service

pub mod postgres_repository;
pub mod repository;
pub mod service;

pub use postgres_repository::PostgresCartRepository;
pub use repository::InMemoryCartRepository;
pub use service::{CartService, CartView};
