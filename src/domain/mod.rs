//! Domain layer: entities, validation and repository traits

pub mod cart;
pub mod error;
pub mod product;
pub mod user;

pub use error::DomainError;
