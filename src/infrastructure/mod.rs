//! Infrastructure layer: repositories, services and cross-cutting concerns

pub mod auth;
pub mod cart;
pub mod db;
pub mod logging;
pub mod media;
pub mod product;
pub mod user;
