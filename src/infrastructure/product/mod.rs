//! Product infrastructure: repositories and the catalog service

pub mod postgres_repository;
pub mod repository;
pub mod service;

pub use postgres_repository::PostgresProductRepository;
pub use repository::InMemoryProductRepository;
pub use service::{
    AddImageRequest, CreateProductRequest, ProductDetail, ProductService, UpdateProductRequest,
};
