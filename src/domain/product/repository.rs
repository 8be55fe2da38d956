//! Product repository trait

use async_trait::async_trait;

use super::{NewProduct, NewProductImage, Product, ProductImage, ProductOverview, ProductPatch};
use crate::domain::DomainError;

/// Repository for product listings and their images
#[async_trait]
pub trait ProductRepository: Send + Sync + std::fmt::Debug {
    /// All listings with their primary image, newest first
    async fn list(&self) -> Result<Vec<ProductOverview>, DomainError>;

    /// Listings owned by a vendor, newest first
    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<ProductOverview>, DomainError>;

    async fn get(&self, id: i64) -> Result<Option<Product>, DomainError>;

    async fn create(&self, new_product: NewProduct) -> Result<Product, DomainError>;

    /// Apply a partial update. `NotFound` when the product does not exist.
    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, DomainError>;

    /// Delete a product and its image rows atomically, returning the removed
    /// images so their files can be cleaned up. `NotFound` when absent.
    async fn delete(&self, id: i64) -> Result<Vec<ProductImage>, DomainError>;

    async fn images(&self, product_id: i64) -> Result<Vec<ProductImage>, DomainError>;

    async fn add_image(&self, new_image: NewProductImage) -> Result<ProductImage, DomainError>;

    async fn get_image(&self, image_id: i64) -> Result<Option<ProductImage>, DomainError>;

    /// Remove a single image row. `NotFound` when absent.
    async fn delete_image(&self, image_id: i64) -> Result<ProductImage, DomainError>;
}
