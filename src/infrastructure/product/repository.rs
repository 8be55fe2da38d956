//! In-memory product repository implementation

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::product::{
    NewProduct, NewProductImage, Product, ProductImage, ProductOverview, ProductPatch,
    ProductRepository,
};
use crate::domain::DomainError;

/// In-memory implementation of ProductRepository, used by service tests
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<i64, Product>>>,
    images: Arc<RwLock<HashMap<i64, ProductImage>>>,
    next_product_id: AtomicI64,
    next_image_id: AtomicI64,
}

impl InMemoryProductRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            products: Arc::new(RwLock::new(HashMap::new())),
            images: Arc::new(RwLock::new(HashMap::new())),
            next_product_id: AtomicI64::new(1),
            next_image_id: AtomicI64::new(1),
        }
    }

    async fn overview_of(&self, product: Product) -> ProductOverview {
        let images = self.images.read().await;

        let image_url = images
            .values()
            .filter(|img| img.product_id == product.id)
            .min_by_key(|img| img.id)
            .map(|img| img.url.clone());

        // No user store here; the seller name only exists in the SQL path
        ProductOverview {
            product,
            owner_name: None,
            image_url,
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<ProductOverview>, DomainError> {
        let mut result: Vec<Product> = {
            let products = self.products.read().await;
            products.values().cloned().collect()
        };
        result.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(b.id.cmp(&a.id)));

        let mut overviews = Vec::with_capacity(result.len());
        for product in result {
            overviews.push(self.overview_of(product).await);
        }

        Ok(overviews)
    }

    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<ProductOverview>, DomainError> {
        let mut result: Vec<Product> = {
            let products = self.products.read().await;
            products
                .values()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect()
        };
        result.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(b.id.cmp(&a.id)));

        let mut overviews = Vec::with_capacity(result.len());
        for product in result {
            overviews.push(self.overview_of(product).await);
        }

        Ok(overviews)
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, DomainError> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn create(&self, new_product: NewProduct) -> Result<Product, DomainError> {
        let mut products = self.products.write().await;

        let id = self.next_product_id.fetch_add(1, Ordering::SeqCst);
        let product = Product {
            id,
            name: new_product.name,
            description: new_product.description,
            stock: new_product.stock,
            price: new_product.price,
            condition: new_product.condition,
            user_id: new_product.user_id,
            published_at: Utc::now(),
        };

        products.insert(id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, DomainError> {
        let mut products = self.products.write().await;

        let product = products
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("Product '{}' not found", id)))?;

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(condition) = patch.condition {
            product.condition = condition;
        }

        Ok(product.clone())
    }

    async fn delete(&self, id: i64) -> Result<Vec<ProductImage>, DomainError> {
        let mut products = self.products.write().await;
        let mut images = self.images.write().await;

        if products.remove(&id).is_none() {
            return Err(DomainError::not_found(format!("Product '{}' not found", id)));
        }

        let removed: Vec<ProductImage> = images
            .values()
            .filter(|img| img.product_id == id)
            .cloned()
            .collect();
        for image in &removed {
            images.remove(&image.id);
        }

        Ok(removed)
    }

    async fn images(&self, product_id: i64) -> Result<Vec<ProductImage>, DomainError> {
        let images = self.images.read().await;

        let mut result: Vec<ProductImage> = images
            .values()
            .filter(|img| img.product_id == product_id)
            .cloned()
            .collect();
        result.sort_by_key(|img| img.id);

        Ok(result)
    }

    async fn add_image(&self, new_image: NewProductImage) -> Result<ProductImage, DomainError> {
        let products = self.products.read().await;
        if !products.contains_key(&new_image.product_id) {
            return Err(DomainError::not_found(format!(
                "Product '{}' not found",
                new_image.product_id
            )));
        }

        let mut images = self.images.write().await;

        let id = self.next_image_id.fetch_add(1, Ordering::SeqCst);
        let image = ProductImage {
            id,
            product_id: new_image.product_id,
            url: new_image.url,
            file_name: new_image.file_name,
            optimized_name: new_image.optimized_name,
            thumbnail_name: new_image.thumbnail_name,
        };

        images.insert(id, image.clone());
        Ok(image)
    }

    async fn get_image(&self, image_id: i64) -> Result<Option<ProductImage>, DomainError> {
        let images = self.images.read().await;
        Ok(images.get(&image_id).cloned())
    }

    async fn delete_image(&self, image_id: i64) -> Result<ProductImage, DomainError> {
        let mut images = self.images.write().await;

        images
            .remove(&image_id)
            .ok_or_else(|| DomainError::not_found(format!("Image '{}' not found", image_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ProductCondition;
    use rust_decimal::Decimal;

    fn new_product(name: &str, user_id: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            stock: 5,
            price: Decimal::new(1000, 2),
            condition: ProductCondition::Used,
            user_id,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_by_owner() {
        let repo = InMemoryProductRepository::new();

        repo.create(new_product("Lamp", 1)).await.unwrap();
        repo.create(new_product("Desk", 2)).await.unwrap();
        repo.create(new_product("Chair", 1)).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 3);

        let owned = repo.list_by_owner(1).await.unwrap();
        assert_eq!(owned.len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let repo = InMemoryProductRepository::new();

        let result = repo.update(99, ProductPatch::default()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_returns_images() {
        let repo = InMemoryProductRepository::new();
        let product = repo.create(new_product("Lamp", 1)).await.unwrap();

        repo.add_image(NewProductImage {
            product_id: product.id,
            url: "/uploads/products/lamp.jpg".to_string(),
            file_name: "lamp.jpg".to_string(),
            optimized_name: None,
            thumbnail_name: None,
        })
        .await
        .unwrap();

        let removed = repo.delete(product.id).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].file_name, "lamp.jpg");

        assert!(repo.get(product.id).await.unwrap().is_none());
        assert!(repo.images(product.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_image_to_missing_product() {
        let repo = InMemoryProductRepository::new();

        let result = repo
            .add_image(NewProductImage {
                product_id: 42,
                url: "/uploads/products/x.jpg".to_string(),
                file_name: "x.jpg".to_string(),
                optimized_name: None,
                thumbnail_name: None,
            })
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
