//! Product service: listing management with ownership checks

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;

use crate::domain::product::{
    validation::validate_description, validation::validate_name, validation::validate_price,
    validation::validate_stock, NewProduct, NewProductImage, Product, ProductCondition,
    ProductImage, ProductOverview, ProductPatch, ProductRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::media::FileStore;

/// Request for publishing a new product
#[derive(Debug, Clone)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub stock: i32,
    pub price: Decimal,
    pub condition: ProductCondition,
}

/// Request for updating a product; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i32>,
    pub price: Option<Decimal>,
    pub condition: Option<ProductCondition>,
}

/// Request for attaching an already-processed image to a product
#[derive(Debug, Clone)]
pub struct AddImageRequest {
    pub url: String,
    pub file_name: String,
    pub optimized_name: Option<String>,
    pub thumbnail_name: Option<String>,
}

/// A product with all of its images
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
}

/// Product service: catalog reads plus owner-gated mutations
#[derive(Debug)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
    files: Arc<dyn FileStore>,
}

impl ProductService {
    /// Create a new product service
    pub fn new(repository: Arc<dyn ProductRepository>, files: Arc<dyn FileStore>) -> Self {
        Self { repository, files }
    }

    /// All listings, public
    pub async fn list(&self) -> Result<Vec<ProductOverview>, DomainError> {
        self.repository.list().await
    }

    /// The vendor's own listings
    pub async fn list_own(&self, user_id: i64) -> Result<Vec<ProductOverview>, DomainError> {
        self.repository.list_by_owner(user_id).await
    }

    /// One listing with all its images, public
    pub async fn get(&self, id: i64) -> Result<ProductDetail, DomainError> {
        let product = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Product '{}' not found", id)))?;

        let images = self.repository.images(id).await?;

        Ok(ProductDetail { product, images })
    }

    /// Publish a new listing owned by the given vendor
    pub async fn create(
        &self,
        user_id: i64,
        request: CreateProductRequest,
    ) -> Result<Product, DomainError> {
        validate_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_stock(request.stock).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_price(request.price).map_err(|e| DomainError::validation(e.to_string()))?;
        if let Some(description) = &request.description {
            validate_description(description)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        self.repository
            .create(NewProduct {
                name: request.name,
                description: request.description,
                stock: request.stock,
                price: request.price,
                condition: request.condition,
                user_id,
            })
            .await
    }

    /// Update a listing; only the owner may do this
    pub async fn update(
        &self,
        user_id: i64,
        product_id: i64,
        request: UpdateProductRequest,
    ) -> Result<Product, DomainError> {
        if let Some(name) = &request.name {
            validate_name(name).map_err(|e| DomainError::validation(e.to_string()))?;
        }
        if let Some(stock) = request.stock {
            validate_stock(stock).map_err(|e| DomainError::validation(e.to_string()))?;
        }
        if let Some(price) = request.price {
            validate_price(price).map_err(|e| DomainError::validation(e.to_string()))?;
        }
        if let Some(description) = &request.description {
            validate_description(description)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        self.check_owner(user_id, product_id).await?;

        self.repository
            .update(
                product_id,
                ProductPatch {
                    name: request.name,
                    description: request.description,
                    stock: request.stock,
                    price: request.price,
                    condition: request.condition,
                },
            )
            .await
    }

    /// Delete a listing with its images; only the owner may do this.
    /// Image files are cleaned up best-effort after the rows are gone.
    pub async fn delete(&self, user_id: i64, product_id: i64) -> Result<(), DomainError> {
        self.check_owner(user_id, product_id).await?;

        let images = self.repository.delete(product_id).await?;
        self.remove_files(&images).await;

        Ok(())
    }

    /// Attach an already-processed image to an owned listing
    pub async fn add_image(
        &self,
        user_id: i64,
        product_id: i64,
        request: AddImageRequest,
    ) -> Result<ProductImage, DomainError> {
        if request.url.trim().is_empty() || request.file_name.trim().is_empty() {
            return Err(DomainError::validation(
                "Image url and file name are required",
            ));
        }

        self.check_owner(user_id, product_id).await?;

        self.repository
            .add_image(NewProductImage {
                product_id,
                url: request.url,
                file_name: request.file_name,
                optimized_name: request.optimized_name,
                thumbnail_name: request.thumbnail_name,
            })
            .await
    }

    /// Remove an image from an owned listing, files included
    pub async fn remove_image(&self, user_id: i64, image_id: i64) -> Result<(), DomainError> {
        let image = self
            .repository
            .get_image(image_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Image '{}' not found", image_id)))?;

        self.check_owner(user_id, image.product_id).await?;

        let image = self.repository.delete_image(image_id).await?;
        self.remove_files(std::slice::from_ref(&image)).await;

        Ok(())
    }

    async fn check_owner(&self, user_id: i64, product_id: i64) -> Result<(), DomainError> {
        let product = self
            .repository
            .get(product_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("Product '{}' not found", product_id))
            })?;

        if product.user_id != user_id {
            return Err(DomainError::forbidden(
                "Only the owner may modify this listing",
            ));
        }

        Ok(())
    }

    async fn remove_files(&self, images: &[ProductImage]) {
        for image in images {
            for name in image.file_names() {
                if let Err(e) = self.files.remove(name).await {
                    warn!(file = name, error = %e, "failed to remove image file");
                }
            }
        }
    }
}
