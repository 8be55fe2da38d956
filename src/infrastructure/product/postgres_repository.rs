//! PostgreSQL product repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::product::{
    NewProduct, NewProductImage, Product, ProductCondition, ProductImage, ProductOverview,
    ProductPatch, ProductRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::db::storage_error;

const PRODUCT_COLUMNS: &str =
    "id, name, description, stock, price, condition, user_id, published_at";

const IMAGE_COLUMNS: &str = "id, product_id, url, file_name, optimized_name, thumbnail_name";

/// PostgreSQL implementation of ProductRepository
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn list(&self) -> Result<Vec<ProductOverview>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS},
                   (SELECT u.first_name || ' ' || u.last_name FROM users u
                    WHERE u.id = products.user_id) AS owner_name,
                   (SELECT url FROM product_images i
                    WHERE i.product_id = products.id ORDER BY i.id LIMIT 1) AS image_url
            FROM products
            ORDER BY published_at DESC, id DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list products", e))?;

        rows.iter().map(row_to_overview).collect()
    }

    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<ProductOverview>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS},
                   (SELECT u.first_name || ' ' || u.last_name FROM users u
                    WHERE u.id = products.user_id) AS owner_name,
                   (SELECT url FROM product_images i
                    WHERE i.product_id = products.id ORDER BY i.id LIMIT 1) AS image_url
            FROM products
            WHERE user_id = $1
            ORDER BY published_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list own products", e))?;

        rows.iter().map(row_to_overview).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get product", e))?;

        row.map(|r| row_to_product(&r)).transpose()
    }

    async fn create(&self, new_product: NewProduct) -> Result<Product, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (name, description, stock, price, condition, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&new_product.name)
        .bind(&new_product.description)
        .bind(new_product.stock)
        .bind(new_product.price)
        .bind(new_product.condition.as_str())
        .bind(new_product.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create product", e))?;

        row_to_product(&row)
    }

    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                stock = COALESCE($4, stock),
                price = COALESCE($5, price),
                condition = COALESCE($6, condition)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(patch.stock)
        .bind(patch.price)
        .bind(patch.condition.map(|c| c.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update product", e))?;

        match row {
            Some(row) => row_to_product(&row),
            None => Err(DomainError::not_found(format!(
                "Product '{}' not found",
                id
            ))),
        }
    }

    async fn delete(&self, id: i64) -> Result<Vec<ProductImage>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin transaction", e))?;

        let image_rows = sqlx::query(&format!(
            "DELETE FROM product_images WHERE product_id = $1 RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| storage_error("Failed to delete product images", e))?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to delete product", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Product '{}' not found",
                id
            )));
        }

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit product deletion", e))?;

        image_rows.iter().map(row_to_image).collect()
    }

    async fn images(&self, product_id: i64) -> Result<Vec<ProductImage>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {IMAGE_COLUMNS} FROM product_images WHERE product_id = $1 ORDER BY id"
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list product images", e))?;

        rows.iter().map(row_to_image).collect()
    }

    async fn add_image(&self, new_image: NewProductImage) -> Result<ProductImage, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO product_images (product_id, url, file_name, optimized_name, thumbnail_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {IMAGE_COLUMNS}
            "#
        ))
        .bind(new_image.product_id)
        .bind(&new_image.url)
        .bind(&new_image.file_name)
        .bind(&new_image.optimized_name)
        .bind(&new_image.thumbnail_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                DomainError::not_found(format!("Product '{}' not found", new_image.product_id))
            }
            _ => storage_error("Failed to add product image", e),
        })?;

        row_to_image(&row)
    }

    async fn get_image(&self, image_id: i64) -> Result<Option<ProductImage>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {IMAGE_COLUMNS} FROM product_images WHERE id = $1"
        ))
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get product image", e))?;

        row.map(|r| row_to_image(&r)).transpose()
    }

    async fn delete_image(&self, image_id: i64) -> Result<ProductImage, DomainError> {
        let row = sqlx::query(&format!(
            "DELETE FROM product_images WHERE id = $1 RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to delete product image", e))?;

        match row {
            Some(row) => row_to_image(&row),
            None => Err(DomainError::not_found(format!(
                "Image '{}' not found",
                image_id
            ))),
        }
    }
}

fn row_to_product(row: &sqlx::postgres::PgRow) -> Result<Product, DomainError> {
    let condition: String = row.get("condition");

    Ok(Product {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        stock: row.get("stock"),
        price: row.get("price"),
        condition: ProductCondition::parse(&condition)?,
        user_id: row.get("user_id"),
        published_at: row.get("published_at"),
    })
}

fn row_to_overview(row: &sqlx::postgres::PgRow) -> Result<ProductOverview, DomainError> {
    Ok(ProductOverview {
        product: row_to_product(row)?,
        owner_name: row.get("owner_name"),
        image_url: row.get("image_url"),
    })
}

fn row_to_image(row: &sqlx::postgres::PgRow) -> Result<ProductImage, DomainError> {
    Ok(ProductImage {
        id: row.get("id"),
        product_id: row.get("product_id"),
        url: row.get("url"),
        file_name: row.get("file_name"),
        optimized_name: row.get("optimized_name"),
        thumbnail_name: row.get("thumbnail_name"),
    })
}
