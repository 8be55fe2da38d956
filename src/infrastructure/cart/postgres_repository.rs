//! PostgreSQL cart repository implementation
//!
//! Stock checks are pushed into conditional UPDATEs so the check and the
//! write happen atomically; the product row is locked for the duration of
//! `add_item` so a concurrent merge cannot slip past the guard.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use crate::domain::cart::{
    Cart, CartItem, CartItemDetail, CartRepository, CartStatus, CartSummary, OrderDetail,
    OrderRecord,
};
use crate::domain::product::ProductCondition;
use crate::domain::DomainError;
use crate::infrastructure::db::storage_error;

const CART_COLUMNS: &str = "id, user_id, status, created_at";

const ITEM_COLUMNS: &str = "id, cart_id, product_id, quantity, unit_price, added_at";

/// PostgreSQL implementation of CartRepository
#[derive(Debug, Clone)]
pub struct PostgresCartRepository {
    pool: PgPool,
}

impl PostgresCartRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn active_cart(&self, user_id: i64) -> Result<Option<Cart>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1 AND status = 'active'"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get active cart", e))?;

        row.map(|r| row_to_cart(&r)).transpose()
    }
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn get_or_create_active(&self, user_id: i64) -> Result<Cart, DomainError> {
        if let Some(cart) = self.active_cart(user_id).await? {
            return Ok(cart);
        }

        // The partial unique index on (user_id) WHERE status = 'active'
        // arbitrates concurrent creates; the loser re-fetches the winner.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO carts (user_id, status)
            VALUES ($1, 'active')
            ON CONFLICT (user_id) WHERE status = 'active' DO NOTHING
            RETURNING {CART_COLUMNS}
            "#
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create cart", e))?;

        match row {
            Some(row) => row_to_cart(&row),
            None => self
                .active_cart(user_id)
                .await?
                .ok_or_else(|| DomainError::internal("Active cart vanished during creation")),
        }
    }

    async fn items(&self, cart_id: i64) -> Result<Vec<CartItemDetail>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, ci.unit_price, ci.added_at,
                   p.name AS product_name, p.stock AS product_stock, p.condition,
                   (SELECT url FROM product_images i
                    WHERE i.product_id = p.id ORDER BY i.id LIMIT 1) AS image_url
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list cart items", e))?;

        rows.iter().map(row_to_item_detail).collect()
    }

    async fn add_item(
        &self,
        cart_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartItem, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin transaction", e))?;

        // Lock the product row: every stock-guarded mutation for this product
        // queues behind it, so the guard below cannot go stale mid-transaction.
        let product = sqlx::query("SELECT name, price, stock FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to load product", e))?
            .ok_or_else(|| {
                DomainError::not_found(format!("Product '{}' not found", product_id))
            })?;

        let name: String = product.get("name");
        let price: Decimal = product.get("price");
        let stock: i32 = product.get("stock");

        // Merge path: the stock guard is part of the UPDATE predicate
        let merged = sqlx::query(&format!(
            r#"
            UPDATE cart_items
            SET quantity = quantity + $3, unit_price = $4
            WHERE cart_id = $1 AND product_id = $2 AND quantity + $3 <= $5
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(price)
        .bind(stock)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| storage_error("Failed to merge cart item", e))?;

        if let Some(row) = merged {
            let item = row_to_item(&row)?;
            tx.commit()
                .await
                .map_err(|e| storage_error("Failed to commit cart update", e))?;
            return Ok(item);
        }

        // Zero rows updated: either the line does not exist yet, or the merge
        // would exceed stock. Distinguish inside the same transaction.
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM cart_items WHERE cart_id = $1 AND product_id = $2")
                .bind(cart_id)
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| storage_error("Failed to probe cart item", e))?;

        if existing.is_some() || quantity > stock {
            return Err(DomainError::insufficient_stock(format!(
                "Only {} units of '{}' available",
                stock, name
            )));
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(price)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| storage_error("Failed to insert cart item", e))?;

        let item = row_to_item(&row)?;

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit cart update", e))?;

        Ok(item)
    }

    async fn update_quantity(&self, item_id: i64, quantity: i32) -> Result<CartItem, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE cart_items ci
            SET quantity = $2
            FROM products p
            WHERE ci.id = $1 AND p.id = ci.product_id AND $2 <= p.stock
            RETURNING ci.id, ci.cart_id, ci.product_id, ci.quantity, ci.unit_price, ci.added_at
            "#,
        )
        .bind(item_id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update cart item", e))?;

        if let Some(row) = row {
            return row_to_item(&row);
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM cart_items WHERE id = $1")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to probe cart item", e))?;

        match exists {
            Some(_) => Err(DomainError::insufficient_stock(format!(
                "Requested quantity {} exceeds available stock",
                quantity
            ))),
            None => Err(DomainError::not_found(format!(
                "Cart item '{}' not found",
                item_id
            ))),
        }
    }

    async fn remove_item(&self, item_id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to remove cart item", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Cart item '{}' not found",
                item_id
            )));
        }

        Ok(())
    }

    async fn clear(&self, cart_id: i64) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to clear cart", e))?;

        Ok(())
    }

    async fn summary(&self, cart_id: i64) -> Result<CartSummary, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS items_count,
                   COALESCE(SUM(quantity), 0)::BIGINT AS total_quantity,
                   COALESCE(SUM(quantity * unit_price), 0) AS total_amount
            FROM cart_items
            WHERE cart_id = $1
            "#,
        )
        .bind(cart_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to compute cart summary", e))?;

        Ok(CartSummary {
            items_count: row.get("items_count"),
            total_quantity: row.get("total_quantity"),
            total_amount: row.get("total_amount"),
        })
    }

    async fn order_history(&self, user_id: i64) -> Result<Vec<OrderRecord>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT c.id AS cart_id, c.status, c.created_at,
                   COUNT(ci.id) AS items_count,
                   COALESCE(SUM(ci.quantity * ci.unit_price), 0) AS total_amount
            FROM carts c
            LEFT JOIN cart_items ci ON ci.cart_id = c.id
            WHERE c.user_id = $1 AND c.status <> 'active'
            GROUP BY c.id, c.status, c.created_at
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list order history", e))?;

        rows.iter()
            .map(|row| {
                let status: String = row.get("status");
                Ok(OrderRecord {
                    cart_id: row.get("cart_id"),
                    status: CartStatus::parse(&status)?,
                    created_at: row.get("created_at"),
                    items_count: row.get("items_count"),
                    total_amount: row.get("total_amount"),
                })
            })
            .collect()
    }

    async fn order_detail(
        &self,
        user_id: i64,
        cart_id: i64,
    ) -> Result<Option<OrderDetail>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {CART_COLUMNS}
            FROM carts
            WHERE id = $1 AND user_id = $2 AND status <> 'active'
            "#
        ))
        .bind(cart_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get order", e))?;

        let cart = match row {
            Some(row) => row_to_cart(&row)?,
            None => return Ok(None),
        };

        let items = self.items(cart_id).await?;
        let summary = self.summary(cart_id).await?;

        Ok(Some(OrderDetail {
            cart,
            items,
            summary,
        }))
    }
}

fn row_to_cart(row: &sqlx::postgres::PgRow) -> Result<Cart, DomainError> {
    let status: String = row.get("status");

    Ok(Cart {
        id: row.get("id"),
        user_id: row.get("user_id"),
        status: CartStatus::parse(&status)?,
        created_at: row.get("created_at"),
    })
}

fn row_to_item(row: &sqlx::postgres::PgRow) -> Result<CartItem, DomainError> {
    Ok(CartItem {
        id: row.get("id"),
        cart_id: row.get("cart_id"),
        product_id: row.get("product_id"),
        quantity: row.get("quantity"),
        unit_price: row.get("unit_price"),
        added_at: row.get("added_at"),
    })
}

fn row_to_item_detail(row: &sqlx::postgres::PgRow) -> Result<CartItemDetail, DomainError> {
    let condition: String = row.get("condition");

    Ok(CartItemDetail {
        item: row_to_item(row)?,
        product_name: row.get("product_name"),
        product_stock: row.get("product_stock"),
        condition: ProductCondition::parse(&condition)?,
        image_url: row.get("image_url"),
    })
}
