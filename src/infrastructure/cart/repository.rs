//! In-memory cart repository implementation

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::cart::{
    Cart, CartItem, CartItemDetail, CartRepository, CartStatus, CartSummary, OrderDetail,
    OrderRecord,
};
use crate::domain::product::ProductRepository;
use crate::domain::DomainError;
use crate::infrastructure::product::InMemoryProductRepository;

/// In-memory implementation of CartRepository, used by service tests.
///
/// Consults the shared product repository for stock and price, so tests can
/// drive both sides (edit a product, observe the cart) through one store.
#[derive(Debug)]
pub struct InMemoryCartRepository {
    products: Arc<InMemoryProductRepository>,
    carts: Arc<RwLock<HashMap<i64, Cart>>>,
    items: Arc<RwLock<HashMap<i64, CartItem>>>,
    next_cart_id: AtomicI64,
    next_item_id: AtomicI64,
}

impl InMemoryCartRepository {
    /// Create a new empty repository backed by the given product store
    pub fn new(products: Arc<InMemoryProductRepository>) -> Self {
        Self {
            products,
            carts: Arc::new(RwLock::new(HashMap::new())),
            items: Arc::new(RwLock::new(HashMap::new())),
            next_cart_id: AtomicI64::new(1),
            next_item_id: AtomicI64::new(1),
        }
    }

    /// Move a cart out of the active state (fulfillment happens outside this
    /// service; tests use this to stage order history).
    pub async fn set_status(&self, cart_id: i64, status: CartStatus) -> Result<(), DomainError> {
        let mut carts = self.carts.write().await;

        let cart = carts
            .get_mut(&cart_id)
            .ok_or_else(|| DomainError::not_found(format!("Cart '{}' not found", cart_id)))?;

        cart.status = status;
        Ok(())
    }

    async fn summary_of(items: &HashMap<i64, CartItem>, cart_id: i64) -> CartSummary {
        let mut summary = CartSummary::empty();

        for item in items.values().filter(|i| i.cart_id == cart_id) {
            summary.items_count += 1;
            summary.total_quantity += item.quantity as i64;
            summary.total_amount += item.unit_price * Decimal::from(item.quantity);
        }

        summary
    }

    async fn detail_of(&self, item: &CartItem) -> Result<CartItemDetail, DomainError> {
        let product = self
            .products
            .get(item.product_id)
            .await?
            .ok_or_else(|| {
                DomainError::internal(format!(
                    "Cart item '{}' references missing product '{}'",
                    item.id, item.product_id
                ))
            })?;

        let image_url = self
            .products
            .images(item.product_id)
            .await?
            .first()
            .map(|img| img.url.clone());

        Ok(CartItemDetail {
            item: item.clone(),
            product_name: product.name,
            product_stock: product.stock,
            condition: product.condition,
            image_url,
        })
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn get_or_create_active(&self, user_id: i64) -> Result<Cart, DomainError> {
        let mut carts = self.carts.write().await;

        if let Some(cart) = carts
            .values()
            .find(|c| c.user_id == user_id && c.status == CartStatus::Active)
        {
            return Ok(cart.clone());
        }

        let id = self.next_cart_id.fetch_add(1, Ordering::SeqCst);
        let cart = Cart {
            id,
            user_id,
            status: CartStatus::Active,
            created_at: Utc::now(),
        };

        carts.insert(id, cart.clone());
        Ok(cart)
    }

    async fn items(&self, cart_id: i64) -> Result<Vec<CartItemDetail>, DomainError> {
        let items = self.items.read().await;

        let mut lines: Vec<CartItem> = items
            .values()
            .filter(|i| i.cart_id == cart_id)
            .cloned()
            .collect();
        lines.sort_by_key(|i| i.id);

        let mut details = Vec::with_capacity(lines.len());
        for line in &lines {
            details.push(self.detail_of(line).await?);
        }

        Ok(details)
    }

    async fn add_item(
        &self,
        cart_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartItem, DomainError> {
        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Product '{}' not found", product_id)))?;

        let mut items = self.items.write().await;

        let existing = items
            .values_mut()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id);

        if let Some(item) = existing {
            let merged = item.quantity + quantity;
            if merged > product.stock {
                return Err(DomainError::insufficient_stock(format!(
                    "Only {} units of '{}' available",
                    product.stock, product.name
                )));
            }

            item.quantity = merged;
            item.unit_price = product.price;
            return Ok(item.clone());
        }

        if quantity > product.stock {
            return Err(DomainError::insufficient_stock(format!(
                "Only {} units of '{}' available",
                product.stock, product.name
            )));
        }

        let id = self.next_item_id.fetch_add(1, Ordering::SeqCst);
        let item = CartItem {
            id,
            cart_id,
            product_id,
            quantity,
            unit_price: product.price,
            added_at: Utc::now(),
        };

        items.insert(id, item.clone());
        Ok(item)
    }

    async fn update_quantity(&self, item_id: i64, quantity: i32) -> Result<CartItem, DomainError> {
        let mut items = self.items.write().await;

        let item = items
            .get_mut(&item_id)
            .ok_or_else(|| DomainError::not_found(format!("Cart item '{}' not found", item_id)))?;

        let product = self
            .products
            .get(item.product_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("Product '{}' not found", item.product_id))
            })?;

        if quantity > product.stock {
            return Err(DomainError::insufficient_stock(format!(
                "Only {} units of '{}' available",
                product.stock, product.name
            )));
        }

        item.quantity = quantity;
        Ok(item.clone())
    }

    async fn remove_item(&self, item_id: i64) -> Result<(), DomainError> {
        let mut items = self.items.write().await;

        items
            .remove(&item_id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(format!("Cart item '{}' not found", item_id)))
    }

    async fn clear(&self, cart_id: i64) -> Result<(), DomainError> {
        let mut items = self.items.write().await;
        items.retain(|_, item| item.cart_id != cart_id);
        Ok(())
    }

    async fn summary(&self, cart_id: i64) -> Result<CartSummary, DomainError> {
        let items = self.items.read().await;
        Ok(Self::summary_of(&items, cart_id).await)
    }

    async fn order_history(&self, user_id: i64) -> Result<Vec<OrderRecord>, DomainError> {
        let carts = self.carts.read().await;
        let items = self.items.read().await;

        let mut past: Vec<&Cart> = carts
            .values()
            .filter(|c| c.user_id == user_id && c.status != CartStatus::Active)
            .collect();
        past.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let mut records = Vec::with_capacity(past.len());
        for cart in past {
            let summary = Self::summary_of(&items, cart.id).await;
            records.push(OrderRecord {
                cart_id: cart.id,
                status: cart.status,
                created_at: cart.created_at,
                items_count: summary.items_count,
                total_amount: summary.total_amount,
            });
        }

        Ok(records)
    }

    async fn order_detail(
        &self,
        user_id: i64,
        cart_id: i64,
    ) -> Result<Option<OrderDetail>, DomainError> {
        let cart = {
            let carts = self.carts.read().await;
            carts.get(&cart_id).cloned()
        };

        let cart = match cart {
            Some(c) if c.user_id == user_id && c.status != CartStatus::Active => c,
            _ => return Ok(None),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{NewProduct, ProductCondition};

    async fn seed_product(products: &InMemoryProductRepository, price: i64, stock: i32) -> i64 {
        products
            .create(NewProduct {
                name: "Textbook".to_string(),
                description: None,
                stock,
                price: Decimal::new(price, 2),
                condition: ProductCondition::Used,
                user_id: 1,
            })
            .await
            .unwrap()
            .id
    }

    fn setup() -> (Arc<InMemoryProductRepository>, InMemoryCartRepository) {
        let products = Arc::new(InMemoryProductRepository::new());
        let carts = InMemoryCartRepository::new(products.clone());
        (products, carts)
    }

    #[tokio::test]
    async fn test_one_active_cart_per_user() {
        let (_, repo) = setup();

        let first = repo.get_or_create_active(7).await.unwrap();
        let second = repo.get_or_create_active(7).await.unwrap();

        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_add_item_merges_quantities() {
        let (products, repo) = setup();
        let product_id = seed_product(&products, 1000, 10).await;
        let cart = repo.get_or_create_active(1).await.unwrap();

        repo.add_item(cart.id, product_id, 2).await.unwrap();
        let merged = repo.add_item(cart.id, product_id, 3).await.unwrap();

        assert_eq!(merged.quantity, 5);

        let items = repo.items(cart.id).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_add_item_insufficient_stock() {
        let (products, repo) = setup();
        let product_id = seed_product(&products, 1000, 3).await;
        let cart = repo.get_or_create_active(1).await.unwrap();

        let result = repo.add_item(cart.id, product_id, 4).await;
        assert!(matches!(result, Err(DomainError::InsufficientStock { .. })));

        // Merge path hits the same guard
        repo.add_item(cart.id, product_id, 2).await.unwrap();
        let result = repo.add_item(cart.id, product_id, 2).await;
        assert!(matches!(result, Err(DomainError::InsufficientStock { .. })));
    }

    #[tokio::test]
    async fn test_remove_missing_item() {
        let (_, repo) = setup();

        let result = repo.remove_item(99).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_summary_totals() {
        let (products, repo) = setup();
        let ten = seed_product(&products, 1000, 10).await;
        let five = seed_product(&products, 500, 10).await;
        let cart = repo.get_or_create_active(1).await.unwrap();

        repo.add_item(cart.id, ten, 2).await.unwrap();
        repo.add_item(cart.id, five, 1).await.unwrap();

        let summary = repo.summary(cart.id).await.unwrap();
        assert_eq!(summary.items_count, 2);
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.total_amount, Decimal::new(2500, 2));
    }

    #[tokio::test]
    async fn test_order_history_excludes_active_cart() {
        let (products, repo) = setup();
        let product_id = seed_product(&products, 1000, 10).await;

        let cart = repo.get_or_create_active(1).await.unwrap();
        repo.add_item(cart.id, product_id, 1).await.unwrap();

        assert!(repo.order_history(1).await.unwrap().is_empty());

        repo.set_status(cart.id, CartStatus::Completed).await.unwrap();

        let history = repo.order_history(1).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].total_amount, Decimal::new(1000, 2));

        // A fresh active cart is created afterwards
        let fresh = repo.get_or_create_active(1).await.unwrap();
        assert_ne!(fresh.id, cart.id);
    }

    #[tokio::test]
    async fn test_order_detail_checks_ownership() {
        let (products, repo) = setup();
        let product_id = seed_product(&products, 1000, 10).await;

        let cart = repo.get_or_create_active(1).await.unwrap();
        repo.add_item(cart.id, product_id, 1).await.unwrap();
        repo.set_status(cart.id, CartStatus::Completed).await.unwrap();

        assert!(repo.order_detail(1, cart.id).await.unwrap().is_some());
        assert!(repo.order_detail(2, cart.id).await.unwrap().is_none());
    }
}
