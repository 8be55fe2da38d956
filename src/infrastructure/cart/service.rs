//! Cart service: the shopping-cart operations behind `/api/carrito`

use std::sync::Arc;

use serde::Serialize;

use crate::domain::cart::{
    Cart, CartItem, CartItemDetail, CartRepository, CartSummary, OrderDetail, OrderRecord,
};
use crate::domain::DomainError;

/// The active cart with its lines and totals, as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart: Cart,
    pub items: Vec<CartItemDetail>,
    pub summary: CartSummary,
}

/// Cart service: resolves the caller's active cart and delegates the
/// stock-guarded mutations to the repository
#[derive(Debug)]
pub struct CartService {
    repository: Arc<dyn CartRepository>,
}

impl CartService {
    /// Create a new cart service
    pub fn new(repository: Arc<dyn CartRepository>) -> Self {
        Self { repository }
    }

    /// The user's active cart, created on first access
    pub async fn view(&self, user_id: i64) -> Result<CartView, DomainError> {
        let cart = self.repository.get_or_create_active(user_id).await?;
        self.view_of(cart).await
    }

    /// Add a product to the user's active cart
    pub async fn add_item(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartView, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::validation("Quantity must be at least 1"));
        }

        let cart = self.repository.get_or_create_active(user_id).await?;
        self.repository
            .add_item(cart.id, product_id, quantity)
            .await?;

        self.view_of(cart).await
    }

    /// Set a line's quantity
    pub async fn update_item_quantity(
        &self,
        item_id: i64,
        quantity: i32,
    ) -> Result<(CartItem, CartSummary), DomainError> {
        if quantity <= 0 {
            return Err(DomainError::validation("Quantity must be at least 1"));
        }

        let item = self.repository.update_quantity(item_id, quantity).await?;
        let summary = self.repository.summary(item.cart_id).await?;

        Ok((item, summary))
    }

    /// Remove a line from its cart
    pub async fn remove_item(&self, item_id: i64) -> Result<(), DomainError> {
        self.repository.remove_item(item_id).await
    }

    /// Empty the user's active cart
    pub async fn clear(&self, user_id: i64) -> Result<CartView, DomainError> {
        let cart = self.repository.get_or_create_active(user_id).await?;
        self.repository.clear(cart.id).await?;
        self.view_of(cart).await
    }

    /// The user's past orders, newest first
    pub async fn order_history(&self, user_id: i64) -> Result<Vec<OrderRecord>, DomainError> {
        self.repository.order_history(user_id).await
    }

    /// One past order; `NotFound` covers both missing and foreign carts
    pub async fn order(&self, user_id: i64, cart_id: i64) -> Result<OrderDetail, DomainError> {
        self.repository
            .order_detail(user_id, cart_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Order '{}' not found", cart_id)))
    }

    async fn view_of(&self, cart: Cart) -> Result<CartView, DomainError> {
        let items = self.repository.items(cart.id).await?;
        let summary = self.repository.summary(cart.id).await?;

        Ok(CartView {
            cart,
            items,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{NewProduct, ProductCondition, ProductPatch, ProductRepository};
    use crate::infrastructure::cart::InMemoryCartRepository;
    use crate::infrastructure::product::InMemoryProductRepository;
    use rust_decimal::Decimal;

    async fn seed_product(products: &InMemoryProductRepository, price: i64, stock: i32) -> i64 {
        products
            .create(NewProduct {
                name: "Graphing calculator".to_string(),
                description: None,
                stock,
                price: Decimal::new(price, 2),
                condition: ProductCondition::Used,
                user_id: 99,
            })
            .await
            .unwrap()
            .id
    }

    fn setup() -> (Arc<InMemoryProductRepository>, CartService) {
        let products = Arc::new(InMemoryProductRepository::new());
        let carts = InMemoryCartRepository::new(products.clone());
        (products, CartService::new(Arc::new(carts)))
    }

    #[tokio::test]
    async fn test_view_creates_active_cart() {
        let (_, service) = setup();

        let view = service.view(1).await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.summary, CartSummary::empty());

        let again = service.view(1).await.unwrap();
        assert_eq!(again.cart.id, view.cart.id);
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity() {
        let (products, service) = setup();
        let product_id = seed_product(&products, 1000, 5).await;

        let result = service.add_item(1, product_id, 0).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let (_, service) = setup();

        let result = service.add_item(1, 12345, 1).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_overstock_add_leaves_cart_unchanged() {
        let (products, service) = setup();
        let product_id = seed_product(&products, 1000, 3).await;

        let result = service.add_item(1, product_id, 4).await;
        assert!(matches!(result, Err(DomainError::InsufficientStock { .. })));

        let view = service.view(1).await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.summary, CartSummary::empty());
    }

    #[tokio::test]
    async fn test_double_add_merges_lines() {
        let (products, service) = setup();
        let product_id = seed_product(&products, 1000, 10).await;

        service.add_item(1, product_id, 2).await.unwrap();
        let view = service.add_item(1, product_id, 3).await.unwrap();

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].item.quantity, 5);
    }

    #[tokio::test]
    async fn test_summary_totals() {
        let (products, service) = setup();
        let ten = seed_product(&products, 1000, 10).await;
        let five = seed_product(&products, 500, 10).await;

        service.add_item(1, ten, 2).await.unwrap();
        let view = service.add_item(1, five, 1).await.unwrap();

        assert_eq!(view.summary.items_count, 2);
        assert_eq!(view.summary.total_quantity, 3);
        assert_eq!(view.summary.total_amount, Decimal::new(2500, 2));
    }

    #[tokio::test]
    async fn test_remove_missing_item() {
        let (_, service) = setup();

        let result = service.remove_item(42).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_price_edit_keeps_captured_unit_price() {
        let (products, service) = setup();
        let product_id = seed_product(&products, 1000, 10).await;

        service.add_item(1, product_id, 2).await.unwrap();

        // Vendor doubles the price after the item was captured
        products
            .update(
                product_id,
                ProductPatch {
                    price: Some(Decimal::new(2000, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let view = service.view(1).await.unwrap();
        assert_eq!(view.items[0].item.unit_price, Decimal::new(1000, 2));
        assert_eq!(view.summary.total_amount, Decimal::new(2000, 2));
    }

    #[tokio::test]
    async fn test_update_quantity_respects_stock() {
        let (products, service) = setup();
        let product_id = seed_product(&products, 1000, 5).await;

        let view = service.add_item(1, product_id, 2).await.unwrap();
        let item_id = view.items[0].item.id;

        let (item, summary) = service.update_item_quantity(item_id, 5).await.unwrap();
        assert_eq!(item.quantity, 5);
        assert_eq!(summary.total_quantity, 5);

        let result = service.update_item_quantity(item_id, 6).await;
        assert!(matches!(result, Err(DomainError::InsufficientStock { .. })));
    }

    #[tokio::test]
    async fn test_clear_empties_cart() {
        let (products, service) = setup();
        let product_id = seed_product(&products, 1000, 10).await;

        service.add_item(1, product_id, 2).await.unwrap();
        let view = service.clear(1).await.unwrap();

        assert!(view.items.is_empty());
        assert_eq!(view.summary.total_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_order_lookup_checks_ownership() {
        let (_, service) = setup();

        let result = service.order(1, 42).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
