//! Cart repository trait

use async_trait::async_trait;

use super::{Cart, CartItem, CartItemDetail, CartSummary, OrderDetail, OrderRecord};
use crate::domain::DomainError;

/// Repository for carts, cart items and order history.
///
/// Stock checks live here rather than in the service: both the merge and the
/// insert path must evaluate `quantity + delta <= stock` atomically with the
/// write, which only the store can guarantee.
#[async_trait]
pub trait CartRepository: Send + Sync + std::fmt::Debug {
    /// The user's active cart, creating it when missing. Concurrent creates
    /// resolve to a single winner (one active cart per user).
    async fn get_or_create_active(&self, user_id: i64) -> Result<Cart, DomainError>;

    /// Line items joined with product name, stock, condition and primary image
    async fn items(&self, cart_id: i64) -> Result<Vec<CartItemDetail>, DomainError>;

    /// Add a product to the cart, merging with an existing line for the same
    /// product. Fails with `NotFound` when the product is absent and with
    /// `InsufficientStock` when the resulting quantity would exceed stock.
    /// A merge refreshes the captured unit price.
    async fn add_item(
        &self,
        cart_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartItem, DomainError>;

    /// Set a line's quantity. `NotFound` when the line is absent,
    /// `InsufficientStock` when the quantity exceeds the product's stock.
    async fn update_quantity(&self, item_id: i64, quantity: i32) -> Result<CartItem, DomainError>;

    /// Remove a line. `NotFound` when it does not exist.
    async fn remove_item(&self, item_id: i64) -> Result<(), DomainError>;

    /// Remove all lines from a cart
    async fn clear(&self, cart_id: i64) -> Result<(), DomainError>;

    /// Aggregate totals from captured unit prices
    async fn summary(&self, cart_id: i64) -> Result<CartSummary, DomainError>;

    /// The user's non-active carts with totals, newest first
    async fn order_history(&self, user_id: i64) -> Result<Vec<OrderRecord>, DomainError>;

    /// One past order, only if it belongs to the user
    async fn order_detail(
        &self,
        user_id: i64,
        cart_id: i64,
    ) -> Result<Option<OrderDetail>, DomainError>;
}
