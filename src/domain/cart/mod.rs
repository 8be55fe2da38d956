//! Cart domain: carts, line items and order history

mod entity;
mod repository;

pub use entity::{
    Cart, CartItem, CartItemDetail, CartStatus, CartSummary, OrderDetail, OrderRecord,
};
pub use repository::CartRepository;
