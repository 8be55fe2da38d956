//! Cart entities and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductCondition;
use crate::domain::DomainError;

/// Lifecycle state of a cart. A user has at most one `Active` cart;
/// every other state belongs to order history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    Active,
    Processing,
    Completed,
    Cancelled,
}

impl CartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "active" => Ok(Self::Active),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(DomainError::internal(format!(
                "Unknown cart status '{other}'"
            ))),
        }
    }
}

/// Shopping cart
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
}

/// One product line inside a cart. `unit_price` is captured when the item is
/// added; later price edits on the product do not rewrite it.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Cart line joined with the product fields the cart view needs
#[derive(Debug, Clone, Serialize)]
pub struct CartItemDetail {
    #[serde(flatten)]
    pub item: CartItem,
    pub product_name: String,
    pub product_stock: i32,
    pub condition: ProductCondition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Aggregated cart totals, computed from captured unit prices
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CartSummary {
    /// Distinct product lines
    pub items_count: i64,
    /// Sum of line quantities
    pub total_quantity: i64,
    /// Sum of quantity * unit_price
    pub total_amount: Decimal,
}

impl CartSummary {
    pub fn empty() -> Self {
        Self {
            items_count: 0,
            total_quantity: 0,
            total_amount: Decimal::ZERO,
        }
    }
}

/// One row of a user's order history (a non-active cart with totals)
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub cart_id: i64,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
    pub items_count: i64,
    pub total_amount: Decimal,
}

/// Full detail of one past order
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub cart: Cart,
    pub items: Vec<CartItemDetail>,
    pub summary: CartSummary,
}
