//! Shopping cart endpoints under `/api/carrito`

use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::cart::{CartItem, CartSummary};
use crate::infrastructure::cart::CartView;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemBody {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityBody {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    #[serde(flatten)]
    pub cart: CartView,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub success: bool,
    pub item: CartItem,
    pub summary: CartSummary,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub success: bool,
    pub message: String,
}

/// GET /api/carrito — the caller's active cart, created on first access
async fn view(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.cart_service.view(user.id).await?;

    Ok(Json(CartResponse {
        success: true,
        cart,
    }))
}

/// POST /api/carrito/add — add a product, merging with an existing line
async fn add_item(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<AddItemBody>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state
        .cart_service
        .add_item(user.id, body.product_id, body.quantity)
        .await?;

    Ok(Json(CartResponse {
        success: true,
        cart,
    }))
}

/// PUT /api/carrito/items/{itemId} — set a line's quantity
async fn update_item(
    RequireUser(_user): RequireUser,
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(body): Json<UpdateQuantityBody>,
) -> Result<Json<ItemResponse>, ApiError> {
    let (item, summary) = state
        .cart_service
        .update_item_quantity(item_id, body.quantity)
        .await?;

    Ok(Json(ItemResponse {
        success: true,
        item,
        summary,
    }))
}

/// DELETE /api/carrito/items/{itemId} — drop a line
async fn remove_item(
    RequireUser(_user): RequireUser,
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<Json<RemovedResponse>, ApiError> {
    state.cart_service.remove_item(item_id).await?;

    Ok(Json(RemovedResponse {
        success: true,
        message: "Item removed".to_string(),
    }))
}

/// DELETE /api/carrito/clear — empty the active cart
async fn clear(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.cart_service.clear(user.id).await?;

    Ok(Json(CartResponse {
        success: true,
        cart,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view))
        .route("/add", post(add_item))
        .route("/items/{item_id}", put(update_item).delete(remove_item))
        .route("/clear", delete(clear))
}
