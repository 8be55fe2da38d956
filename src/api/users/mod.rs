//! Account endpoints under `/api/user`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::cart::{OrderDetail, OrderRecord};
use crate::domain::user::{User, VendorRequest};
use crate::infrastructure::user::UpdateProfileRequest;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequestBody {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDecisionBody {
    pub request_id: i64,
    pub approve: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<OrderRecord>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: OrderDetail,
}

#[derive(Debug, Serialize)]
pub struct RoleRequestResponse {
    pub success: bool,
    pub request: VendorRequest,
}

/// GET /api/user/me — the current account with its academic profile
async fn me(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(UserResponse {
        success: true,
        user,
    })
}

/// PUT /api/user/profile — update the current account
async fn update_profile(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .update_profile(
            user.id,
            UpdateProfileRequest {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
                phone: body.phone,
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;

    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}

/// GET /api/user/orders — past orders, newest first
async fn orders(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<OrdersResponse>, ApiError> {
    let orders = state.cart_service.order_history(user.id).await?;

    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}

/// GET /api/user/orders/{orderId} — one past order, ownership-checked
async fn order(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.cart_service.order(user.id, order_id).await?;

    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// POST /api/user/role/request — file a vendor role request
async fn request_role(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<RoleRequestBody>,
) -> Result<(StatusCode, Json<RoleRequestResponse>), ApiError> {
    let request = state
        .user_service
        .request_vendor_role(user.id, body.reason)
        .await?;

    info!(user_id = user.id, request_id = request.id, "vendor role requested");

    Ok((
        StatusCode::CREATED,
        Json(RoleRequestResponse {
            success: true,
            request,
        }),
    ))
}

/// PUT /api/user/role — decide a pending vendor request
async fn decide_role(
    RequireUser(_user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<RoleDecisionBody>,
) -> Result<Json<RoleRequestResponse>, ApiError> {
    let request = state
        .user_service
        .decide_vendor_request(body.request_id, body.approve)
        .await?;

    info!(
        request_id = request.id,
        approved = body.approve,
        "vendor request decided"
    );

    Ok(Json(RoleRequestResponse {
        success: true,
        request,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/orders", get(orders))
        .route("/orders/{order_id}", get(order))
        .route("/role/request", post(request_role))
        .route("/role", put(decide_role))
}
