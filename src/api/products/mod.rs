//! Product catalog endpoints under `/api/productos`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::RequireVendor;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::product::{Product, ProductCondition, ProductImage, ProductOverview};
use crate::infrastructure::product::{
    AddImageRequest, CreateProductRequest, ProductDetail, UpdateProductRequest,
};

#[derive(Debug, Deserialize)]
pub struct CreateProductBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub stock: i32,
    pub price: Decimal,
    pub condition: ProductCondition,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateProductBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub condition: Option<ProductCondition>,
}

/// Attaches an already-processed image; upload and resizing happen upstream
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddImageBody {
    pub url: String,
    pub file_name: String,
    #[serde(default)]
    pub optimized_name: Option<String>,
    #[serde(default)]
    pub thumbnail_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub products: Vec<ProductOverview>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    pub success: bool,
    pub product: ProductDetail,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub success: bool,
    pub image: ProductImage,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub message: String,
}

/// GET /api/productos — public catalog
async fn list(State(state): State<AppState>) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.product_service.list().await?;

    Ok(Json(ProductListResponse {
        success: true,
        products,
    }))
}

/// GET /api/productos/mis-productos — the vendor's own listings
async fn list_own(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.product_service.list_own(user.id).await?;

    Ok(Json(ProductListResponse {
        success: true,
        products,
    }))
}

/// GET /api/productos/{id} — public detail with images
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductDetailResponse>, ApiError> {
    let product = state.product_service.get(id).await?;

    Ok(Json(ProductDetailResponse {
        success: true,
        product,
    }))
}

/// POST /api/productos — publish a listing (vendor only)
async fn create(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Json(body): Json<CreateProductBody>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = state
        .product_service
        .create(
            user.id,
            CreateProductRequest {
                name: body.name,
                description: body.description,
                stock: body.stock,
                price: body.price,
                condition: body.condition,
            },
        )
        .await?;

    info!(product_id = product.id, user_id = user.id, "product published");

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            success: true,
            product,
        }),
    ))
}

/// PUT /api/productos/{id} — update an owned listing
async fn update(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateProductBody>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .product_service
        .update(
            user.id,
            id,
            UpdateProductRequest {
                name: body.name,
                description: body.description,
                stock: body.stock,
                price: body.price,
                condition: body.condition,
            },
        )
        .await?;

    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// DELETE /api/productos/{id} — delete an owned listing with its images
async fn remove(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, ApiError> {
    state.product_service.delete(user.id, id).await?;

    info!(product_id = id, user_id = user.id, "product deleted");

    Ok(Json(DeletedResponse {
        success: true,
        message: "Product deleted".to_string(),
    }))
}

/// POST /api/productos/{id}/images — attach an image to an owned listing
async fn add_image(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AddImageBody>,
) -> Result<(StatusCode, Json<ImageResponse>), ApiError> {
    let image = state
        .product_service
        .add_image(
            user.id,
            id,
            AddImageRequest {
                url: body.url,
                file_name: body.file_name,
                optimized_name: body.optimized_name,
                thumbnail_name: body.thumbnail_name,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ImageResponse {
            success: true,
            image,
        }),
    ))
}

/// DELETE /api/productos/images/{imageId} — remove an image and its files
async fn remove_image(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Path(image_id): Path<i64>,
) -> Result<Json<DeletedResponse>, ApiError> {
    state.product_service.remove_image(user.id, image_id).await?;

    Ok(Json(DeletedResponse {
        success: true,
        message: "Image deleted".to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/mis-productos", get(list_own))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .route("/{id}/images", post(add_image))
        .route("/images/{image_id}", delete(remove_image))
}
