//! Inventory CRUD routes.
//!
//! Open to any authenticated role. Restocking and corrections go through
//! `PUT`; sale decrements never do (they go through the sale transaction).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use remedy_core::validation::{validate_price, validate_product_name, validate_stock_quantity};
use remedy_core::{authorize, is_low_stock, Product, ANY_ROLE};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// DTOs
// =============================================================================

/// A product as listed to clients, with the low-stock flag attached.
///
/// The flag uses the same policy constant as the sale response, so the two
/// surfaces always agree on what "low" means.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
    pub low_stock: bool,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        ProductResponse {
            id: product.id,
            name: product.name,
            quantity: product.quantity,
            price: product.price,
            low_stock: is_low_stock(product.quantity),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub quantity: i64,
    pub price: f64,
}

impl ProductPayload {
    /// Runs all field validations; returns the trimmed name.
    fn validate(&self) -> Result<String, ApiError> {
        let name = validate_product_name(&self.name)?;
        validate_stock_quantity(self.quantity)?;
        validate_price(self.price)?;
        Ok(name)
    }
}

fn require_payload(
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> Result<ProductPayload, ApiError> {
    let Json(payload) = payload.map_err(|_| {
        ApiError::BadRequest("Valid name, quantity and price are required".to_string())
    })?;
    Ok(payload)
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/inventory` - list products with their low-stock flags.
pub async fn list_products(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    authorize(user.role(), ANY_ROLE)?;

    let products = state.db.products().list().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// `POST /api/inventory` - add a product (201).
pub async fn create_product(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    authorize(user.role(), ANY_ROLE)?;

    let payload = require_payload(payload)?;
    let name = payload.validate()?;

    let product = state
        .db
        .products()
        .insert(&name, payload.quantity, payload.price)
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `PUT /api/inventory/:id` - rewrite a product (restock/correction path).
pub async fn update_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> Result<Json<ProductResponse>, ApiError> {
    authorize(user.role(), ANY_ROLE)?;

    let payload = require_payload(payload)?;
    let name = payload.validate()?;

    let product = state
        .db
        .products()
        .update(id, &name, payload.quantity, payload.price)
        .await?;

    Ok(Json(product.into()))
}

/// `DELETE /api/inventory/:id` - remove a product (204).
pub async fn delete_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(user.role(), ANY_ROLE)?;

    state.db.products().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
