//! Sales routes: the listing and the transactional sale endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use remedy_core::validation::validate_sale_quantity;
use remedy_core::{authorize, SaleWithProduct, ANY_ROLE};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// A sale joined with product details, as sent to clients.
///
/// `unit_price` serializes as a JSON number, never a string.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub timestamp: DateTime<Utc>,
    pub product_name: String,
    pub unit_price: f64,
}

impl From<SaleWithProduct> for SaleResponse {
    fn from(sale: SaleWithProduct) -> Self {
        SaleResponse {
            id: sale.id,
            product_id: sale.product_id,
            quantity: sale.quantity,
            timestamp: sale.sale_date,
            product_name: sale.product_name,
            unit_price: sale.unit_price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleResponse {
    pub sale: SaleResponse,
    pub low_stock: bool,
    pub remaining_stock: i64,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/sales` - list sales joined with product name and price.
pub async fn list_sales(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<SaleResponse>>, ApiError> {
    authorize(user.role(), ANY_ROLE)?;

    let sales = state.db.sales().list_with_products().await?;
    Ok(Json(sales.into_iter().map(SaleResponse::from).collect()))
}

/// `POST /api/sales` - record a sale atomically.
///
/// ## Responses
/// * `201` - `{sale, lowStock, remainingStock}`
/// * `400` - missing/non-integer fields, non-positive quantity, or
///           insufficient stock (message reports the available units)
/// * `404` - product does not exist
///
/// Resubmitting an identical request records a second sale; there is no
/// deduplication.
pub async fn record_sale(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<RecordSaleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordSaleResponse>), ApiError> {
    authorize(user.role(), ANY_ROLE)?;

    let Json(req) = payload.map_err(|_| {
        ApiError::BadRequest("Valid product ID and positive quantity are required".to_string())
    })?;

    // Rejected before any storage access.
    validate_sale_quantity(req.quantity)?;

    let outcome = state
        .db
        .sales()
        .record_sale(req.product_id, req.quantity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordSaleResponse {
            sale: outcome.sale.into(),
            low_stock: outcome.low_stock,
            remaining_stock: outcome.remaining_stock,
        }),
    ))
}
