//! Login route.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use remedy_core::Role;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub username: String,
}

/// `POST /api/auth/login`
///
/// Exchanges a username/password pair for a signed session token.
///
/// ## Responses
/// * `200` - `{token, role, username}`
/// * `400` - missing fields
/// * `401` - unknown username or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload
        .map_err(|_| ApiError::BadRequest("Username and password are required".to_string()))?;

    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let issued = state.gate.issue(&username, &password).await?;

    Ok(Json(LoginResponse {
        token: issued.token,
        role: issued.role,
        username: issued.username,
    }))
}
