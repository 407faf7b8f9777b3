//! User administration routes.
//!
//! Every operation here, listing included, is admin-only. The password
//! column never leaves the server: responses carry a dedicated DTO.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use remedy_core::validation::validate_username;
use remedy_core::{authorize, Account, Role, ADMIN_ONLY};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// DTOs
// =============================================================================

/// An account as listed to admins. No secret material.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl From<Account> for UserResponse {
    fn from(account: Account) -> Self {
        UserResponse {
            id: account.id,
            username: account.username,
            role: account.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    /// Omitted password keeps the stored secret.
    pub password: Option<String>,
    pub role: Role,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/users` - list accounts (admin only).
pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    authorize(user.role(), ADMIN_ONLY)?;

    let accounts = state.db.accounts().list().await?;
    Ok(Json(accounts.into_iter().map(UserResponse::from).collect()))
}

/// `POST /api/users` - create an account (admin only, 201).
pub async fn create_user(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    authorize(user.role(), ADMIN_ONLY)?;

    let Json(req) = payload.map_err(|_| {
        ApiError::BadRequest("Valid username, password and role are required".to_string())
    })?;

    let username = validate_username(&req.username)?;
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("password is required".to_string()));
    }

    let account = state
        .db
        .accounts()
        .insert(&username, &req.password, req.role)
        .await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// `PUT /api/users/:id` - update an account (admin only).
///
/// A role change affects future logins only; tokens already issued carry
/// their role claim until they expire.
pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    authorize(user.role(), ADMIN_ONLY)?;

    let Json(req) = payload.map_err(|_| {
        ApiError::BadRequest("Valid username and role are required".to_string())
    })?;

    let username = validate_username(&req.username)?;

    let account = state
        .db
        .accounts()
        .update(id, &username, req.password.as_deref(), req.role)
        .await?;

    Ok(Json(account.into()))
}

/// `DELETE /api/users/:id` - delete an account (admin only, 204).
///
/// Sessions already issued from the account stay valid until expiry.
pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(user.role(), ADMIN_ONLY)?;

    state.db.accounts().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
