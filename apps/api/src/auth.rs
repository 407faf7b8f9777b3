//! # Access Gate
//!
//! Issues and verifies the stateless session tokens that every protected
//! route passes through, and extracts the verified identity for handlers.
//!
//! ## Token Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Credential Lifecycle                              │
//! │                                                                         │
//! │  POST /api/auth/login {username, password}                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  issue() ── account lookup + secret check ──► signed JWT               │
//! │             {sub, role, iat, exp, jti}        (HS256, fixed expiry)    │
//! │                                                                         │
//! │  Authorization: Bearer <token>                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  verify() ── signature + expiry only, NO storage lookup ──► Claims     │
//! │                                                                         │
//! │  The role claim is frozen at issuance. Changing or deleting the        │
//! │  account never touches tokens already in the wild; bounded lifetime    │
//! │  is the only revocation mechanism.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use remedy_core::Role;
use remedy_db::{AccountRepository, DbError};

use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// Claims
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Role at issuance time
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// A freshly issued credential, echoed back to the login caller.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub role: Role,
    pub username: String,
}

// =============================================================================
// Errors
// =============================================================================

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong secret. One variant for both cases so the
    /// response can never leak whether a username exists.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Missing, malformed, foreign-signed, or expired token.
    #[error("Missing or invalid authentication token")]
    Unauthenticated,

    /// Token could not be signed.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Storage failure during the login lookup.
    #[error(transparent)]
    Db(#[from] DbError),
}

// =============================================================================
// Access Gate
// =============================================================================

/// Converts presented credentials into verified identities.
///
/// `issue` consults storage once, at login. `verify` is pure over the
/// token bytes and the signing secret, so it runs fully in parallel with
/// anything else.
#[derive(Clone)]
pub struct AccessGate {
    accounts: AccountRepository,
    secret: String,
    token_lifetime_secs: i64,
}

impl AccessGate {
    /// Create a new access gate.
    pub fn new(accounts: AccountRepository, secret: String, token_lifetime_secs: i64) -> Self {
        AccessGate {
            accounts,
            secret,
            token_lifetime_secs,
        }
    }

    /// Exchange a username/secret pair for a signed token.
    ///
    /// ## Errors
    /// * `AuthError::InvalidCredentials` - unknown username or wrong secret
    /// * `AuthError::Db` - storage failure during the lookup
    pub async fn issue(&self, username: &str, secret: &str) -> Result<IssuedToken, AuthError> {
        let account = self
            .accounts
            .get_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if account.password != secret {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let exp = now + Duration::seconds(self.token_lifetime_secs);

        let claims = Claims {
            sub: account.username.clone(),
            role: account.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Signing(e.to_string()))?;

        tracing::info!(username = %account.username, role = %account.role, "Token issued");

        Ok(IssuedToken {
            token,
            role: account.role,
            username: account.username,
        })
    }

    /// Validate and decode a token.
    ///
    /// Never consults storage: a tampered-but-never-issued signature and an
    /// expired signature are both rejected without a lookup.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| AuthError::Unauthenticated)?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from an authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

// =============================================================================
// Request Extraction
// =============================================================================

/// The verified identity of the caller, extracted from the bearer token.
///
/// Handlers take this as an argument; requests without a verifiable token
/// are rejected with 401 before the handler body runs. Role checks stay in
/// the handlers, against the policy table in remedy-core.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl CurrentUser {
    /// The role frozen into the token at issuance.
    pub fn role(&self) -> Role {
        self.0.role
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::Unauthenticated)?;

        let token = extract_bearer_token(header).ok_or(AuthError::Unauthenticated)?;

        let claims = state.gate.verify(token)?;

        Ok(CurrentUser(claims))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use remedy_db::{Database, DbConfig};

    async fn gate_with_account(username: &str, password: &str, role: Role) -> (Database, AccessGate) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.accounts().insert(username, password, role).await.unwrap();
        let gate = AccessGate::new(db.accounts(), "test-secret".to_string(), 3600);
        (db, gate)
    }

    #[tokio::test]
    async fn test_issue_then_verify_roundtrip() {
        let (_db, gate) = gate_with_account("alice", "s3cret", Role::Admin).await;

        let issued = gate.issue("alice", "s3cret").await.unwrap();
        assert_eq!(issued.username, "alice");
        assert_eq!(issued.role, Role::Admin);

        let claims = gate.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_secret_are_indistinguishable() {
        let (_db, gate) = gate_with_account("alice", "s3cret", Role::User).await;

        let unknown = gate.issue("nobody", "whatever").await.unwrap_err();
        let wrong = gate.issue("alice", "wrong").await.unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_role_claim_survives_account_role_change() {
        // The token is not re-checked against current account state.
        let (db, gate) = gate_with_account("bob", "pw", Role::User).await;

        let issued = gate.issue("bob", "pw").await.unwrap();

        let account = db.accounts().get_by_username("bob").await.unwrap().unwrap();
        db.accounts()
            .update(account.id, "bob", None, Role::Admin)
            .await
            .unwrap();

        let claims = gate.verify(&issued.token).unwrap();
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn test_tampered_token_is_rejected() {
        let (_db, gate) = gate_with_account("alice", "s3cret", Role::User).await;
        let issued = gate.issue("alice", "s3cret").await.unwrap();

        // Flip the last signature character.
        let mut tampered = issued.token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(matches!(
            gate.verify(&tampered).unwrap_err(),
            AuthError::Unauthenticated
        ));
    }

    #[tokio::test]
    async fn test_foreign_signed_token_is_rejected() {
        let (_db, gate) = gate_with_account("alice", "s3cret", Role::User).await;
        let (_db2, foreign_gate) = gate_with_account("alice", "s3cret", Role::Admin).await;

        // Same claims, different signing secret.
        let foreign = AccessGate::new(
            foreign_gate.accounts.clone(),
            "other-secret".to_string(),
            3600,
        );
        let issued = foreign.issue("alice", "s3cret").await.unwrap();

        assert!(matches!(
            gate.verify(&issued.token).unwrap_err(),
            AuthError::Unauthenticated
        ));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.accounts().insert("carol", "pw", Role::User).await.unwrap();

        // Negative lifetime puts exp beyond the validator's leeway.
        let gate = AccessGate::new(db.accounts(), "test-secret".to_string(), -120);
        let issued = gate.issue("carol", "pw").await.unwrap();

        assert!(matches!(
            gate.verify(&issued.token).unwrap_err(),
            AuthError::Unauthenticated
        ));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token(""), None);
    }
}
