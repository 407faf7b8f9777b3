//! # Domain Types
//!
//! Core domain types used throughout Remedy.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   SaleRecord    │   │    Account      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │       │
//! │  │  name           │   │  product_id(FK) │   │  username (UQ)  │       │
//! │  │  quantity ≥ 0   │   │  quantity > 0   │   │  password       │       │
//! │  │  price ≥ 0      │   │  sale_date      │   │  role           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  `Product.quantity` is the single source of truth for availability.    │
//! │  A `SaleRecord` exists if and only if its stock decrement committed.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entities use integer primary keys because the wire contract identifies
//! products and sales by integer ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Role
// =============================================================================

/// An account's role, carried verbatim in the session token.
///
/// ## Lifetime
/// The role claim inside a token is frozen at issuance. Changing an
/// account's role takes effect on the next login, never retroactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum Role {
    /// Full access, including account administration.
    Admin,
    /// Inventory and sales access only.
    User,
}

impl Role {
    /// Stable lowercase name, matching the database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product tracked in inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (auto-increment).
    pub id: i64,

    /// Display name shown in inventory and on sale listings.
    pub name: String,

    /// Units currently on the shelf. Never negative.
    pub quantity: i64,

    /// Unit price in currency units (non-negative).
    pub price: f64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// An immutable record of a committed sale.
///
/// Append-only: a row is inserted in the same transaction as the stock
/// decrement and is never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleRecord {
    /// Unique identifier (auto-increment).
    pub id: i64,

    /// The product that was sold.
    pub product_id: i64,

    /// Units sold (positive).
    pub quantity: i64,

    /// When the sale was committed.
    pub sale_date: DateTime<Utc>,
}

/// A sale joined with its product's name and price, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleWithProduct {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub sale_date: DateTime<Utc>,
    pub product_name: String,
    pub unit_price: f64,
}

/// Result of a committed sale transaction.
///
/// `remaining_stock` and `low_stock` are computed from the post-decrement
/// quantity inside the transaction, so they cannot reflect a level that was
/// never observable.
#[derive(Debug, Clone)]
pub struct SaleOutcome {
    /// The inserted sale, joined with product details.
    pub sale: SaleWithProduct,

    /// Stock level after the decrement.
    pub remaining_stock: i64,

    /// Whether the remaining stock is at or below [`crate::LOW_STOCK_THRESHOLD`].
    pub low_stock: bool,
}

// =============================================================================
// Account
// =============================================================================

/// A back-office login account.
///
/// `password` is an opaque comparable secret; how it is produced is the
/// caller's concern. It must never be serialized into API responses, which
/// is why route handlers map accounts onto dedicated DTOs.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Account {
    /// Unique identifier (auto-increment).
    pub id: i64,

    /// Login name (unique).
    pub username: String,

    /// Comparable credential secret.
    pub password: String,

    /// Role granted to sessions issued from this account.
    pub role: Role,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");

        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_role_rejects_unknown_values() {
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::User.to_string(), "user");
    }
}
