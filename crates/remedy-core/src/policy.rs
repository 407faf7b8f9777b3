//! # Access & Stock Policy
//!
//! The two policy decisions the rest of the system defers to:
//! which roles may perform an operation, and when a stock level counts
//! as "low". Both are pure functions over values already in hand.
//!
//! ## Role Policy Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation                          Required roles                      │
//! │  ─────────────────────────────────  ──────────────────────────────      │
//! │  inventory read / write             any authenticated role              │
//! │  sales read / record                any authenticated role              │
//! │  account create / update / delete   admin only                          │
//! │  account list                       admin only                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `authorize` never consults storage: the role was frozen into the token
//! at issuance, and the decision is a set-membership check.

use crate::error::CoreError;
use crate::types::Role;

// =============================================================================
// Policy Constants
// =============================================================================

/// Stock level at or below which a product is flagged for reordering.
///
/// Defined once and consumed by both the sale response and the inventory
/// listing, so the two surfaces can never disagree.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Operations open to every authenticated role.
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::User];

/// Operations restricted to administrators.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

// =============================================================================
// Decisions
// =============================================================================

/// Checks a verified role against an operation's required roles.
///
/// ## Returns
/// * `Ok(())` - the role is permitted
/// * `Err(CoreError::Forbidden)` - valid credential, insufficient role
///
/// ## Example
/// ```rust
/// use remedy_core::{authorize, ADMIN_ONLY, ANY_ROLE};
/// use remedy_core::types::Role;
///
/// assert!(authorize(Role::Admin, ADMIN_ONLY).is_ok());
/// assert!(authorize(Role::User, ADMIN_ONLY).is_err());
/// assert!(authorize(Role::User, ANY_ROLE).is_ok());
/// ```
pub fn authorize(role: Role, required: &[Role]) -> Result<(), CoreError> {
    if required.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Forbidden { role })
    }
}

/// Whether a stock level is at or below the reorder threshold.
#[inline]
pub fn is_low_stock(quantity: i64) -> bool {
    quantity <= LOW_STOCK_THRESHOLD
}

// =============================================================================
// Unit Tests
// =============================================================================
