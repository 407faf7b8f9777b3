//! # Route Handlers
//!
//! Thin handlers over the access gate and the repositories. Each protected
//! handler follows the same shape:
//!
//! 1. `CurrentUser` extraction verifies the bearer token (401 on failure)
//! 2. `authorize` checks the role against the operation's policy (403)
//! 3. Input validation runs before any storage access (400)
//! 4. The repository call does the work; its error maps onto the status

pub mod auth;
pub mod inventory;
pub mod sales;
pub mod users;
