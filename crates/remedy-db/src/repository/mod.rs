//! # Repository Module
//!
//! Database repository implementations for Remedy.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Route handler                                                         │
//! │       │                                                                 │
//! │       │  db.sales().record_sale(product_id, quantity)                  │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── record_sale(&self, product_id, quantity)                          │
//! │  └── list_with_products(&self)                                         │
//! │       │                                                                 │
//! │       │  SQL Query / Transaction                                        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • The storage handle is injected, never ambient                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Inventory CRUD
//! - [`sale::SaleRepository`] - The atomic sale transaction and listings
//! - [`account::AccountRepository`] - Login account administration

pub mod account;
pub mod product;
pub mod sale;
