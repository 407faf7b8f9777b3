//! # Sale Repository
//!
//! The atomic sale transaction and sale listings.
//!
//! ## Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     record_sale(product_id, qty)                        │
//! │                                                                         │
//! │  1. BEGIN                                                              │
//! │  2. Touch the product row ──► transaction becomes THE writer           │
//! │  3. Read product row                                                   │
//! │     ├── absent ──────────────► ROLLBACK, ProductNotFound               │
//! │     └── quantity < qty ──────► ROLLBACK, InsufficientStock{available}  │
//! │  4. UPDATE quantity = quantity - qty                                   │
//! │  5. INSERT sale record                                                 │
//! │  6. COMMIT  ← steps 4-5 land together or not at all                    │
//! │  7. low_stock = remaining <= LOW_STOCK_THRESHOLD                       │
//! │                                                                         │
//! │  Two concurrent sales on one product serialize at step 2: the loser    │
//! │  waits on the write lock (bounded busy timeout) and then re-reads the  │
//! │  committed stock, so both can never decrement from the same level.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite has no `SELECT ... FOR UPDATE`; the row-touch update at step 2
//! promotes the transaction to the database's single writer before the
//! stock read, which is the engine's equivalent of an exclusive row lock
//! held until commit.
//!
//! There is no deduplication: resubmitting an identical request records a
//! second, independent sale.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use remedy_core::{is_low_stock, Product, SaleOutcome, SaleWithProduct};

// =============================================================================
// Errors
// =============================================================================

/// Outcomes of a sale transaction that are not successes.
///
/// `ProductNotFound` and `InsufficientStock` are expected business results
/// and are surfaced to the caller verbatim; `Db` is a storage fault that has
/// already been rolled back.
#[derive(Debug, Error)]
pub enum SaleError {
    /// No product exists with the requested id.
    #[error("Product not found")]
    ProductNotFound(i64),

    /// Not enough stock to cover the requested quantity.
    ///
    /// The message reports the available units so the caller can show it
    /// without a second lookup.
    #[error("Insufficient stock. Only {available} units available.")]
    InsufficientStock { available: i64 },

    /// Storage failure; the transaction was rolled back.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for SaleError {
    fn from(err: sqlx::Error) -> Self {
        SaleError::Db(DbError::from(err))
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Executes a sale as a single atomic unit of work.
    ///
    /// ## Preconditions
    /// `quantity` has already been validated as a positive integer; this
    /// method never opens a transaction for input that validation rejects.
    ///
    /// ## Guarantees
    /// - Stock is never observable below zero, even mid-transaction
    /// - A sale record exists if and only if its decrement committed
    /// - Concurrent sales on the same product serialize; sales on
    ///   different products only contend for the engine's write lock
    ///
    /// ## Errors
    /// * `SaleError::ProductNotFound` - no such product; nothing recorded
    /// * `SaleError::InsufficientStock` - stock short; nothing recorded
    /// * `SaleError::Db` - storage failure after rollback
    pub async fn record_sale(&self, product_id: i64, quantity: i64) -> Result<SaleOutcome, SaleError> {
        debug!(product_id, quantity, "Recording sale");

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // Serialization point. Touching the row makes this transaction the
        // writer before the stock read below, so no concurrent sale can
        // commit between our read and our decrement.
        sqlx::query("UPDATE products SET quantity = quantity WHERE id = ?1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, quantity, price, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(product) = product else {
            tx.rollback().await.map_err(DbError::from)?;
            return Err(SaleError::ProductNotFound(product_id));
        };

        if product.quantity < quantity {
            // No partial sale is ever applied.
            tx.rollback().await.map_err(DbError::from)?;
            return Err(SaleError::InsufficientStock {
                available: product.quantity,
            });
        }

        let new_quantity = product.quantity - quantity;
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE products SET
                quantity = ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(new_quantity)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO sales (product_id, quantity, sale_date)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let sale_id = inserted.last_insert_rowid();

        // Decrement and record land together or not at all.
        tx.commit().await.map_err(DbError::from)?;

        info!(
            sale_id,
            product_id,
            quantity,
            remaining = new_quantity,
            "Sale recorded"
        );

        Ok(SaleOutcome {
            sale: SaleWithProduct {
                id: sale_id,
                product_id,
                quantity,
                sale_date: now,
                product_name: product.name,
                unit_price: product.price,
            },
            remaining_stock: new_quantity,
            low_stock: is_low_stock(new_quantity),
        })
    }

    /// Lists all sales joined with product name and price.
    ///
    /// Plain read with no transactional requirement.
    pub async fn list_with_products(&self) -> DbResult<Vec<SaleWithProduct>> {
        let sales = sqlx::query_as::<_, SaleWithProduct>(
            r#"
            SELECT
                s.id,
                s.product_id,
                s.quantity,
                s.sale_date,
                p.name AS product_name,
                p.price AS unit_price
            FROM sales s
            JOIN products p ON s.product_id = p.id
            ORDER BY s.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Counts sale records (for diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use remedy_core::LOW_STOCK_THRESHOLD;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_record_sale_decrements_and_records() {
        let db = test_db().await;
        let product = db.products().insert("Aspirin", 5, 2.0).await.unwrap();

        let outcome = db.sales().record_sale(product.id, 3).await.unwrap();

        assert_eq!(outcome.remaining_stock, 2);
        assert!(outcome.low_stock); // 2 <= 10
        assert_eq!(outcome.sale.product_id, product.id);
        assert_eq!(outcome.sale.quantity, 3);
        assert_eq!(outcome.sale.product_name, "Aspirin");
        assert_eq!(outcome.sale.unit_price, 2.0);

        let stored = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 2);
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_stock_reports_available_and_changes_nothing() {
        let db = test_db().await;
        let product = db.products().insert("Aspirin", 5, 2.0).await.unwrap();
        db.sales().record_sale(product.id, 3).await.unwrap();

        let err = db.sales().record_sale(product.id, 10).await.unwrap_err();
        match err {
            SaleError::InsufficientStock { available } => assert_eq!(available, 2),
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert!(err.to_string().contains('2'));

        // Stock and records untouched by the failed sale.
        let stored = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 2);
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_creates_no_record() {
        let db = test_db().await;

        let err = db.sales().record_sale(999, 1).await.unwrap_err();
        assert!(matches!(err, SaleError::ProductNotFound(999)));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_identical_sales_are_not_deduplicated() {
        // Resubmission is documented to create a second independent sale.
        let db = test_db().await;
        let product = db.products().insert("Cough Syrup", 20, 4.5).await.unwrap();

        db.sales().record_sale(product.id, 4).await.unwrap();
        db.sales().record_sale(product.id, 4).await.unwrap();

        let stored = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 12);
        assert_eq!(db.sales().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_low_stock_flag_boundary() {
        let db = test_db().await;
        let product = db
            .products()
            .insert("Vitamin C", LOW_STOCK_THRESHOLD + 2, 8.0)
            .await
            .unwrap();

        // 12 -> 11: above threshold
        let outcome = db.sales().record_sale(product.id, 1).await.unwrap();
        assert!(!outcome.low_stock);

        // 11 -> 10: at threshold counts as low
        let outcome = db.sales().record_sale(product.id, 1).await.unwrap();
        assert!(outcome.low_stock);
    }

    #[tokio::test]
    async fn test_sale_of_entire_stock_reaches_zero() {
        let db = test_db().await;
        let product = db.products().insert("Gauze", 7, 1.0).await.unwrap();

        let outcome = db.sales().record_sale(product.id, 7).await.unwrap();
        assert_eq!(outcome.remaining_stock, 0);

        let err = db.sales().record_sale(product.id, 1).await.unwrap_err();
        assert!(matches!(err, SaleError::InsufficientStock { available: 0 }));
    }

    #[tokio::test]
    async fn test_list_with_products_joins_name_and_price() {
        let db = test_db().await;
        let product = db.products().insert("Thermometer", 9, 12.99).await.unwrap();
        db.sales().record_sale(product.id, 2).await.unwrap();
        db.sales().record_sale(product.id, 1).await.unwrap();

        let sales = db.sales().list_with_products().await.unwrap();
        assert_eq!(sales.len(), 2);
        assert!(sales.iter().all(|s| s.product_name == "Thermometer"));
        assert!(sales.iter().all(|s| s.unit_price == 12.99));
        assert_eq!(sales[0].quantity, 2);
        assert_eq!(sales[1].quantity, 1);
    }

    /// N concurrent one-unit sales against stock S, N > S: exactly S succeed,
    /// N - S fail with InsufficientStock, final stock is zero, and every
    /// decrement has a matching record.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_never_oversell() {
        const STOCK: i64 = 5;
        const CONTENDERS: usize = 8;

        // File-backed database: the in-memory pool is single-connection and
        // would serialize the contenders in the pool, not in the engine.
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("concurrency.db"))
            .max_connections(CONTENDERS as u32);
        let db = Database::new(config).await.unwrap();

        let product = db.products().insert("Insulin", STOCK, 30.0).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..CONTENDERS {
            let sales = db.sales();
            let product_id = product.id;
            handles.push(tokio::spawn(
                async move { sales.record_sale(product_id, 1).await },
            ));
        }

        let mut successes = 0;
        let mut rejections = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(outcome) => {
                    assert!(outcome.remaining_stock >= 0);
                    successes += 1;
                }
                Err(SaleError::InsufficientStock { available }) => {
                    assert_eq!(available, 0);
                    rejections += 1;
                }
                Err(other) => panic!("unexpected error under contention: {other:?}"),
            }
        }

        assert_eq!(successes, STOCK as usize);
        assert_eq!(rejections, CONTENDERS - STOCK as usize);

        let stored = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 0);

        // No decrement without a record and vice versa.
        let sales = db.sales().list_with_products().await.unwrap();
        let sold: i64 = sales.iter().map(|s| s.quantity).sum();
        assert_eq!(sold, STOCK);
    }
}
