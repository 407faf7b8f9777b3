//! # Product Repository
//!
//! Database operations for inventory products.
//!
//! Plain CRUD with no concurrency concerns: restocking and corrections go
//! through [`ProductRepository::update`], while sale decrements go through
//! the sale transaction exclusively ([`crate::SaleRepository::record_sale`]).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use remedy_core::Product;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let products = repo.list().await?;
/// let product = repo.get_by_id(1).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, quantity, price, created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, quantity, price, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// The inserted product with its generated id.
    pub async fn insert(&self, name: &str, quantity: i64, price: f64) -> DbResult<Product> {
        debug!(name = %name, quantity, price, "Inserting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, quantity, price, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(name)
        .bind(quantity)
        .bind(price)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            quantity,
            price,
            created_at: now,
            updated_at: now,
        })
    }

    /// Updates an existing product (restock / correction path).
    ///
    /// ## Returns
    /// * `Ok(Product)` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(
        &self,
        id: i64,
        name: &str,
        quantity: i64,
        price: f64,
    ) -> DbResult<Product> {
        debug!(id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                quantity = ?3,
                price = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(quantity)
        .bind(price)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        // The row was just written; a vanished product here is a storage fault.
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product.
    ///
    /// ## Returns
    /// * `Ok(())` - Delete successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::ForeignKeyViolation)` - Recorded sales still reference it
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
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
    use crate::pool::{Database, DbConfig};
    use crate::error::DbError;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.insert("Ibuprofen 200mg", 40, 5.49).await.unwrap();
        assert!(product.id > 0);

        let fetched = repo.get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Ibuprofen 200mg");
        assert_eq!(fetched.quantity, 40);
        assert_eq!(fetched.price, 5.49);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = test_db().await;
        assert!(db.products().get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_rewrites_all_fields() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.insert("Paracetamol", 10, 3.0).await.unwrap();
        let updated = repo
            .update(product.id, "Paracetamol 500mg", 25, 3.25)
            .await
            .unwrap();

        assert_eq!(updated.name, "Paracetamol 500mg");
        assert_eq!(updated.quantity, 25);
        assert_eq!(updated.price, 3.25);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = test_db().await;
        let err = db.products().update(999, "Ghost", 1, 1.0).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.insert("Bandages", 5, 2.5).await.unwrap();
        repo.delete(product.id).await.unwrap();

        assert!(repo.get_by_id(product.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(product.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_referenced_product_is_rejected() {
        let db = test_db().await;
        let product = db.products().insert("Syrup", 5, 4.0).await.unwrap();
        db.sales().record_sale(product.id, 1).await.unwrap();

        let err = db.products().delete(product.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
