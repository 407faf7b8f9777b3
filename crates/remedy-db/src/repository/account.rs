//! # Account Repository
//!
//! Database operations for login accounts.
//!
//! The login path only ever reads by username; everything else is
//! admin-gated CRUD. Deleting an account does not touch sessions already
//! issued from it: tokens are stateless and expire on their own.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use remedy_core::{Account, Role};

/// Repository for account database operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Gets an account by username (the login lookup).
    ///
    /// ## Returns
    /// * `Ok(Some(Account))` - Account found
    /// * `Ok(None)` - No such username
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password, role, created_at, updated_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Gets an account by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password, role, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Lists all accounts, sorted by username.
    pub async fn list(&self) -> DbResult<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password, role, created_at, updated_at
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    /// Inserts a new account.
    ///
    /// ## Returns
    /// * `Ok(Account)` - Inserted account with generated id
    /// * `Err(DbError::UniqueViolation)` - Username already exists
    pub async fn insert(&self, username: &str, password: &str, role: Role) -> DbResult<Account> {
        debug!(username = %username, role = %role, "Inserting account");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(username)
        .bind(password)
        .bind(role)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Account {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            password: password.to_string(),
            role,
            created_at: now,
            updated_at: now,
        })
    }

    /// Updates an existing account.
    ///
    /// A `None` password keeps the stored secret; role and username are
    /// always rewritten. The change takes effect on the next login only,
    /// since issued tokens carry their role claim to expiry.
    ///
    /// ## Returns
    /// * `Ok(Account)` - Update successful
    /// * `Err(DbError::NotFound)` - Account doesn't exist
    pub async fn update(
        &self,
        id: i64,
        username: &str,
        password: Option<&str>,
        role: Role,
    ) -> DbResult<Account> {
        debug!(id, username = %username, "Updating account");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = ?2,
                password = COALESCE(?3, password),
                role = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(password)
        .bind(role)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Deletes an account.
    ///
    /// ## Returns
    /// * `Ok(())` - Delete successful
    /// * `Err(DbError::NotFound)` - Account doesn't exist
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting account");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
