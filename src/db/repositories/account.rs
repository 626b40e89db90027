//! Account repository
//!
//! Credentials used by the local auth provider. The hosted backend keeps its
//! own user table, so this repository has no hosted counterpart.

use crate::db::DynDatabasePool;
use crate::models::Account;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Account repository trait
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account
    async fn create(&self, account: &Account) -> Result<Account>;

    /// Get account by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Account>>;

    /// Get account by email (case-insensitive)
    async fn get_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Check if an email is already registered
    async fn exists_by_email(&self, email: &str) -> Result<bool>;
}

/// SQLx-based account repository
pub struct SqlxAccountRepository {
    pool: DynDatabasePool,
}

impl SqlxAccountRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn AccountRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AccountRepository for SqlxAccountRepository {
    async fn create(&self, account: &Account) -> Result<Account> {
        create_account_sqlite(self.pool.sqlite(), account).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Account>> {
        get_account_sqlite(self.pool.sqlite(), "id", id).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        get_account_sqlite(self.pool.sqlite(), "email", email).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}

async fn create_account_sqlite(pool: &SqlitePool, account: &Account) -> Result<Account> {
    sqlx::query(
        r#"
        INSERT INTO accounts (id, email, password_hash, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&account.id)
    .bind(&account.email)
    .bind(&account.password_hash)
    .bind(account.created_at)
    .execute(pool)
    .await
    .context("Failed to create account")?;

    Ok(account.clone())
}

/// `column` is one of the fixed names above, never user input.
async fn get_account_sqlite(pool: &SqlitePool, column: &str, value: &str) -> Result<Option<Account>> {
    let sql = format!(
        "SELECT id, email, password_hash, created_at FROM accounts WHERE {} = ?",
        column
    );

    let row = sqlx::query(&sql)
        .bind(value)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to get account by {}", column))?;

    Ok(row.map(|row| Account {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }))
}
