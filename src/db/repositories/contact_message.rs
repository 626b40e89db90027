//! Contact message repository

use crate::db::DynDatabasePool;
use crate::models::{ContactMessage, NewContactMessage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Contact message repository trait. Messages are write-only for the site.
#[async_trait]
pub trait ContactMessageRepository: Send + Sync {
    /// Insert a message. `None` when the backend returned no row.
    async fn create(&self, message: &NewContactMessage) -> Result<Option<ContactMessage>>;
}

pub struct SqlxContactMessageRepository {
    pool: DynDatabasePool,
}

impl SqlxContactMessageRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ContactMessageRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ContactMessageRepository for SqlxContactMessageRepository {
    async fn create(&self, message: &NewContactMessage) -> Result<Option<ContactMessage>> {
        create_message_sqlite(self.pool.sqlite(), message).await
    }
}

async fn create_message_sqlite(
    pool: &SqlitePool,
    message: &NewContactMessage,
) -> Result<Option<ContactMessage>> {
    let id = uuid::Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO contact_messages (id, name, email, phone, message, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&message.name)
    .bind(&message.email)
    .bind(&message.phone)
    .bind(&message.message)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to create contact message")?;

    let row = sqlx::query(
        "SELECT id, name, email, phone, message, created_at FROM contact_messages WHERE id = ?",
    )
    .bind(&id)
    .fetch_optional(pool)
    .await
    .context("Failed to read back contact message")?;

    Ok(row.map(|row| ContactMessage {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        message: row.get("message"),
        created_at: row.get("created_at"),
    }))
}
