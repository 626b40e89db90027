//! Carousel image repository

use crate::db::DynDatabasePool;
use crate::models::CarouselImage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait CarouselImageRepository: Send + Sync {
    /// Active images ordered by `display_order`
    async fn list_active(&self) -> Result<Vec<CarouselImage>>;
}

pub struct SqlxCarouselImageRepository {
    pool: DynDatabasePool,
}

impl SqlxCarouselImageRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CarouselImageRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CarouselImageRepository for SqlxCarouselImageRepository {
    async fn list_active(&self) -> Result<Vec<CarouselImage>> {
        list_active_images_sqlite(self.pool.sqlite()).await
    }
}

async fn list_active_images_sqlite(pool: &SqlitePool) -> Result<Vec<CarouselImage>> {
    // NULL orders sort last, matching the hosted ascending order
    let rows = sqlx::query(
        r#"
        SELECT id, image_url, title, display_order, active, created_at
        FROM carousel_images
        WHERE active = 1
        ORDER BY display_order IS NULL, display_order ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list carousel images")?;

    Ok(rows
        .iter()
        .map(|row| CarouselImage {
            id: row.get("id"),
            image_url: row.get("image_url"),
            title: row.get("title"),
            display_order: row.get("display_order"),
            active: row.get("active"),
            created_at: row.get("created_at"),
        })
        .collect())
}
