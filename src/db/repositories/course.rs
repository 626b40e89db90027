//! Course repository
//!
//! Courses are managed outside the site; this repository only reads them.

use crate::db::DynDatabasePool;
use crate::models::Course;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Course repository trait
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// All courses ordered by name
    async fn list(&self) -> Result<Vec<Course>>;

    /// Get a course by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Course>>;
}

/// SQLx-based course repository
pub struct SqlxCourseRepository {
    pool: DynDatabasePool,
}

impl SqlxCourseRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CourseRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CourseRepository for SqlxCourseRepository {
    async fn list(&self) -> Result<Vec<Course>> {
        list_courses_sqlite(self.pool.sqlite()).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Course>> {
        get_course_by_id_sqlite(self.pool.sqlite(), id).await
    }
}

async fn list_courses_sqlite(pool: &SqlitePool) -> Result<Vec<Course>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, description, workload, curriculum, image_url, created_at
        FROM courses
        ORDER BY name COLLATE NOCASE ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list courses")?;

    Ok(rows.iter().map(row_to_course).collect())
}

async fn get_course_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Course>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, description, workload, curriculum, image_url, created_at
        FROM courses
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get course by ID")?;

    Ok(row.as_ref().map(row_to_course))
}

fn row_to_course(row: &sqlx::sqlite::SqliteRow) -> Course {
    Course {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        workload: row.get("workload"),
        curriculum: row.get("curriculum"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
    }
}
