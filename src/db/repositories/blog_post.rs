//! Blog post repository
//!
//! Database operations for news posts. Reads join the author's profile.

use crate::db::DynDatabasePool;
use crate::models::{BlogPost, BlogPostUpdate, BlogPostWithAuthor, NewBlogPost, Profile};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Blog post repository trait
#[async_trait]
pub trait BlogPostRepository: Send + Sync {
    /// Published posts, newest first, in the window `[offset, offset + limit)`
    async fn list_published(&self, limit: i64, offset: i64) -> Result<Vec<BlogPostWithAuthor>>;

    /// Get a post (published or not) with its author
    async fn get_by_id(&self, id: &str) -> Result<Option<BlogPostWithAuthor>>;

    /// Insert a post. `None` when the backend returned no row.
    async fn create(&self, post: &NewBlogPost) -> Result<Option<BlogPost>>;

    /// Apply a partial update. `None` when no row matched.
    async fn update(&self, id: &str, update: &BlogPostUpdate) -> Result<Option<BlogPost>>;
}

/// SQLx-based blog post repository
pub struct SqlxBlogPostRepository {
    pool: DynDatabasePool,
}

impl SqlxBlogPostRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BlogPostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl BlogPostRepository for SqlxBlogPostRepository {
    async fn list_published(&self, limit: i64, offset: i64) -> Result<Vec<BlogPostWithAuthor>> {
        list_published_posts_sqlite(self.pool.sqlite(), limit, offset).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<BlogPostWithAuthor>> {
        get_post_by_id_sqlite(self.pool.sqlite(), id).await
    }

    async fn create(&self, post: &NewBlogPost) -> Result<Option<BlogPost>> {
        create_post_sqlite(self.pool.sqlite(), post).await
    }

    async fn update(&self, id: &str, update: &BlogPostUpdate) -> Result<Option<BlogPost>> {
        update_post_sqlite(self.pool.sqlite(), id, update).await
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

const SELECT_WITH_AUTHOR: &str = r#"
    SELECT b.id, b.title, b.content, b.excerpt, b.image_url, b.author_id,
           b.published, b.created_at, b.updated_at,
           p.id AS author_profile_id, p.email AS author_email,
           p.full_name AS author_full_name, p.role AS author_role,
           p.phone AS author_phone, p.created_at AS author_created_at
    FROM blog_posts b
    LEFT JOIN profiles p ON p.id = b.author_id
"#;

async fn list_published_posts_sqlite(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<BlogPostWithAuthor>> {
    let sql = format!(
        "{} WHERE b.published = 1 ORDER BY b.created_at DESC LIMIT ? OFFSET ?",
        SELECT_WITH_AUTHOR
    );

    let rows = sqlx::query(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list published posts")?;

    rows.iter().map(row_to_post_with_author).collect()
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<BlogPostWithAuthor>> {
    let sql = format!("{} WHERE b.id = ?", SELECT_WITH_AUTHOR);

    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    row.map(|row| row_to_post_with_author(&row)).transpose()
}

async fn get_post_row_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<BlogPost>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, content, excerpt, image_url, author_id, published, created_at, updated_at
        FROM blog_posts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get post by ID")?;

    Ok(row.as_ref().map(row_to_post))
}

async fn create_post_sqlite(pool: &SqlitePool, post: &NewBlogPost) -> Result<Option<BlogPost>> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO blog_posts
            (id, title, content, excerpt, image_url, author_id, published, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.excerpt)
    .bind(&post.image_url)
    .bind(&post.author_id)
    .bind(post.published)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    get_post_row_sqlite(pool, &id).await
}

async fn update_post_sqlite(
    pool: &SqlitePool,
    id: &str,
    update: &BlogPostUpdate,
) -> Result<Option<BlogPost>> {
    let result = sqlx::query(
        r#"
        UPDATE blog_posts
        SET title = COALESCE(?, title),
            content = COALESCE(?, content),
            excerpt = COALESCE(?, excerpt),
            image_url = COALESCE(?, image_url),
            published = COALESCE(?, published),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&update.title)
    .bind(&update.content)
    .bind(&update.excerpt)
    .bind(&update.image_url)
    .bind(update.published)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_post_row_sqlite(pool, id).await
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> BlogPost {
    BlogPost {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        excerpt: row.get("excerpt"),
        image_url: row.get("image_url"),
        author_id: row.get("author_id"),
        published: row.get("published"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_post_with_author(row: &sqlx::sqlite::SqliteRow) -> Result<BlogPostWithAuthor> {
    let author_id: Option<String> = row.get("author_profile_id");

    let author = match author_id {
        Some(id) => {
            let role: String = row.get("author_role");
            Some(Profile {
                id,
                email: row.get("author_email"),
                full_name: row.get("author_full_name"),
                role: role.parse()?,
                phone: row.get("author_phone"),
                created_at: row.get("author_created_at"),
            })
        }
        None => None,
    };

    Ok(BlogPostWithAuthor {
        post: row_to_post(row),
        author,
    })
}
