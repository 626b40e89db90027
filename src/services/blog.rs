//! Blog service
//!
//! News posts: the public paginated listing, single-post lookup and the
//! create/update operations used by staff.

use std::sync::Arc;

use super::ServiceError;
use crate::db::repositories::BlogPostRepository;
use crate::models::{BlogPost, BlogPostUpdate, BlogPostWithAuthor, NewBlogPost};

/// Posts per page load
pub const PAGE_SIZE: i64 = 20;

pub struct BlogService {
    repo: Arc<dyn BlogPostRepository>,
}

impl BlogService {
    pub fn new(repo: Arc<dyn BlogPostRepository>) -> Self {
        Self { repo }
    }

    /// Published posts, newest first. `limit` is capped at [`PAGE_SIZE`].
    pub async fn get_published_blog_posts(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BlogPostWithAuthor>, ServiceError> {
        let limit = limit.clamp(1, PAGE_SIZE);
        let offset = offset.max(0);
        Ok(self.repo.list_published(limit, offset).await?)
    }

    /// One page of the public listing (1-based)
    pub async fn get_page(&self, page: u32) -> Result<Vec<BlogPostWithAuthor>, ServiceError> {
        let page = i64::from(page.max(1));
        self.get_published_blog_posts(PAGE_SIZE, (page - 1) * PAGE_SIZE)
            .await
    }

    /// Any post by id, published or not
    pub async fn get_blog_post(&self, id: &str) -> Result<Option<BlogPostWithAuthor>, ServiceError> {
        Ok(self.repo.get_by_id(id).await?)
    }

    /// Post by id, hidden unless published
    pub async fn get_published_post(
        &self,
        id: &str,
    ) -> Result<Option<BlogPostWithAuthor>, ServiceError> {
        Ok(self.get_blog_post(id).await?.filter(|p| p.post.published))
    }

    pub async fn create_blog_post(&self, post: NewBlogPost) -> Result<BlogPost, ServiceError> {
        let post = post.normalized();
        self.repo
            .create(&post)
            .await?
            .ok_or_else(|| ServiceError::Missing("Falha ao criar postagem".to_string()))
    }

    pub async fn update_blog_post(
        &self,
        id: &str,
        updates: &BlogPostUpdate,
    ) -> Result<BlogPost, ServiceError> {
        self.repo
            .update(id, updates)
            .await?
            .ok_or_else(|| ServiceError::Missing("Falha ao atualizar postagem".to_string()))
    }
}
