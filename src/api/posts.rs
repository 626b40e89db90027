//! Blog post API endpoints
//!
//! - GET /api/v1/posts - Published posts, newest first
//! - GET /api/v1/posts/{id} - One post (unpublished ones only for staff)
//! - POST /api/v1/posts - Create (teacher/admin)
//! - PUT /api/v1/posts/{id} - Update (teacher/admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, Viewer};
use crate::models::{BlogPost, BlogPostUpdate, BlogPostWithAuthor, NewBlogPost};

/// Paginated post list
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub page: u32,
    pub page_size: i64,
}

/// Post with its author and rendered content
#[derive(Debug, Serialize)]
pub struct PostResponse {
    #[serde(flatten)]
    pub post: BlogPostWithAuthor,
    pub author_name: Option<String>,
    pub content_html: String,
}

/// Request body for creating a post; the author is the caller
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
}

fn to_response(state: &AppState, post: BlogPostWithAuthor) -> PostResponse {
    PostResponse {
        author_name: post.author_name().map(String::from),
        content_html: state.markdown.render(&post.post.content),
        post,
    }
}

/// GET /api/v1/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let (limit, offset) = query.limit_offset();

    let posts = state
        .blog_service
        .get_published_blog_posts(limit, offset)
        .await?
        .into_iter()
        .map(|post| to_response(&state, post))
        .collect();

    Ok(Json(PostListResponse {
        posts,
        page: query.page.max(1),
        page_size: limit,
    }))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let staff = viewer.as_ref().map_or(false, |v| v.is_staff());

    let post = state
        .blog_service
        .get_blog_post(&id)
        .await?
        .filter(|p| p.post.published || staff)
        .ok_or_else(|| ApiError::not_found(format!("Post not found: {}", id)))?;

    Ok(Json(to_response(&state, post)))
}

/// POST /api/v1/posts
pub async fn create_post(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::validation_error("Title is required"));
    }
    if body.content.trim().is_empty() {
        return Err(ApiError::validation_error("Content is required"));
    }

    let post = state
        .blog_service
        .create_blog_post(NewBlogPost {
            title: body.title.trim().to_string(),
            content: body.content,
            excerpt: body.excerpt,
            image_url: body.image_url,
            author_id: user.id,
            published: body.published,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/v1/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<BlogPostUpdate>,
) -> Result<Json<BlogPost>, ApiError> {
    if body.title.as_deref().map_or(false, |t| t.trim().is_empty()) {
        return Err(ApiError::validation_error("Title cannot be empty"));
    }

    if state.blog_service.get_blog_post(&id).await?.is_none() {
        return Err(ApiError::not_found(format!("Post not found: {}", id)));
    }

    Ok(Json(state.blog_service.update_blog_post(&id, &body).await?))
}
