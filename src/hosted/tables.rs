//! Repository implementations backed by the hosted table endpoints

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use super::{at_most_one, HostedClient, Query};
use crate::db::repositories::{
    BlogPostRepository, CarouselImageRepository, ContactMessageRepository, CourseRepository,
    ProfileRepository,
};
use crate::models::{
    BlogPost, BlogPostUpdate, BlogPostWithAuthor, CarouselImage, ContactMessage, Course,
    NewBlogPost, NewContactMessage, NewProfile, Profile, ProfileUpdate, UserRole,
};

const POST_WITH_AUTHOR: &str = "*, author:profiles(*)";

/// Profiles stored in the hosted `profiles` table
pub struct HostedProfileRepository {
    client: HostedClient,
}

impl HostedProfileRepository {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: HostedClient) -> Arc<dyn ProfileRepository> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl ProfileRepository for HostedProfileRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Profile>> {
        let query = Query::new().select("*").eq("id", id);
        Ok(self.client.maybe_single("profiles", &query).await?)
    }

    async fn create(&self, profile: &NewProfile) -> Result<Profile> {
        let rows: Vec<Profile> = self.client.insert("profiles", profile).await?;
        rows.into_iter()
            .next()
            .context("Profile insert returned no row")
    }

    async fn update(&self, id: &str, update: &ProfileUpdate) -> Result<Option<Profile>> {
        let filter = Query::new().eq("id", id);
        let rows = self.client.update("profiles", &filter, update).await?;
        Ok(at_most_one(rows)?)
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<Profile>> {
        let query = Query::new()
            .select("*")
            .eq("role", role)
            .order("full_name", true);
        Ok(self.client.select("profiles", &query).await?)
    }
}

/// Courses stored in the hosted `courses` table
pub struct HostedCourseRepository {
    client: HostedClient,
}

impl HostedCourseRepository {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: HostedClient) -> Arc<dyn CourseRepository> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl CourseRepository for HostedCourseRepository {
    async fn list(&self) -> Result<Vec<Course>> {
        let query = Query::new().select("*").order("name", true);
        Ok(self.client.select("courses", &query).await?)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Course>> {
        let query = Query::new().select("*").eq("id", id);
        Ok(self.client.maybe_single("courses", &query).await?)
    }
}

/// News posts stored in the hosted `blog_posts` table
pub struct HostedBlogPostRepository {
    client: HostedClient,
}

impl HostedBlogPostRepository {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: HostedClient) -> Arc<dyn BlogPostRepository> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl BlogPostRepository for HostedBlogPostRepository {
    async fn list_published(&self, limit: i64, offset: i64) -> Result<Vec<BlogPostWithAuthor>> {
        let query = Query::new()
            .select(POST_WITH_AUTHOR)
            .eq("published", true)
            .order("created_at", false)
            .range(offset, offset + limit - 1);
        Ok(self.client.select("blog_posts", &query).await?)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<BlogPostWithAuthor>> {
        let query = Query::new().select(POST_WITH_AUTHOR).eq("id", id);
        Ok(self.client.maybe_single("blog_posts", &query).await?)
    }

    async fn create(&self, post: &NewBlogPost) -> Result<Option<BlogPost>> {
        let rows: Vec<BlogPost> = self.client.insert("blog_posts", post).await?;
        Ok(at_most_one(rows)?)
    }

    async fn update(&self, id: &str, update: &BlogPostUpdate) -> Result<Option<BlogPost>> {
        let filter = Query::new().eq("id", id);
        let rows = self.client.update("blog_posts", &filter, update).await?;
        Ok(at_most_one(rows)?)
    }
}

/// Messages stored in the hosted `contact_messages` table
pub struct HostedContactMessageRepository {
    client: HostedClient,
}

impl HostedContactMessageRepository {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: HostedClient) -> Arc<dyn ContactMessageRepository> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl ContactMessageRepository for HostedContactMessageRepository {
    async fn create(&self, message: &NewContactMessage) -> Result<Option<ContactMessage>> {
        let rows: Vec<ContactMessage> = self.client.insert("contact_messages", message).await?;
        Ok(at_most_one(rows)?)
    }
}

/// Banner images stored in the hosted `carousel_images` table
pub struct HostedCarouselImageRepository {
    client: HostedClient,
}

impl HostedCarouselImageRepository {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: HostedClient) -> Arc<dyn CarouselImageRepository> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl CarouselImageRepository for HostedCarouselImageRepository {
    async fn list_active(&self) -> Result<Vec<CarouselImage>> {
        let query = Query::new()
            .select("*")
            .eq("active", true)
            .order("display_order", true);
        Ok(self.client.select("carousel_images", &query).await?)
    }
}
