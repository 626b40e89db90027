//! Blog post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Profile;

/// News/blog post mirrored from the `blog_posts` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    /// Markdown source
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub author_id: Option<String>,
    /// Only published posts appear on the public listing
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post joined with its author's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPostWithAuthor {
    #[serde(flatten)]
    pub post: BlogPost,
    #[serde(default)]
    pub author: Option<Profile>,
}

impl BlogPostWithAuthor {
    /// Author name for the post card
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().map(|author| {
            author
                .full_name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or("Autor desconhecido")
        })
    }
}

/// Input for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub author_id: String,
    #[serde(default)]
    pub published: bool,
}

impl NewBlogPost {
    /// Blank optional fields become null.
    pub fn normalized(mut self) -> Self {
        self.excerpt = blank_to_none(self.excerpt);
        self.image_url = blank_to_none(self.image_url);
        self
    }
}

/// Partial post update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogPostUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
