//! Carousel image model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Banner image mirrored from the `carousel_images` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselImage {
    pub id: String,
    pub image_url: String,
    pub title: Option<String>,
    pub display_order: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Slide rendered by the home page carousel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub url: String,
    pub title: String,
}

impl From<CarouselImage> for Slide {
    fn from(image: CarouselImage) -> Self {
        Self {
            url: image.image_url,
            title: image.title.unwrap_or_default(),
        }
    }
}
