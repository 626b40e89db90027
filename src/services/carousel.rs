//! Carousel service
//!
//! The home page banner shows the active rows of `carousel_images`. When the
//! table is empty or cannot be read, the built-in school photos are shown in
//! a random order instead.

use rand::seq::SliceRandom;
use std::sync::Arc;

use super::ServiceError;
use crate::db::repositories::CarouselImageRepository;
use crate::models::{CarouselImage, Slide};

const IMAGE_BASE: &str = "https://miaoda-site-img.s3cdn.medo.dev/images";

const BUILT_IN_SLIDES: &[(&str, &str)] = &[
    ("e9c6b595-56f1-444b-bade-86b5e3654d20", "Sala de Aula Moderna"),
    ("60c29a57-6024-4404-a35e-99ef8dafcbda", "Laboratório de Informática"),
    ("8d696446-d13d-4e36-b0cd-d4f450f0df60", "Oficina Mecânica"),
    ("0f464509-b322-4113-8546-e651da775a1d", "Biblioteca"),
    ("929e9d1b-0d04-421c-b58b-c2f6d71ec20b", "Pátio da Escola"),
    ("ad427174-90aa-4be4-8798-b1830db230a6", "Laboratório de Eletrônica"),
    ("f6161f75-3407-4753-9184-deb6de62cea5", "Sala de Tecnologia"),
    ("698a55f6-866a-4435-822b-e87960d1e5ab", "Fachada da Escola"),
];

/// Built-in slides in their declared order
pub fn built_in_slides() -> Vec<Slide> {
    BUILT_IN_SLIDES
        .iter()
        .map(|(image, title)| Slide {
            url: format!("{}/{}.jpg", IMAGE_BASE, image),
            title: title.to_string(),
        })
        .collect()
}

pub struct CarouselService {
    repo: Arc<dyn CarouselImageRepository>,
}

impl CarouselService {
    pub fn new(repo: Arc<dyn CarouselImageRepository>) -> Self {
        Self { repo }
    }

    /// Active images ordered by display order
    pub async fn get_active_carousel_images(&self) -> Result<Vec<CarouselImage>, ServiceError> {
        Ok(self.repo.list_active().await?)
    }

    /// Slides for the home page
    pub async fn slides(&self) -> Vec<Slide> {
        match self.get_active_carousel_images().await {
            Ok(images) if !images.is_empty() => images.into_iter().map(Slide::from).collect(),
            Ok(_) => shuffled_built_in(),
            Err(e) => {
                tracing::warn!("Failed to load carousel images: {}", e);
                shuffled_built_in()
            }
        }
    }
}

fn shuffled_built_in() -> Vec<Slide> {
    let mut slides = built_in_slides();
    slides.shuffle(&mut rand::rng());
    slides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{seed_carousel_image, test_pool};
    use crate::db::repositories::SqlxCarouselImageRepository;
    use anyhow::Result;
    use async_trait::async_trait;

    struct FailingRepo;

    #[async_trait]
    impl CarouselImageRepository for FailingRepo {
        async fn list_active(&self) -> Result<Vec<CarouselImage>> {
            anyhow::bail!("connection refused")
        }
    }

    fn sorted_titles(slides: &[Slide]) -> Vec<String> {
        let mut titles: Vec<_> = slides.iter().map(|s| s.title.clone()).collect();
        titles.sort();
        titles
    }

    #[tokio::test]
    async fn test_empty_table_uses_built_in_slides() {
        let pool = test_pool().await;
        let service = CarouselService::new(SqlxCarouselImageRepository::boxed(pool));

        let slides = service.slides().await;
        assert_eq!(slides.len(), 8);
        assert_eq!(sorted_titles(&slides), sorted_titles(&built_in_slides()));
    }

    #[tokio::test]
    async fn test_table_rows_take_precedence() {
        let pool = test_pool().await;
        seed_carousel_image(&pool, "i1", "Formatura 2024", Some(1), true).await;
        let service = CarouselService::new(SqlxCarouselImageRepository::boxed(pool));

        let slides = service.slides().await;
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "Formatura 2024");
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back() {
        let service = CarouselService::new(Arc::new(FailingRepo));

        assert!(service.get_active_carousel_images().await.is_err());
        assert_eq!(service.slides().await.len(), 8);
    }

    #[test]
    fn test_built_in_urls() {
        for slide in built_in_slides() {
            assert!(slide.url.starts_with("https://"));
            assert!(slide.url.ends_with(".jpg"));
        }
    }
}
