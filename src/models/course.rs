//! Course model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image used when a course has no image of its own and no well-known one.
pub const DEFAULT_COURSE_IMAGE: &str =
    "https://miaoda-site-img.s3cdn.medo.dev/images/5a30e128-cf3c-499f-bdd2-112e6063a5af.jpg";

/// Well-known images for the school's courses, keyed by course name.
const COURSE_IMAGES: &[(&str, &str)] = &[
    ("Desenvolvimento de Sistemas", "https://miaoda-site-img.s3cdn.medo.dev/images/067ce5cb-a82f-450f-9218-70a54897e807.jpg"),
    ("Informática", "https://miaoda-site-img.s3cdn.medo.dev/images/8822747e-112f-4ec9-b195-8651b285094c.jpg"),
    ("Logística", "https://miaoda-site-img.s3cdn.medo.dev/images/62229a9a-1d59-40f3-af56-7adef2db3e05.jpg"),
    ("Fabricação Mecânica", "https://miaoda-site-img.s3cdn.medo.dev/images/f76890c3-3fe7-4b98-8089-724ea0bb4c35.jpg"),
    ("Energias Renováveis", "https://miaoda-site-img.s3cdn.medo.dev/images/70c350de-1b5f-4d01-8102-a02da3165051.jpg"),
    ("Segurança do Trabalho", "https://miaoda-site-img.s3cdn.medo.dev/images/07d01765-1815-4a8a-aec6-52107703427a.jpg"),
    ("Propedêutica", "https://miaoda-site-img.s3cdn.medo.dev/images/5a30e128-cf3c-499f-bdd2-112e6063a5af.jpg"),
    ("Eletrônica", "https://miaoda-site-img.s3cdn.medo.dev/images/191955fd-997c-4895-9274-b43c3f6ba540.jpg"),
];

/// Catalog entry mirrored from the `courses` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Free text, e.g. "1200 horas"
    pub workload: Option<String>,
    /// Comma-delimited list of subjects
    pub curriculum: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Curriculum split into display items
    pub fn curriculum_items(&self) -> Vec<String> {
        self.curriculum
            .as_deref()
            .map(parse_curriculum)
            .unwrap_or_default()
    }

    /// Image for the course card
    pub fn card_image(&self) -> &str {
        if let Some(url) = self.image_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url;
        }
        COURSE_IMAGES
            .iter()
            .find(|(name, _)| *name == self.name)
            .map(|(_, url)| *url)
            .unwrap_or(DEFAULT_COURSE_IMAGE)
    }
}

/// Split a comma-delimited curriculum into trimmed, non-empty items.
pub fn parse_curriculum(curriculum: &str) -> Vec<String> {
    curriculum
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
