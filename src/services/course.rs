//! Course service

use std::sync::Arc;

use super::ServiceError;
use crate::db::repositories::CourseRepository;
use crate::models::Course;

pub struct CourseService {
    repo: Arc<dyn CourseRepository>,
}

impl CourseService {
    pub fn new(repo: Arc<dyn CourseRepository>) -> Self {
        Self { repo }
    }

    /// All courses, name ascending
    pub async fn get_all_courses(&self) -> Result<Vec<Course>, ServiceError> {
        Ok(self.repo.list().await?)
    }

    pub async fn get_course(&self, id: &str) -> Result<Option<Course>, ServiceError> {
        Ok(self.repo.get_by_id(id).await?)
    }
}
