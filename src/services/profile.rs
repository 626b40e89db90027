//! Profile service
//!
//! Profile lookup, partial update and the teacher/student directories.

use std::sync::Arc;

use super::ServiceError;
use crate::db::repositories::ProfileRepository;
use crate::models::{Profile, ProfileUpdate, UserRole};

pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_profile(&self, id: &str) -> Result<Option<Profile>, ServiceError> {
        Ok(self.repo.get_by_id(id).await?)
    }

    /// Apply `updates` and return the stored profile
    pub async fn update_profile(
        &self,
        id: &str,
        updates: &ProfileUpdate,
    ) -> Result<Profile, ServiceError> {
        self.repo
            .update(id, updates)
            .await?
            .ok_or_else(|| ServiceError::Missing("Falha ao atualizar perfil".to_string()))
    }

    /// Teachers ordered by full name
    pub async fn get_all_teachers(&self) -> Result<Vec<Profile>, ServiceError> {
        Ok(self.repo.list_by_role(UserRole::Teacher).await?)
    }

    /// Students ordered by full name
    pub async fn get_all_students(&self) -> Result<Vec<Profile>, ServiceError> {
        Ok(self.repo.list_by_role(UserRole::Student).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{seed_member, test_pool};
    use crate::db::repositories::SqlxProfileRepository;

    #[tokio::test]
    async fn test_update_missing_profile_errors() {
        let pool = test_pool().await;
        let service = ProfileService::new(SqlxProfileRepository::boxed(pool));

        let err = service
            .update_profile("ghost", &ProfileUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Falha ao atualizar perfil");
    }

    #[tokio::test]
    async fn test_update_profile_returns_row() {
        let pool = test_pool().await;
        seed_member(&pool, "u1", Some("Rita"), "student").await;
        let service = ProfileService::new(SqlxProfileRepository::boxed(pool));

        let updated = service
            .update_profile(
                "u1",
                &ProfileUpdate {
                    full_name: Some("Rita Alves".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.display_name(), "Rita Alves");
    }

    #[tokio::test]
    async fn test_directories_split_by_role() {
        let pool = test_pool().await;
        seed_member(&pool, "t1", Some("Marcos"), "teacher").await;
        seed_member(&pool, "s1", Some("Bianca"), "student").await;
        seed_member(&pool, "s2", None, "student").await;
        seed_member(&pool, "a1", Some("Diretora"), "admin").await;
        let service = ProfileService::new(SqlxProfileRepository::boxed(pool));

        let teachers = service.get_all_teachers().await.unwrap();
        assert_eq!(teachers.len(), 1);

        let students = service.get_all_students().await.unwrap();
        let names: Vec<_> = students.iter().map(|p| p.display_name()).collect();
        assert_eq!(names, vec!["Bianca", "Nome não informado"]);
    }

    #[tokio::test]
    async fn test_get_profile() {
        let pool = test_pool().await;
        seed_member(&pool, "t1", Some("Marcos"), "teacher").await;
        let service = ProfileService::new(SqlxProfileRepository::boxed(pool));

        assert!(service.get_profile("t1").await.unwrap().is_some());
        assert!(service.get_profile("nope").await.unwrap().is_none());
    }
}
