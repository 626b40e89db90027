//! Profile repository
//!
//! Database operations for the `profiles` table.

use crate::db::DynDatabasePool;
use crate::models::{NewProfile, Profile, ProfileUpdate, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Profile repository trait
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Get a profile by its (auth user) id
    async fn get_by_id(&self, id: &str) -> Result<Option<Profile>>;

    /// Insert the profile created at sign-up
    async fn create(&self, profile: &NewProfile) -> Result<Profile>;

    /// Apply a partial update. `None` when no row matched.
    async fn update(&self, id: &str, update: &ProfileUpdate) -> Result<Option<Profile>>;

    /// All profiles with the given role, ordered by full name
    async fn list_by_role(&self, role: UserRole) -> Result<Vec<Profile>>;
}

/// SQLx-based profile repository
pub struct SqlxProfileRepository {
    pool: DynDatabasePool,
}

impl SqlxProfileRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ProfileRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ProfileRepository for SqlxProfileRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Profile>> {
        get_profile_by_id_sqlite(self.pool.sqlite(), id).await
    }

    async fn create(&self, profile: &NewProfile) -> Result<Profile> {
        create_profile_sqlite(self.pool.sqlite(), profile).await
    }

    async fn update(&self, id: &str, update: &ProfileUpdate) -> Result<Option<Profile>> {
        update_profile_sqlite(self.pool.sqlite(), id, update).await
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<Profile>> {
        list_profiles_by_role_sqlite(self.pool.sqlite(), role).await
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn get_profile_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Profile>> {
    let row = sqlx::query(
        r#"
        SELECT id, email, full_name, role, phone, created_at
        FROM profiles
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get profile by ID")?;

    row.map(|row| row_to_profile(&row)).transpose()
}

async fn create_profile_sqlite(pool: &SqlitePool, profile: &NewProfile) -> Result<Profile> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO profiles (id, email, full_name, role, phone, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&profile.id)
    .bind(&profile.email)
    .bind(&profile.full_name)
    .bind(&profile.role)
    .bind(&profile.phone)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create profile")?;

    get_profile_by_id_sqlite(pool, &profile.id)
        .await?
        .context("Profile not found after insert")
}

async fn update_profile_sqlite(
    pool: &SqlitePool,
    id: &str,
    update: &ProfileUpdate,
) -> Result<Option<Profile>> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET full_name = COALESCE(?, full_name),
            email = COALESCE(?, email),
            phone = COALESCE(?, phone)
        WHERE id = ?
        "#,
    )
    .bind(&update.full_name)
    .bind(&update.email)
    .bind(&update.phone)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update profile")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_profile_by_id_sqlite(pool, id).await
}

async fn list_profiles_by_role_sqlite(pool: &SqlitePool, role: UserRole) -> Result<Vec<Profile>> {
    let rows = sqlx::query(
        r#"
        SELECT id, email, full_name, role, phone, created_at
        FROM profiles
        WHERE role = ?
        ORDER BY full_name IS NULL, full_name COLLATE NOCASE ASC
        "#,
    )
    .bind(role.as_str())
    .fetch_all(pool)
    .await
    .context("Failed to list profiles by role")?;

    rows.iter().map(row_to_profile).collect()
}

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<Profile> {
    let role: String = row.get("role");

    Ok(Profile {
        id: row.get("id"),
        email: row.get("email"),
        full_name: row.get("full_name"),
        role: role.parse()?,
        phone: row.get("phone"),
        created_at: row.get("created_at"),
    })
}
