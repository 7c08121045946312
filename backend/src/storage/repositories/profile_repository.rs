use anyhow::Result;
use shared::{Profile, ProfileOption};
use sqlx::Row;

use crate::storage::connection::DbConnection;

/// Repository for member profiles
#[derive(Clone)]
pub struct ProfileRepository {
    db: DbConnection,
}

impl ProfileRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a new profile
    pub async fn store_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, name, email, discord_id, character_limit, is_admin, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.discord_id)
        .bind(profile.character_limit)
        .bind(profile.is_admin)
        .bind(&profile.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Get a profile by ID
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, discord_id, character_limit, is_admin, created_at
            FROM profiles
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| Self::row_to_profile(&r)))
    }

    /// Only the admin flag, for the authorization gate
    pub async fn is_admin(&self, user_id: &str) -> Result<Option<bool>> {
        let flag: Option<bool> = sqlx::query_scalar("SELECT is_admin FROM profiles WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(flag)
    }

    /// List all profiles, newest first
    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, discord_id, character_limit, is_admin, created_at
            FROM profiles
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_profile).collect())
    }

    /// ID and name of every profile, ordered by name
    pub async fn list_profile_options(&self) -> Result<Vec<ProfileOption>> {
        let rows = sqlx::query("SELECT id, name FROM profiles ORDER BY name ASC")
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows
            .iter()
            .map(|row| ProfileOption {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    /// Update the mutable attributes of a profile.
    /// Returns false when no profile has this ID.
    pub async fn update_profile(&self, profile: &Profile) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET name = ?, email = ?, discord_id = ?, character_limit = ?, is_admin = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.discord_id)
        .bind(profile.character_limit)
        .bind(profile.is_admin)
        .bind(&profile.id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a profile; sessions, characters and payment rows cascade
    pub async fn delete_profile(&self, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether another profile already uses this email
    pub async fn email_in_use(&self, email: &str, except_id: Option<&str>) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM profiles WHERE email = ? AND id != COALESCE(?, '')",
        )
        .bind(email)
        .bind(except_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(count > 0)
    }

    fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Profile {
        Profile {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            discord_id: row.get("discord_id"),
            character_limit: row.get("character_limit"),
            is_admin: row.get("is_admin"),
            created_at: row.get("created_at"),
        }
    }
}
