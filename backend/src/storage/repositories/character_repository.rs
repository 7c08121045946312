use anyhow::Result;
use shared::{Character, CharacterFilter};
use sqlx::Row;

use crate::storage::connection::DbConnection;

const CHARACTER_COLUMNS: &str = "id, owner, name, exp, level, items, event_points, created_at";

/// Repository for character operations
#[derive(Clone)]
pub struct CharacterRepository {
    db: DbConnection,
}

impl CharacterRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a character in the database
    pub async fn store_character(&self, character: &Character) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO characters (id, owner, name, exp, level, items, event_points, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&character.id)
        .bind(&character.owner)
        .bind(&character.name)
        .bind(character.exp)
        .bind(character.level)
        .bind(&character.items)
        .bind(character.event_points)
        .bind(&character.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Get a character by ID
    pub async fn get_character(&self, character_id: &str) -> Result<Option<Character>> {
        let query_str = format!("SELECT {} FROM characters WHERE id = ?", CHARACTER_COLUMNS);
        let row = sqlx::query(&query_str)
            .bind(character_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| Self::row_to_character(&r)))
    }

    /// List characters matching the filter, newest first.
    /// The name filter is a case-insensitive substring match; SQLite's
    /// `LOWER` only folds ASCII, so names are compared after a Unicode
    /// lowercase in Rust.
    pub async fn list_characters(&self, filter: &CharacterFilter) -> Result<Vec<Character>> {
        let mut conditions = Vec::new();
        if filter.owner.is_some() {
            conditions.push("owner = ?");
        }
        if filter.level.is_some() {
            conditions.push("level = ?");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let query_str = format!(
            "SELECT {} FROM characters {} ORDER BY created_at DESC, ROWID DESC",
            CHARACTER_COLUMNS, where_clause
        );

        let mut query = sqlx::query(&query_str);
        if let Some(owner) = &filter.owner {
            query = query.bind(owner);
        }
        if let Some(level) = filter.level {
            query = query.bind(level);
        }

        let rows = query.fetch_all(self.db.pool()).await?;
        let characters = rows.iter().map(Self::row_to_character);

        Ok(match &filter.name {
            Some(name) => {
                let needle = name.to_lowercase();
                characters
                    .filter(|c| c.name.to_lowercase().contains(&needle))
                    .collect()
            }
            None => characters.collect(),
        })
    }

    /// List the characters a member owns, ordered by name
    pub async fn list_by_owner(&self, owner: &str) -> Result<Vec<Character>> {
        let query_str = format!(
            "SELECT {} FROM characters WHERE owner = ? ORDER BY name ASC",
            CHARACTER_COLUMNS
        );
        let rows = sqlx::query(&query_str)
            .bind(owner)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows.iter().map(Self::row_to_character).collect())
    }

    /// Update owner, name, exp, level and items.
    /// Returns false when no character has this ID.
    pub async fn update_character(&self, character: &Character) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE characters
            SET owner = ?, name = ?, exp = ?, level = ?, items = ?
            WHERE id = ?
            "#,
        )
        .bind(&character.owner)
        .bind(&character.name)
        .bind(character.exp)
        .bind(character.level)
        .bind(&character.items)
        .bind(&character.id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a character; its payment rows cascade
    pub async fn delete_character(&self, character_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM characters WHERE id = ?")
            .bind(character_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add one event point, returning the new total
    pub async fn increment_event_points(&self, character_id: &str) -> Result<Option<i64>> {
        let points: Option<i64> = sqlx::query_scalar(
            "UPDATE characters SET event_points = event_points + 1 WHERE id = ? RETURNING event_points",
        )
        .bind(character_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(points)
    }

    /// Remove one event point without going below zero, returning the new total
    pub async fn decrement_event_points(&self, character_id: &str) -> Result<Option<i64>> {
        let points: Option<i64> = sqlx::query_scalar(
            "UPDATE characters SET event_points = MAX(0, event_points - 1) WHERE id = ? RETURNING event_points",
        )
        .bind(character_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(points)
    }

    fn row_to_character(row: &sqlx::sqlite::SqliteRow) -> Character {
        Character {
            id: row.get("id"),
            owner: row.get("owner"),
            name: row.get("name"),
            exp: row.get("exp"),
            level: row.get("level"),
            items: row.get("items"),
            event_points: row.get("event_points"),
            created_at: row.get("created_at"),
        }
    }
}
