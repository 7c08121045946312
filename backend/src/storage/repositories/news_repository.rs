use anyhow::Result;
use shared::NewsPost;
use sqlx::Row;

use crate::storage::connection::DbConnection;

/// Repository for news posts
#[derive(Clone)]
pub struct NewsRepository {
    db: DbConnection,
}

impl NewsRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_post(&self, post: &NewsPost) -> Result<()> {
        sqlx::query("INSERT INTO news (id, title, content, created_at) VALUES (?, ?, ?, ?)")
            .bind(&post.id)
            .bind(&post.title)
            .bind(&post.content)
            .bind(&post.created_at)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Newest posts first, optionally limited
    pub async fn list_posts(&self, limit: Option<u32>) -> Result<Vec<NewsPost>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(i64::from).unwrap_or(-1);
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, created_at
            FROM news
            ORDER BY created_at DESC, ROWID DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| NewsPost {
                id: row.get("id"),
                title: row.get("title"),
                content: row.get("content"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news WHERE id = ?")
            .bind(post_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
