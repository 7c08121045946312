use anyhow::Result;

use crate::storage::connection::DbConnection;

/// Read side of the identity service's session table
#[derive(Clone)]
pub struct SessionRepository {
    db: DbConnection,
}

impl SessionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Resolve a session token to the user it belongs to
    pub async fn find_user_id(&self, token: &str) -> Result<Option<String>> {
        let user_id: Option<String> = sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user_id)
    }

    /// Revoke a session (sign-out)
    pub async fn delete_session(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
