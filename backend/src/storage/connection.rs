use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

/// DbConnection manages the shared SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // Profiles are keyed by the identity service's user ID
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                name TEXT,
                email TEXT UNIQUE,
                discord_id TEXT,
                character_limit INTEGER NOT NULL DEFAULT 4 CHECK (character_limit >= 0),
                is_admin BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_profiles_created_at
            ON profiles(created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        // Sessions are written by the identity service and only read here
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES profiles (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS characters (
                id TEXT PRIMARY KEY,
                owner TEXT NOT NULL,
                name TEXT NOT NULL,
                exp INTEGER NOT NULL DEFAULT 0 CHECK (exp >= 0 AND exp <= 74),
                level INTEGER NOT NULL DEFAULT 1 CHECK (level >= 1),
                items TEXT NOT NULL DEFAULT '',
                event_points INTEGER NOT NULL DEFAULT 0 CHECK (event_points >= 0),
                created_at TEXT NOT NULL,
                FOREIGN KEY (owner) REFERENCES profiles (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_characters_owner
            ON characters(owner);
            "#,
        )
        .execute(pool)
        .await?;

        // One row per marked payment; rows outside the current week are kept for audit
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS payment_log (
                id TEXT PRIMARY KEY,
                character_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (character_id) REFERENCES characters (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Weekly window queries filter on character then scan a created_at range
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_payment_log_character_created
            ON payment_log(character_id, created_at);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS news (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_news_created_at
            ON news(created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
