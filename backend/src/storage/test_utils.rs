//! Seeding helpers shared by storage, domain and REST tests.
//!
//! Sessions are normally written by the external identity service, so tests
//! insert them directly.

use chrono::Utc;
use uuid::Uuid;

use super::connection::DbConnection;
use crate::domain::clock::format_timestamp;

/// Insert a profile and return its ID
pub async fn seed_profile(db: &DbConnection, name: &str, is_admin: bool) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO profiles (id, name, email, discord_id, character_limit, is_admin, created_at)
        VALUES (?, ?, ?, NULL, 4, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(format!("{}@example.com", id))
    .bind(is_admin)
    .bind(format_timestamp(Utc::now()))
    .execute(db.pool())
    .await
    .expect("Failed to seed profile");
    id
}

/// Insert a character owned by `owner` and return its ID
pub async fn seed_character(db: &DbConnection, owner: &str, name: &str) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO characters (id, owner, name, exp, level, items, event_points, created_at)
        VALUES (?, ?, ?, 0, 1, '', 0, ?)
        "#,
    )
    .bind(&id)
    .bind(owner)
    .bind(name)
    .bind(format_timestamp(Utc::now()))
    .execute(db.pool())
    .await
    .expect("Failed to seed character");
    id
}

/// Open a session for `user_id` and return its token
pub async fn seed_session(db: &DbConnection, user_id: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(format_timestamp(Utc::now()))
        .execute(db.pool())
        .await
        .expect("Failed to seed session");
    token
}
