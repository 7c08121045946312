use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::domain::clock::{format_timestamp, parse_timestamp};
use crate::domain::models::payment::PaymentRecord;
use crate::domain::week::AccountingWeek;
use crate::storage::connection::DbConnection;
use crate::storage::traits::{AtomicIncrement, PaymentStore, StoreError};

const INCREMENT_PROCEDURE: &str = "increment_payment";
const DECREMENT_PROCEDURE: &str = "decrement_payment";

/// Payment log repository backed by SQLite
#[derive(Clone)]
pub struct PaymentRepository {
    db: DbConnection,
    /// When false the atomic procedures report `ProcedureNotFound`
    atomic_procedures: bool,
}

impl PaymentRepository {
    pub fn new(db: DbConnection, atomic_procedures: bool) -> Self {
        Self {
            db,
            atomic_procedures,
        }
    }

    /// Total rows for a character, regardless of week
    #[cfg(test)]
    pub async fn count_all(&self, character_id: &str) -> Result<u32, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payment_log WHERE character_id = ?")
            .bind(character_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count as u32)
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<PaymentRecord, StoreError> {
        let raw: String = row.try_get("created_at")?;
        let created_at = parse_timestamp(&raw)
            .map_err(|e| StoreError::Database(sqlx::Error::Decode(e.into())))?;
        Ok(PaymentRecord {
            id: row.try_get("id")?,
            character_id: row.try_get("character_id")?,
            created_at,
        })
    }
}

#[async_trait]
impl PaymentStore for PaymentRepository {
    async fn count_in_week(&self, character_id: &str, week: &AccountingWeek) -> Result<u32, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM payment_log
            WHERE character_id = ? AND created_at >= ? AND created_at < ?
            "#,
        )
        .bind(character_id)
        .bind(format_timestamp(week.start))
        .bind(format_timestamp(week.end))
        .fetch_one(self.db.pool())
        .await?;

        Ok(count as u32)
    }

    async fn counts_in_week(
        &self,
        character_ids: &[String],
        week: &AccountingWeek,
    ) -> Result<Vec<(String, u32)>, StoreError> {
        if character_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = character_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let query_str = format!(
            r#"
            SELECT character_id, COUNT(*) AS payments
            FROM payment_log
            WHERE created_at >= ? AND created_at < ? AND character_id IN ({})
            GROUP BY character_id
            "#,
            placeholders
        );

        let mut query = sqlx::query(&query_str)
            .bind(format_timestamp(week.start))
            .bind(format_timestamp(week.end));
        for id in character_ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(self.db.pool()).await?;
        rows.iter()
            .map(|row| -> Result<(String, u32), StoreError> {
                let payments: i64 = row.try_get("payments")?;
                Ok((row.try_get("character_id")?, payments as u32))
            })
            .collect()
    }

    async fn insert_payment(
        &self,
        character_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<PaymentRecord, StoreError> {
        let record = PaymentRecord {
            id: Uuid::new_v4().to_string(),
            character_id: character_id.to_string(),
            created_at,
        };

        sqlx::query("INSERT INTO payment_log (id, character_id, created_at) VALUES (?, ?, ?)")
            .bind(&record.id)
            .bind(&record.character_id)
            .bind(format_timestamp(record.created_at))
            .execute(self.db.pool())
            .await?;

        Ok(record)
    }

    async fn latest_in_week(
        &self,
        character_id: &str,
        week: &AccountingWeek,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, character_id, created_at
            FROM payment_log
            WHERE character_id = ? AND created_at >= ? AND created_at < ?
            ORDER BY created_at DESC, ROWID DESC
            LIMIT 1
            "#,
        )
        .bind(character_id)
        .bind(format_timestamp(week.start))
        .bind(format_timestamp(week.end))
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn delete_payment(&self, payment_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM payment_log WHERE id = ?")
            .bind(payment_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_atomic(
        &self,
        character_id: &str,
        week: &AccountingWeek,
        created_at: DateTime<Utc>,
        cap: u32,
    ) -> Result<AtomicIncrement, StoreError> {
        if !self.atomic_procedures {
            return Err(StoreError::ProcedureNotFound(INCREMENT_PROCEDURE));
        }

        // A single statement: SQLite serializes writers, so the count and the
        // insert cannot interleave with another increment.
        let result = sqlx::query(
            r#"
            INSERT INTO payment_log (id, character_id, created_at)
            SELECT ?, ?, ?
            WHERE (
                SELECT COUNT(*)
                FROM payment_log
                WHERE character_id = ? AND created_at >= ? AND created_at < ?
            ) < ?
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(character_id)
        .bind(format_timestamp(created_at))
        .bind(character_id)
        .bind(format_timestamp(week.start))
        .bind(format_timestamp(week.end))
        .bind(cap as i64)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 1 {
            Ok(AtomicIncrement::Inserted)
        } else {
            Ok(AtomicIncrement::LimitReached)
        }
    }

    async fn decrement_atomic(&self, character_id: &str, week: &AccountingWeek) -> Result<bool, StoreError> {
        if !self.atomic_procedures {
            return Err(StoreError::ProcedureNotFound(DECREMENT_PROCEDURE));
        }

        let result = sqlx::query(
            r#"
            DELETE FROM payment_log
            WHERE id = (
                SELECT id
                FROM payment_log
                WHERE character_id = ? AND created_at >= ? AND created_at < ?
                ORDER BY created_at DESC, ROWID DESC
                LIMIT 1
            )
            "#,
        )
        .bind(character_id)
        .bind(format_timestamp(week.start))
        .bind(format_timestamp(week.end))
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::{seed_character, seed_profile};
    use chrono::{Duration, FixedOffset, TimeZone};

    async fn setup_test(atomic: bool) -> (PaymentRepository, String) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let owner = seed_profile(&db, "Owner", false).await;
        let character_id = seed_character(&db, &owner, "Kael").await;
        (PaymentRepository::new(db, atomic), character_id)
    }

    fn week() -> AccountingWeek {
        let now = Utc.with_ymd_and_hms(2025, 1, 6, 12, 0, 0).unwrap();
        AccountingWeek::containing(now, FixedOffset::east_opt(0).unwrap())
    }

    #[tokio::test]
    async fn test_count_respects_half_open_window() {
        let (repo, character_id) = setup_test(true).await;
        let week = week();

        repo.insert_payment(&character_id, week.start).await.unwrap();
        repo.insert_payment(&character_id, week.end - Duration::milliseconds(1)).await.unwrap();
        repo.insert_payment(&character_id, week.end).await.unwrap();
        repo.insert_payment(&character_id, week.start - Duration::milliseconds(1)).await.unwrap();

        assert_eq!(repo.count_in_week(&character_id, &week).await.unwrap(), 2);
        assert_eq!(repo.count_all(&character_id).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_latest_in_week_prefers_newest_then_insertion_order() {
        let (repo, character_id) = setup_test(true).await;
        let week = week();
        let at = week.start + Duration::hours(5);

        repo.insert_payment(&character_id, week.start + Duration::hours(1)).await.unwrap();
        let first_tied = repo.insert_payment(&character_id, at).await.unwrap();
        let second_tied = repo.insert_payment(&character_id, at).await.unwrap();
        // Outside the window, newer than everything else
        repo.insert_payment(&character_id, week.end + Duration::hours(1)).await.unwrap();

        let latest = repo.latest_in_week(&character_id, &week).await.unwrap().unwrap();
        assert_eq!(latest.id, second_tied.id);
        assert_ne!(latest.id, first_tied.id);
        assert_eq!(latest.created_at, at);
    }

    #[tokio::test]
    async fn test_atomic_increment_stops_at_cap() {
        let (repo, character_id) = setup_test(true).await;
        let week = week();
        let now = week.start + Duration::days(1);

        for _ in 0..3 {
            let outcome = repo.increment_atomic(&character_id, &week, now, 3).await.unwrap();
            assert_eq!(outcome, AtomicIncrement::Inserted);
        }
        let outcome = repo.increment_atomic(&character_id, &week, now, 3).await.unwrap();
        assert_eq!(outcome, AtomicIncrement::LimitReached);
        assert_eq!(repo.count_in_week(&character_id, &week).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_atomic_decrement_removes_newest_only() {
        let (repo, character_id) = setup_test(true).await;
        let week = week();

        let older = repo.insert_payment(&character_id, week.start + Duration::hours(1)).await.unwrap();
        repo.insert_payment(&character_id, week.start + Duration::hours(2)).await.unwrap();

        assert!(repo.decrement_atomic(&character_id, &week).await.unwrap());
        let remaining = repo.latest_in_week(&character_id, &week).await.unwrap().unwrap();
        assert_eq!(remaining.id, older.id);

        assert!(repo.decrement_atomic(&character_id, &week).await.unwrap());
        assert!(!repo.decrement_atomic(&character_id, &week).await.unwrap());
    }

    #[tokio::test]
    async fn test_disabled_procedures_report_not_found() {
        let (repo, character_id) = setup_test(false).await;
        let week = week();

        let err = repo
            .increment_atomic(&character_id, &week, week.start, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ProcedureNotFound(INCREMENT_PROCEDURE)));

        let err = repo.decrement_atomic(&character_id, &week).await.unwrap_err();
        assert!(matches!(err, StoreError::ProcedureNotFound(DECREMENT_PROCEDURE)));
    }

    #[tokio::test]
    async fn test_counts_in_week_groups_by_character() {
        let (repo, first) = setup_test(true).await;
        let owner = seed_profile(&repo.db, "Other", false).await;
        let second = seed_character(&repo.db, &owner, "Mira").await;
        let week = week();

        repo.insert_payment(&first, week.start).await.unwrap();
        repo.insert_payment(&first, week.start + Duration::hours(1)).await.unwrap();
        repo.insert_payment(&second, week.start - Duration::days(1)).await.unwrap();

        let counts = repo
            .counts_in_week(&[first.clone(), second.clone()], &week)
            .await
            .unwrap();
        assert_eq!(counts, vec![(first, 2)]);

        assert!(repo.counts_in_week(&[], &week).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_payment() {
        let (repo, character_id) = setup_test(true).await;
        let record = repo.insert_payment(&character_id, week().start).await.unwrap();

        assert!(repo.delete_payment(&record.id).await.unwrap());
        assert!(!repo.delete_payment(&record.id).await.unwrap());
    }
}
