//! # Storage Traits
//!
//! Abstraction over the payment log so the ledger can run against any store
//! that offers range-filtered counts and selects, single-row inserts and
//! deletes, and optionally a pair of server-side atomic procedures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::models::payment::PaymentRecord;
use crate::domain::week::AccountingWeek;

/// Errors raised by a payment store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store does not offer the named server-side procedure.
    /// This is the only signal that may trigger the client-side fallback.
    #[error("Store procedure not found: {0}")]
    ProcedureNotFound(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of the store's atomic cap-check-and-insert procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomicIncrement {
    Inserted,
    LimitReached,
}

/// Trait defining the interface for payment log storage operations
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Count records for a character with `created_at` in `[week.start, week.end)`
    async fn count_in_week(&self, character_id: &str, week: &AccountingWeek) -> Result<u32, StoreError>;

    /// Count records in the week for several characters at once.
    /// Characters without records are omitted from the result.
    async fn counts_in_week(
        &self,
        character_ids: &[String],
        week: &AccountingWeek,
    ) -> Result<Vec<(String, u32)>, StoreError>;

    /// Insert one record stamped with `created_at`
    async fn insert_payment(
        &self,
        character_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<PaymentRecord, StoreError>;

    /// Most recent record in the week, by `created_at` then insertion order
    async fn latest_in_week(
        &self,
        character_id: &str,
        week: &AccountingWeek,
    ) -> Result<Option<PaymentRecord>, StoreError>;

    /// Delete one record by ID, returning whether it existed
    async fn delete_payment(&self, payment_id: &str) -> Result<bool, StoreError>;

    /// Atomic cap-check-and-insert.
    /// Returns `StoreError::ProcedureNotFound` when the store lacks the procedure.
    async fn increment_atomic(
        &self,
        character_id: &str,
        week: &AccountingWeek,
        created_at: DateTime<Utc>,
        cap: u32,
    ) -> Result<AtomicIncrement, StoreError>;

    /// Atomic find-latest-and-delete, returning whether a record was removed.
    /// Returns `StoreError::ProcedureNotFound` when the store lacks the procedure.
    async fn decrement_atomic(&self, character_id: &str, week: &AccountingWeek) -> Result<bool, StoreError>;
}
