//! Weekly payment ledger.
//!
//! Counts, marks and undoes "payments" per character inside the current
//! accounting week, capped at [`WEEKLY_PAYMENT_CAP`]. Mutations prefer the
//! store's atomic procedures and only fall back to a client-side
//! read-then-write sequence when the store reports the procedure missing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::FixedOffset;
use shared::{PaymentStatus, WEEKLY_PAYMENT_CAP};
use tracing::{info, warn};

use crate::domain::clock::{format_timestamp, Clock};
use crate::domain::errors::{PortalError, PortalResult};
use crate::domain::week::AccountingWeek;
use crate::storage::{AtomicIncrement, PaymentStore, StoreError};

#[derive(Clone)]
pub struct PaymentLedger {
    store: Arc<dyn PaymentStore>,
    clock: Arc<dyn Clock>,
    week_offset: FixedOffset,
}

impl PaymentLedger {
    pub fn new(store: Arc<dyn PaymentStore>, clock: Arc<dyn Clock>, week_offset: FixedOffset) -> Self {
        Self {
            store,
            clock,
            week_offset,
        }
    }

    /// The accounting week containing the clock's current instant
    pub fn current_week(&self) -> AccountingWeek {
        AccountingWeek::containing(self.clock.now(), self.week_offset)
    }

    /// Payments marked for a character in the current week (not clamped)
    pub async fn count(&self, character_id: &str) -> PortalResult<u32> {
        let week = self.current_week();
        Ok(self.store.count_in_week(character_id, &week).await?)
    }

    /// Weekly counts for several characters; characters without payments map to 0
    pub async fn weekly_counts(&self, character_ids: &[String]) -> PortalResult<HashMap<String, u32>> {
        let week = self.current_week();
        let mut counts: HashMap<String, u32> = character_ids.iter().map(|id| (id.clone(), 0)).collect();
        for (character_id, count) in self.store.counts_in_week(character_ids, &week).await? {
            counts.insert(character_id, count);
        }
        Ok(counts)
    }

    /// Count plus cap and reset instant, for display
    pub async fn status(&self, character_id: &str) -> PortalResult<PaymentStatus> {
        let week = self.current_week();
        let count = self.store.count_in_week(character_id, &week).await?;
        Ok(PaymentStatus {
            character_id: character_id.to_string(),
            count,
            cap: WEEKLY_PAYMENT_CAP,
            limit_reached: count >= WEEKLY_PAYMENT_CAP,
            week_start: format_timestamp(week.start),
            resets_at: format_timestamp(week.end),
        })
    }

    /// Mark one payment, failing with `LimitExceeded` once the week holds the cap
    pub async fn increment(&self, character_id: &str) -> PortalResult<()> {
        let now = self.clock.now();
        let week = AccountingWeek::containing(now, self.week_offset);

        match self
            .store
            .increment_atomic(character_id, &week, now, WEEKLY_PAYMENT_CAP)
            .await
        {
            Ok(AtomicIncrement::Inserted) => {
                info!("Marked payment for character {}", character_id);
                Ok(())
            }
            Ok(AtomicIncrement::LimitReached) => Err(PortalError::LimitExceeded {
                cap: WEEKLY_PAYMENT_CAP,
            }),
            Err(StoreError::ProcedureNotFound(procedure)) => {
                warn!("Store procedure {} unavailable, using fallback increment", procedure);
                self.increment_fallback(character_id, &week, now).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Undo the newest payment of the current week.
    /// Returns whether a record was removed; an empty week is a no-op.
    pub async fn decrement(&self, character_id: &str) -> PortalResult<bool> {
        let week = self.current_week();

        match self.store.decrement_atomic(character_id, &week).await {
            Ok(removed) => {
                if removed {
                    info!("Removed latest payment for character {}", character_id);
                }
                Ok(removed)
            }
            Err(StoreError::ProcedureNotFound(procedure)) => {
                warn!("Store procedure {} unavailable, using fallback decrement", procedure);
                self.decrement_fallback(character_id, &week).await
            }
            Err(e) => Err(e.into()),
        }
    }

    // Soft cap: two concurrent calls can both read a count below the cap and
    // both insert, leaving the week above it. Only the atomic procedure closes
    // that gap.
    async fn increment_fallback(
        &self,
        character_id: &str,
        week: &AccountingWeek,
        now: chrono::DateTime<chrono::Utc>,
    ) -> PortalResult<()> {
        let count = self.store.count_in_week(character_id, week).await?;
        if count >= WEEKLY_PAYMENT_CAP {
            return Err(PortalError::LimitExceeded {
                cap: WEEKLY_PAYMENT_CAP,
            });
        }

        let record = self.store.insert_payment(character_id, now).await?;
        info!("Marked payment {} for character {} (fallback)", record.id, character_id);
        Ok(())
    }

    async fn decrement_fallback(&self, character_id: &str, week: &AccountingWeek) -> PortalResult<bool> {
        match self.store.latest_in_week(character_id, week).await? {
            Some(record) if week.contains(record.created_at) => {
                let removed = self.store.delete_payment(&record.id).await?;
                info!("Removed payment {} for character {} (fallback)", record.id, character_id);
                Ok(removed)
            }
            Some(record) => {
                warn!("Store returned payment {} outside the current week", record.id);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}
