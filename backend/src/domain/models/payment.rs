use chrono::{DateTime, Utc};

/// One "payment marked" event for a character.
/// Records are never edited; decrement deletes the newest one in the week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub id: String,
    pub character_id: String,
    pub created_at: DateTime<Utc>,
}
