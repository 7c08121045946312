//! Accounting week resolution.
//!
//! Weekly payment tallies reset every Saturday at 00:00 civil time. The
//! calendar week itself starts on Monday, so the resolver first finds the
//! Monday of the week containing `now`, moves to that week's Saturday, and
//! steps back a week when `now` has not reached that Saturday yet.
//!
//! Truncation and comparison both happen in one civil reference: a fixed
//! UTC offset. The resulting boundaries are returned as UTC instants.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, Utc};

/// Days from the calendar Monday to the Saturday reset
const SATURDAY_FROM_MONDAY: i64 = 5;

/// Half-open interval `[start, end)` used to count payments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountingWeek {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AccountingWeek {
    /// Resolve the accounting week containing `now`, with civil time taken at `offset`
    pub fn containing(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = now.with_timezone(&offset).naive_local();
        let midnight = local.date().and_time(chrono::NaiveTime::MIN);

        // weekday 0 = Sunday .. 6 = Saturday
        let weekday = local.weekday().num_days_from_sunday() as i64;
        let days_since_monday = (weekday + 6) % 7;
        let monday = midnight - Duration::days(days_since_monday);

        let mut saturday = monday + Duration::days(SATURDAY_FROM_MONDAY);
        if local < saturday {
            saturday -= Duration::days(7);
        }

        let start = to_utc(saturday, offset);
        Self {
            start,
            end: start + Duration::days(7),
        }
    }

    /// Whether `instant` falls inside this week
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    let utc = local - Duration::seconds(offset.local_minus_utc() as i64);
    DateTime::from_naive_utc_and_offset(utc, Utc)
}
