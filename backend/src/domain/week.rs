//! Calendar week arithmetic for the weekly goals tracker.
//!
//! Everything downstream (goal eligibility, completion grouping, the
//! pending-goals listing) works against one `WeekWindow` per invocation so
//! that a call landing exactly on a week boundary cannot see two different
//! weeks in the same computation.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// Inclusive start and end instants of one calendar week, Sunday through
/// Saturday in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WeekWindow {
    /// The week containing `reference`.
    ///
    /// `start` is Sunday 00:00:00.000 and `end` is the last millisecond of
    /// the following Saturday, so both bounds are inclusive.
    pub fn containing(reference: DateTime<Utc>) -> Self {
        let days_from_sunday = reference.weekday().num_days_from_sunday() as i64;
        let week_start_date = reference.date_naive() - Duration::days(days_from_sunday);

        let start = Utc.from_utc_datetime(
            &week_start_date
                .and_hms_opt(0, 0, 0)
                .expect("midnight is always a valid time"),
        );
        let end = start + Duration::days(7) - Duration::milliseconds(1);

        Self { start, end }
    }

    /// Whether `instant` falls inside the window, bounds included.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}
