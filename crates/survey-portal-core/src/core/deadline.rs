// crates/survey-portal-core/src/core/deadline.rs
// ============================================================================
// Module: Survey Deadline Badges
// Description: Calendar-day deadline classification for assigned surveys.
// Purpose: Derive the overdue / due-soon badge from a deadline and "today".
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Deadlines are compared by calendar day, not by instant: a deadline later
//! today is `DueToday` regardless of the hour. Callers supply `today` in the
//! portal's reporting time zone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::Date;

// ============================================================================
// SECTION: Deadline Status
// ============================================================================

/// Upper bound, in days, for the due-soon badge.
pub const DUE_SOON_DAYS: i64 = 3;

/// Deadline badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeadlineStatus {
    /// Deadline passed `days` days ago.
    Overdue {
        /// Whole days since the deadline.
        days: i64,
    },
    /// Deadline is today.
    DueToday,
    /// Deadline is within [`DUE_SOON_DAYS`] days.
    DueSoon {
        /// Whole days remaining.
        days: i64,
    },
    /// Deadline is further out.
    Open {
        /// Whole days remaining.
        days: i64,
    },
}

/// Classifies `deadline` relative to `today`.
#[must_use]
pub fn deadline_status(deadline: Date, today: Date) -> DeadlineStatus {
    let days = (deadline - today).whole_days();
    match days {
        d if d < 0 => DeadlineStatus::Overdue { days: -d },
        0 => DeadlineStatus::DueToday,
        d if d <= DUE_SOON_DAYS => DeadlineStatus::DueSoon { days: d },
        d => DeadlineStatus::Open { days: d },
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::panic, reason = "Test-only date construction.")]

    use time::Date;
    use time::Month;

    use super::DeadlineStatus;
    use super::deadline_status;

    fn day(d: u8) -> Date {
        match Date::from_calendar_date(2025, Month::March, d) {
            Ok(date) => date,
            Err(err) => panic!("bad test date: {err}"),
        }
    }

    #[test]
    fn classifies_calendar_day_distance() {
        assert_eq!(deadline_status(day(10), day(12)), DeadlineStatus::Overdue { days: 2 });
        assert_eq!(deadline_status(day(12), day(12)), DeadlineStatus::DueToday);
        assert_eq!(deadline_status(day(13), day(12)), DeadlineStatus::DueSoon { days: 1 });
        assert_eq!(deadline_status(day(15), day(12)), DeadlineStatus::DueSoon { days: 3 });
        assert_eq!(deadline_status(day(16), day(12)), DeadlineStatus::Open { days: 4 });
    }
}
