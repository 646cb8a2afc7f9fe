//! Next-occurrence computation for annually recurring dates.
//!
//! A birthday or joining date recurs every year on the same month and day.
//! Given the current instant, [`next_occurrence`] finds the nearest such date
//! that is today or later and counts the whole days until it.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// The next recurrence of a historical date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// Next date with the source's month and day, never before the reference date.
    pub date: NaiveDate,
    /// Whole days from the reference instant to `date`.
    pub days_until: i64,
}

/// Compute the next occurrence of `source`'s month/day on or after `reference`.
///
/// The comparison is date-only: an occurrence falling on the reference date is
/// not advanced and yields `days_until == 0`. The day count is the ceiling of
/// the millisecond delta between the occurrence at midnight and `reference`,
/// so a reference later in the day still counts a future date as a full day.
///
/// A Feb 29 source in a non-leap year lands on March 1.
pub fn next_occurrence(reference: NaiveDateTime, source: NaiveDate) -> Occurrence {
    let today = reference.date();
    let mut date = occurrence_in_year(reference.year(), source);
    if date < today {
        date = occurrence_in_year(reference.year() + 1, source);
    }

    let delta_ms = (date.and_time(NaiveTime::MIN) - reference).num_milliseconds();
    Occurrence {
        date,
        days_until: ceil_div(delta_ms, MILLIS_PER_DAY).max(0),
    }
}

/// Month/day of `source` placed in `year`, with overflowing days rolling
/// forward into the next month.
fn occurrence_in_year(year: i32, source: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, source.month(), 1)
        .and_then(|first| first.checked_add_days(Days::new(u64::from(source.day0()))))
        // Only reachable outside chrono's representable year range.
        .unwrap_or(source)
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator.div_euclid(denominator);
    if numerator.rem_euclid(denominator) > 0 {
        quotient + 1
    } else {
        quotient
    }
}
