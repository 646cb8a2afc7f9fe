//! On-demand birthday and anniversary countdowns.

use chrono::NaiveDateTime;

use crate::events::recurrence::next_occurrence;
use crate::model::{Employee, EventKind, UpcomingEvent};

/// Countdown rows for every record that has the date selected by `kind`.
///
/// Rows are narrowed by a case-insensitive name search, then sorted by
/// `days_left` ascending. The sort is stable, so ties keep store order.
pub fn upcoming_events(
    records: &[Employee],
    reference: NaiveDateTime,
    kind: EventKind,
    search: Option<&str>,
) -> Vec<UpcomingEvent> {
    let term = search.map(str::trim).filter(|t| !t.is_empty());

    let mut rows: Vec<UpcomingEvent> = records
        .iter()
        .filter(|e| term.is_none_or(|t| e.matches_name(t)))
        .filter_map(|e| {
            let source = match kind {
                EventKind::Birthday => e.dob,
                EventKind::Anniversary => e.doj,
            }?;
            let occurrence = next_occurrence(reference, source);
            let (dob, doj) = match kind {
                EventKind::Birthday => (Some(source), None),
                EventKind::Anniversary => (None, Some(source)),
            };
            Some(UpcomingEvent {
                id: e.id.clone(),
                name: e.name.clone(),
                email: e.email.clone(),
                dob,
                doj,
                days_left: occurrence.days_until,
            })
        })
        .collect();

    rows.sort_by_key(|row| row.days_left);
    rows
}
