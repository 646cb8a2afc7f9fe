//! Today / this-month event classification.

use chrono::{Datelike, NaiveDate};

use crate::model::Employee;

/// Records with an event on the reference day and in the reference month.
///
/// Both sequences preserve input order. A record may appear in both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub today: Vec<Employee>,
    pub month: Vec<Employee>,
}

/// Partition `records` by whether a birth or joining date recurs today or
/// this month, relative to `reference`.
pub fn classify(records: &[Employee], reference: NaiveDate) -> Classified {
    Classified {
        today: classify_today(records, reference),
        month: classify_month(records, reference),
    }
}

/// Records whose birth or joining month and day equal the reference's.
pub fn classify_today(records: &[Employee], reference: NaiveDate) -> Vec<Employee> {
    records
        .iter()
        .filter(|e| occurs_on_day(e, reference))
        .cloned()
        .collect()
}

/// Records whose birth or joining month equals the reference month.
pub fn classify_month(records: &[Employee], reference: NaiveDate) -> Vec<Employee> {
    records
        .iter()
        .filter(|e| occurs_in_month(e, reference))
        .cloned()
        .collect()
}

/// Secondary narrowing pass for the month view (name, department, email).
///
/// `None` or an empty term returns the input unchanged.
pub fn search_directory(records: &[Employee], term: Option<&str>) -> Vec<Employee> {
    narrow(records, term, Employee::matches_directory)
}

/// Secondary narrowing pass on the name only.
pub fn search_name(records: &[Employee], term: Option<&str>) -> Vec<Employee> {
    narrow(records, term, Employee::matches_name)
}

fn narrow(
    records: &[Employee],
    term: Option<&str>,
    predicate: fn(&Employee, &str) -> bool,
) -> Vec<Employee> {
    match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => records
            .iter()
            .filter(|e| predicate(e, term))
            .cloned()
            .collect(),
        None => records.to_vec(),
    }
}

fn occurs_on_day(employee: &Employee, reference: NaiveDate) -> bool {
    [employee.dob, employee.doj]
        .into_iter()
        .flatten()
        .any(|d| d.month() == reference.month() && d.day() == reference.day())
}

fn occurs_in_month(employee: &Employee, reference: NaiveDate) -> bool {
    [employee.dob, employee.doj]
        .into_iter()
        .flatten()
        .any(|d| d.month() == reference.month())
}
