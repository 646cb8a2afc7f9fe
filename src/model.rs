//! Record types shared by the store, the event core and the HTTP layer.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Photo URL used when an employee is created without one.
pub const DEFAULT_PHOTO_URL: &str = "https://example.com/default-photo.jpg";

/// An employee in the team directory.
///
/// Birth and joining dates are optional; records without them are skipped by
/// the event computations rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    /// Date of birth.
    pub dob: Option<NaiveDate>,
    /// Date of joining; its anniversaries are the work anniversaries.
    pub doj: Option<NaiveDate>,
    pub photo: String,
}

impl Employee {
    /// Case-insensitive substring match on the name. Empty terms match.
    pub fn matches_name(&self, term: &str) -> bool {
        contains_ci(&self.name, term)
    }

    /// Case-insensitive substring match on name, department or email.
    pub fn matches_directory(&self, term: &str) -> bool {
        contains_ci(&self.name, term)
            || contains_ci(&self.department, term)
            || contains_ci(&self.email, term)
    }
}

/// Payload for creating an employee.
///
/// Every field is optional at the serde level so that missing fields surface
/// as a validation error with a readable message instead of a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEmployee {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub dob: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub doj: Option<NaiveDate>,
    #[serde(default)]
    pub photo: Option<String>,
}

impl NewEmployee {
    /// Validate required fields and build a record with a fresh id.
    ///
    /// Returns `None` when any required field is missing or blank.
    pub fn into_employee(self) -> Option<Employee> {
        let name = non_blank(self.name)?;
        let email = non_blank(self.email)?;
        let department = non_blank(self.department)?;
        let dob = self.dob?;
        let doj = self.doj?;
        let photo = non_blank(self.photo).unwrap_or_else(|| DEFAULT_PHOTO_URL.to_owned());

        Some(Employee {
            id: new_id(),
            name,
            email,
            department,
            dob: Some(dob),
            doj: Some(doj),
            photo,
        })
    }
}

/// A registered dashboard user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// bcrypt hash, see [`crate::auth::Authenticator::hash_password`].
    pub password_hash: String,
}

/// Which recurring date an [`UpcomingEvent`] was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Birthday,
    Anniversary,
}

/// One row of the birthday / anniversary countdown views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEvent {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doj: Option<NaiveDate>,
    pub days_left: i64,
}

/// Generate a new record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; the latter keeps its date part.
fn flexible_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.map(|r| r.trim().to_owned()).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid date: {raw}")))
}
