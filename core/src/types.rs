//! Domain DTOs for the staff API.
//!
//! # Design
//! These types mirror the backend's serializers but are defined independently
//! from the mock-server crate; integration tests catch schema drift. Ids are
//! server-assigned — the client never invents one, so the `New*` payloads
//! carry no id and the full entity types always do.
//!
//! Dates cross the wire as `%d.%m.%Y` strings (the backend also accepts ISO
//! `%Y-%m-%d` on input, and so do we). Partial-update payloads skip `None`
//! fields entirely, which is what gives PATCH its only-given-fields-change
//! semantics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a resource.
pub type Id = i64;

/// Wire format for backend dates.
pub mod date_format {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%d.%m.%Y";
    const INPUT_FORMATS: [&str; 2] = ["%d.%m.%Y", "%Y-%m-%d"];

    pub fn parse(value: &str) -> Option<NaiveDate> {
        INPUT_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }
}

/// Wire format for nullable backend dates.
pub mod date_format_opt {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::date_format;

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => date_format::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(raw) => date_format::parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}"))),
        }
    }
}

/// An employee record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Employee {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    #[serde(with = "date_format")]
    pub date_of_birth: NaiveDate,
    #[serde(with = "date_format")]
    pub date_of_entry: NaiveDate,
    #[serde(default, with = "date_format_opt")]
    pub date_of_exit: Option<NaiveDate>,
    /// Personnel number, distinct from the server-assigned `id`.
    pub employee_id: String,
    pub department: Id,
    pub wants_reminder: bool,
    #[serde(default, with = "date_format_opt")]
    pub next_reminder: Option<NaiveDate>,
    /// Months between reminder letters.
    pub reminder_interval: i64,
    pub notes: String,
    pub active: bool,
}

/// Payload for creating an employee. The server assigns the id and
/// initializes `next_reminder` from `date_of_entry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    #[serde(with = "date_format")]
    pub date_of_birth: NaiveDate,
    #[serde(with = "date_format")]
    pub date_of_entry: NaiveDate,
    #[serde(
        default,
        with = "date_format_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_exit: Option<NaiveDate>,
    pub employee_id: String,
    pub department: Id,
    pub wants_reminder: bool,
    pub reminder_interval: i64,
    #[serde(default)]
    pub notes: String,
    pub active: bool,
}

/// Partial update for an employee. Only the fields present in the JSON are
/// applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEmployee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(
        default,
        with = "date_format_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(
        default,
        with = "date_format_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_entry: Option<NaiveDate>,
    #[serde(
        default,
        with = "date_format_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_exit: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wants_reminder: Option<bool>,
    #[serde(
        default,
        with = "date_format_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_reminder: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// A business department.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Department {
    pub id: Id,
    pub name: String,
    pub reminder_interval: i64,
}

/// Payload for creating a department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    pub reminder_interval: i64,
}

/// Partial update for a department.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDepartment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_interval: Option<i64>,
}

/// An appointment scheduled for one employee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Appointment {
    pub id: Id,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub employee: Id,
    pub note: String,
    pub confirmed: bool,
}

/// Payload for creating an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub employee: Id,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub confirmed: bool,
}

/// Partial update for an appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointment {
    #[serde(
        default,
        with = "date_format_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
}

/// A printable letter template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Template {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub template_body: String,
}

/// Payload for creating a letter template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub template_body: String,
}

/// Partial update for a letter template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_body: Option<String>,
}

/// A template rendered for one employee. The fill endpoint returns only the
/// rendered body and the template name, never the full [`Template`] shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilledTemplate {
    pub name: String,
    pub template_body: String,
}
