use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RequestError, UnknownEventStatus};

pub const DEFAULT_ALUMNI_STATUS: &str = "Active";

/// Named-field access shared by the CSV codec and the query engine.
pub trait Record {
    /// Fields consulted by a search whose scope is `All`.
    const SEARCH_FIELDS: &'static [&'static str];

    /// Returns the value of `name` as text, or `None` if the record has no such field.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlumniRecord {
    pub id: String,
    pub digital_id: String,
    pub full_name: String,
    pub email: String,
    pub graduation_year: i32,
    pub department: String,
    #[serde(default)]
    pub current_company: String,
    #[serde(default)]
    pub current_role: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default = "default_alumni_status")]
    pub status: String,
}

fn default_alumni_status() -> String {
    DEFAULT_ALUMNI_STATUS.to_string()
}

impl AlumniRecord {
    /// Overlays `incoming` onto this record in place.
    ///
    /// Empty text on `incoming` counts as an absent field and leaves the existing
    /// value alone. `id` is the storage key and is never replaced.
    pub fn absorb(&mut self, incoming: AlumniRecord) {
        fn overlay(slot: &mut String, value: String) {
            if !value.is_empty() {
                *slot = value;
            }
        }

        overlay(&mut self.digital_id, incoming.digital_id);
        overlay(&mut self.full_name, incoming.full_name);
        overlay(&mut self.email, incoming.email);
        self.graduation_year = incoming.graduation_year;
        overlay(&mut self.department, incoming.department);
        overlay(&mut self.current_company, incoming.current_company);
        overlay(&mut self.current_role, incoming.current_role);
        overlay(&mut self.location, incoming.location);
        overlay(&mut self.phone, incoming.phone);
        overlay(&mut self.linkedin, incoming.linkedin);
        overlay(&mut self.status, incoming.status);
    }
}

impl Record for AlumniRecord {
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "full_name",
        "email",
        "digital_id",
        "current_company",
        "current_role",
    ];

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "id" => &self.id,
            "digital_id" | "digitalId" => &self.digital_id,
            "full_name" | "fullName" | "name" => &self.full_name,
            "email" => &self.email,
            "graduation_year" | "graduationYear" => {
                return Some(Cow::Owned(self.graduation_year.to_string()))
            }
            "department" => &self.department,
            "current_company" | "currentCompany" => &self.current_company,
            "current_role" | "currentRole" => &self.current_role,
            "location" => &self.location,
            "phone" => &self.phone,
            "linkedin" => &self.linkedin,
            "status" => &self.status,
            _ => return None,
        };
        Some(Cow::Borrowed(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Past,
}

impl EventStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Ongoing => "Ongoing",
            Self::Past => "Past",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = UnknownEventStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "ongoing" => Ok(Self::Ongoing),
            "past" => Ok(Self::Past),
            _ => Err(UnknownEventStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub status: EventStatus,
    pub funding_goal: i64,
    pub current_funding: i64,
    pub donors_count: i32,
}

impl Record for Event {
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "description"];

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "id" => self.id.to_string(),
            "title" => return Some(Cow::Borrowed(&self.title)),
            "description" => return Some(Cow::Borrowed(&self.description)),
            "status" => return Some(Cow::Borrowed(self.status.as_str())),
            "start_time" => self.start_time.to_string(),
            "end_time" => self.end_time.map(|t| t.to_string()).unwrap_or_default(),
            "funding_goal" => self.funding_goal.to_string(),
            "current_funding" => self.current_funding.to_string(),
            "donors_count" => self.donors_count.to_string(),
            _ => return None,
        };
        Some(Cow::Owned(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    Mentorship,
    #[serde(rename = "Seminar Talk")]
    SeminarTalk,
}

impl RequestKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mentorship => "Mentorship",
            Self::SeminarTalk => "Seminar Talk",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mentorship" => Ok(Self::Mentorship),
            "seminar talk" | "seminar-talk" | "seminar_talk" | "seminar" => Ok(Self::SeminarTalk),
            _ => Err(RequestError::UnknownKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl RequestStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Declined => "Declined",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            _ => Err(RequestError::UnknownStatus(s.to_string())),
        }
    }
}

/// A student's ask of an alumnus, either for mentorship or for a seminar talk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorRequest {
    pub id: Uuid,
    pub requested_by: String,
    pub requested_to: String,
    pub kind: RequestKind,
    pub message: String,
    pub status: RequestStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Record for MentorRequest {
    const SEARCH_FIELDS: &'static [&'static str] = &["requested_by", "requested_to", "message"];

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "id" => return Some(Cow::Owned(self.id.to_string())),
            "requested_by" => self.requested_by.as_str(),
            "requested_to" => self.requested_to.as_str(),
            "kind" | "type" => self.kind.as_str(),
            "message" => self.message.as_str(),
            "status" => self.status.as_str(),
            _ => return None,
        };
        Some(Cow::Borrowed(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AlumniRecord {
        AlumniRecord {
            id: "1".to_string(),
            digital_id: "ALU001".to_string(),
            full_name: "Priya Sharma".to_string(),
            email: "priya@example.com".to_string(),
            graduation_year: 2019,
            department: "Computer Science".to_string(),
            current_company: "Infosys".to_string(),
            current_role: "Engineer".to_string(),
            location: "Pune".to_string(),
            phone: String::new(),
            linkedin: String::new(),
            status: DEFAULT_ALUMNI_STATUS.to_string(),
        }
    }

    #[test]
    fn field_aliases_resolve_to_the_same_value() {
        let record = sample();
        assert_eq!(record.field("name"), record.field("full_name"));
        assert_eq!(record.field("digitalId").as_deref(), Some("ALU001"));
        assert_eq!(record.field("graduation_year").as_deref(), Some("2019"));
        assert!(record.field("nickname").is_none());
    }

    #[test]
    fn absorb_keeps_id_and_existing_values_for_blank_fields() {
        let mut existing = sample();
        let mut incoming = sample();
        incoming.id = "generated".to_string();
        incoming.current_company = String::new();
        incoming.current_role = "Architect".to_string();
        incoming.graduation_year = 2020;

        existing.absorb(incoming);

        assert_eq!(existing.id, "1");
        assert_eq!(existing.current_company, "Infosys");
        assert_eq!(existing.current_role, "Architect");
        assert_eq!(existing.graduation_year, 2020);
    }

    #[test]
    fn statuses_parse_case_insensitively() {
        assert_eq!("upcoming".parse::<EventStatus>(), Ok(EventStatus::Upcoming));
        assert_eq!(" PAST ".parse::<EventStatus>(), Ok(EventStatus::Past));
        assert!("later".parse::<EventStatus>().is_err());
        assert_eq!("seminar-talk".parse::<RequestKind>(), Ok(RequestKind::SeminarTalk));
        assert_eq!("Declined".parse::<RequestStatus>(), Ok(RequestStatus::Declined));
    }
}
