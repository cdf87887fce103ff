use chrono::{Datelike, Local};
use thiserror::Error;
use uuid::Uuid;

use crate::csv_codec::Row;
use crate::models::{AlumniRecord, DEFAULT_ALUMNI_STATUS};

pub const REQUIRED_FIELDS: [&str; 5] = [
    "full_name",
    "email",
    "digital_id",
    "graduation_year",
    "department",
];

/// Why a data row was not accepted. `row` is the line number in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Row {row}: Missing required fields: {}", .fields.join(", "))]
    MissingFields { row: usize, fields: Vec<&'static str> },
    #[error("Row {row}: Invalid email format")]
    InvalidEmail { row: usize },
}

/// `local@domain.tld`: one `@`, no whitespace, and a dot inside the domain part.
pub fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(index, c)| c == '.' && index > 0 && index + 1 < domain.len())
}

// Leading-digit parse: "2020" and "2020 batch" both give 2020.
fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i32>()
        .ok()
        .map(|year| sign * year)
        .filter(|year| *year != 0)
}

fn cell<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).map_or("", String::as_str)
}

/// Validates the `row_index`-th data row (0-based) against the import schema.
pub fn validate(row: &Row, row_index: usize) -> Result<AlumniRecord, Rejection> {
    validate_with_fallback_year(row, row_index, Local::now().year())
}

pub fn validate_with_fallback_year(
    row: &Row,
    row_index: usize,
    fallback_year: i32,
) -> Result<AlumniRecord, Rejection> {
    let line = row_index + 2;

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| cell(row, field).is_empty())
        .collect();
    if !missing.is_empty() {
        return Err(Rejection::MissingFields {
            row: line,
            fields: missing,
        });
    }

    let email = cell(row, "email");
    if !is_plausible_email(email) {
        return Err(Rejection::InvalidEmail { row: line });
    }

    let id = match cell(row, "id") {
        "" => Uuid::new_v4().to_string(),
        supplied => supplied.to_string(),
    };
    let status = match cell(row, "status") {
        "" => DEFAULT_ALUMNI_STATUS,
        supplied => supplied,
    };

    Ok(AlumniRecord {
        id,
        digital_id: cell(row, "digital_id").to_string(),
        full_name: cell(row, "full_name").to_string(),
        email: email.to_string(),
        graduation_year: parse_year(cell(row, "graduation_year")).unwrap_or(fallback_year),
        department: cell(row, "department").to_string(),
        current_company: cell(row, "current_company").to_string(),
        current_role: cell(row, "current_role").to_string(),
        location: cell(row, "location").to_string(),
        phone: cell(row, "phone").to_string(),
        linkedin: cell(row, "linkedin").to_string(),
        status: status.to_string(),
    })
}
