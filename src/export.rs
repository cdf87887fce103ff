use chrono::NaiveDate;

use crate::csv_codec;
use crate::error::CodecError;
use crate::models::AlumniRecord;

pub const EXPORT_COLUMNS: [&str; 11] = [
    "digital_id",
    "full_name",
    "email",
    "graduation_year",
    "department",
    "current_company",
    "current_role",
    "location",
    "phone",
    "linkedin",
    "status",
];

pub const TEMPLATE_FILENAME: &str = "alumni_template.csv";

pub fn export_filename(date: NaiveDate) -> String {
    format!("alumni_data_{}.csv", date.format("%Y-%m-%d"))
}

pub fn export_csv(records: &[AlumniRecord]) -> Result<String, CodecError> {
    csv_codec::serialize(records, &EXPORT_COLUMNS)
}

fn sample_alumnus() -> AlumniRecord {
    AlumniRecord {
        id: String::new(),
        digital_id: "ALU2024CS001".to_string(),
        full_name: "John Doe".to_string(),
        email: "john.doe@email.com".to_string(),
        graduation_year: 2024,
        department: "Computer Science".to_string(),
        current_company: "Tech Corp".to_string(),
        current_role: "Software Engineer".to_string(),
        location: "Mumbai, Maharashtra".to_string(),
        phone: "+91 9876543210".to_string(),
        linkedin: "https://linkedin.com/in/johndoe".to_string(),
        status: "Active".to_string(),
    }
}

/// Export header plus one illustrative row.
pub fn template_csv() -> Result<String, CodecError> {
    csv_codec::serialize(&[sample_alumnus()], &EXPORT_COLUMNS)
}
