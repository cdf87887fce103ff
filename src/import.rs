use std::fmt::Write;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::csv_codec;
use crate::models::AlumniRecord;
use crate::validate;

pub const STRUCTURAL_FAILURE: &str = "Failed to parse CSV file. Please check the file format.";
pub const DEFAULT_PREVIEW: usize = 5;

/// Outcome of one import: what was read, what passed, and why the rest did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportBatch {
    pub total_rows: usize,
    pub accepted: Vec<AlumniRecord>,
    pub rejections: Vec<String>,
}

impl ImportBatch {
    pub fn from_text(text: &str) -> Self {
        let rows = match csv_codec::parse(text) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "import rejected before validation");
                return Self::failed();
            }
        };

        let mut batch = Self {
            total_rows: rows.len(),
            ..Self::default()
        };

        for (index, row) in rows.iter().enumerate() {
            match validate::validate(row, index) {
                Ok(record) => batch.accepted.push(record),
                Err(rejection) => {
                    debug!(%rejection, "row rejected");
                    batch.rejections.push(rejection.to_string());
                }
            }
        }

        info!(
            total = batch.total_rows,
            accepted = batch.accepted.len(),
            rejected = batch.rejections.len(),
            "import batch validated"
        );
        batch
    }

    /// Reads `path` as text, tolerating invalid UTF-8 sequences.
    pub fn from_path(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => Self::from_text(&String::from_utf8_lossy(&bytes)),
            Err(err) => {
                warn!(error = %err, path = %path.display(), "unable to read import file");
                Self::failed()
            }
        }
    }

    pub fn failed() -> Self {
        Self {
            total_rows: 0,
            accepted: Vec::new(),
            rejections: vec![STRUCTURAL_FAILURE.to_string()],
        }
    }

    /// At least one record made it through.
    pub fn is_success(&self) -> bool {
        !self.accepted.is_empty()
    }

    pub fn summary(&self, preview: usize) -> String {
        let mut output = String::new();

        if self.is_success() {
            let _ = writeln!(
                output,
                "Import successful: imported {} out of {} records.",
                self.accepted.len(),
                self.total_rows
            );
        } else {
            let _ = writeln!(output, "Import failed.");
        }

        if !self.rejections.is_empty() {
            let _ = writeln!(output, "Errors encountered:");
            for reason in self.rejections.iter().take(preview) {
                let _ = writeln!(output, "- {reason}");
            }
            if self.rejections.len() > preview {
                let _ = writeln!(
                    output,
                    "- ... and {} more errors",
                    self.rejections.len() - preview
                );
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = "digital_id,full_name,email,graduation_year,department
ALU001,Jane Doe,jane@x.com,2020,CS
ALU002,John,bad-email,2019,EE
,Missing Name,,2021,ME
";

    #[test]
    fn mixed_batch_keeps_valid_rows() {
        let batch = ImportBatch::from_text(SCENARIO);

        assert_eq!(batch.total_rows, 3);
        assert_eq!(batch.accepted.len(), 1);
        assert_eq!(batch.accepted[0].full_name, "Jane Doe");
        assert_eq!(batch.accepted[0].graduation_year, 2020);
        assert_eq!(
            batch.rejections,
            [
                "Row 3: Invalid email format",
                "Row 4: Missing required fields: email, digital_id",
            ]
        );
        assert!(batch.is_success());
    }

    #[test]
    fn blank_lines_do_not_shift_row_numbers() {
        let text = "digital_id,full_name,email,graduation_year,department\n\nALU001,A,bad,2020,CS\n";
        let batch = ImportBatch::from_text(text);
        assert_eq!(batch.total_rows, 1);
        assert_eq!(batch.rejections, ["Row 2: Invalid email format"]);
    }

    #[test]
    fn separator_only_rows_are_counted_and_rejected() {
        let text = "digital_id,full_name,email,graduation_year,department\n,,,,\nALU001,A,bad,2020,CS\n";
        let batch = ImportBatch::from_text(text);
        assert_eq!(batch.total_rows, 2);
        assert_eq!(
            batch.rejections,
            [
                "Row 2: Missing required fields: full_name, email, digital_id, graduation_year, department",
                "Row 3: Invalid email format",
            ]
        );
    }

    #[test]
    fn unclosed_quote_does_not_hide_later_rows() {
        let text = "digital_id,full_name,email,graduation_year,department\n\
                    ALU001,\"Jane Doe,jane@x.com,2020,CS\n\
                    ALU002,John,john@x.com,2019,EE\n";
        let batch = ImportBatch::from_text(text);
        assert_eq!(batch.total_rows, 2);
        assert_eq!(batch.accepted.len(), 1);
        assert_eq!(batch.accepted[0].digital_id, "ALU002");
        assert_eq!(
            batch.rejections,
            ["Row 2: Missing required fields: email, graduation_year, department"]
        );
    }

    #[test]
    fn empty_file_is_a_failed_import() {
        let batch = ImportBatch::from_text("");
        assert_eq!(batch, ImportBatch::failed());
        assert!(!batch.is_success());
        assert_eq!(batch.rejections, [STRUCTURAL_FAILURE]);
    }

    #[test]
    fn header_only_file_accepts_nothing() {
        let batch = ImportBatch::from_text("digital_id,full_name,email,graduation_year,department\n");
        assert_eq!(batch.total_rows, 0);
        assert!(batch.rejections.is_empty());
        assert!(!batch.is_success());
    }

    #[test]
    fn unreadable_file_is_a_failed_import() {
        let batch = ImportBatch::from_path(Path::new("/definitely/not/here.csv"));
        assert_eq!(batch.rejections, [STRUCTURAL_FAILURE]);
    }

    #[test]
    fn summary_previews_a_bounded_number_of_errors() {
        let batch = ImportBatch {
            total_rows: 8,
            accepted: Vec::new(),
            rejections: (2..=9).map(|n| format!("Row {n}: Invalid email format")).collect(),
        };

        let summary = batch.summary(DEFAULT_PREVIEW);

        assert!(summary.starts_with("Import failed."));
        assert!(summary.contains("- Row 6: Invalid email format"));
        assert!(!summary.contains("Row 7:"));
        assert!(summary.contains("... and 3 more errors"));
    }

    #[test]
    fn summary_reports_counts_on_success() {
        let summary = ImportBatch::from_text(SCENARIO).summary(DEFAULT_PREVIEW);
        assert!(summary.contains("imported 1 out of 3 records"));
        assert!(!summary.contains("more errors"));
    }
}
