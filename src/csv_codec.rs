use std::collections::HashMap;

use crate::error::CodecError;
use crate::models::Record;

/// One data line keyed by header cell.
pub type Row = HashMap<String, String>;

fn clean(value: &str) -> String {
    value.replace('"', "").trim().to_string()
}

/// Splits one physical line into cells. An unclosed quote runs to the end of
/// the line and never into the next one.
fn split_line(line: &str) -> Result<Vec<String>, CodecError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let record = reader.records().next().transpose()?.unwrap_or_default();
    Ok(record.iter().map(clean).collect())
}

/// Parses delimited text whose first line is the header.
///
/// Each line is one row. Cells are trimmed and stray double quotes removed.
/// Rows shorter than the header map the missing columns to the empty string.
/// Lines that are blank after trimming produce no row; a line of bare
/// separators is still a row.
pub fn parse(text: &str) -> Result<Vec<Row>, CodecError> {
    if text.trim().is_empty() {
        return Err(CodecError::Empty);
    }

    let mut lines = text.lines();
    let headers = split_line(lines.next().unwrap_or_default())?;
    if headers.iter().all(String::is_empty) {
        return Err(CodecError::Empty);
    }

    let mut rows = Vec::new();
    for line in lines.filter(|line| !line.trim().is_empty()) {
        let cells = split_line(line)?;
        let row = headers
            .iter()
            .enumerate()
            .map(|(index, header)| (header.clone(), cells.get(index).cloned().unwrap_or_default()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Writes a bare header line from `field_order`, then one line per record with
/// every value wrapped in double quotes. Unknown fields become `""`.
pub fn serialize<R: Record>(records: &[R], field_order: &[&str]) -> Result<String, CodecError> {
    let mut header = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    header.write_record(field_order)?;
    let buffer = header.into_inner().map_err(|err| err.into_error())?;

    let mut body = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(buffer);

    for record in records {
        let cells: Vec<String> = field_order
            .iter()
            .map(|name| record.field(name).map(|v| v.into_owned()).unwrap_or_default())
            .collect();
        body.write_record(&cells)?;
    }

    let bytes = body.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlumniRecord;

    fn alumnus(digital_id: &str, name: &str, email: &str) -> AlumniRecord {
        AlumniRecord {
            id: digital_id.to_lowercase(),
            digital_id: digital_id.to_string(),
            full_name: name.to_string(),
            email: email.to_string(),
            graduation_year: 2021,
            department: "Mechanical".to_string(),
            current_company: String::new(),
            current_role: "Designer".to_string(),
            location: String::new(),
            phone: "+91 9876543210".to_string(),
            linkedin: String::new(),
            status: "Active".to_string(),
        }
    }

    #[test]
    fn parses_header_keyed_rows() {
        let rows = parse("digital_id, full_name ,email\nALU001,Jane Doe,jane@x.com\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["full_name"], "Jane Doe");
        assert_eq!(rows[0]["email"], "jane@x.com");
    }

    #[test]
    fn short_rows_fill_missing_columns_with_empty_strings() {
        let rows = parse("a,b,c\n1\n").unwrap();
        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "");
        assert_eq!(rows[0]["c"], "");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let rows = parse("a,b\n1,2\n\n   \n3,4\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["a"], "3");
    }

    #[test]
    fn separator_only_lines_are_rows() {
        let rows = parse("a,b,c\n,,\n\"\",\"\"\n1,2,3\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].values().all(String::is_empty));
        assert!(rows[1].values().all(String::is_empty));
        assert_eq!(rows[2]["c"], "3");
    }

    #[test]
    fn unclosed_quote_stays_on_its_own_line() {
        let text = "id,name,email\nALU001,\"Jane Doe,jane@x.com\nALU002,John,john@x.com\n";
        let rows = parse(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "ALU001");
        assert_eq!(rows[0]["email"], "");
        assert_eq!(rows[1]["id"], "ALU002");
        assert_eq!(rows[1]["email"], "john@x.com");
    }

    #[test]
    fn quotes_and_surrounding_whitespace_are_stripped() {
        let rows = parse("\"name\",\"city\"\n\"  Asha \",\"Mumbai, Maharashtra\"\n").unwrap();
        assert_eq!(rows[0]["name"], "Asha");
        assert_eq!(rows[0]["city"], "Mumbai, Maharashtra");
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let rows = parse("a,b\r\n1,2\r\n").unwrap();
        assert_eq!(rows[0]["b"], "2");
    }

    #[test]
    fn empty_input_is_a_structural_error() {
        assert!(matches!(parse(""), Err(CodecError::Empty)));
        assert!(matches!(parse("  \n \n"), Err(CodecError::Empty)));
    }

    #[test]
    fn serialize_quotes_every_value_but_not_the_header() {
        let records = vec![alumnus("ALU001", "Jane Doe", "jane@x.com")];
        let text = serialize(&records, &["digital_id", "full_name", "location", "missing"]).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("digital_id,full_name,location,missing"));
        assert_eq!(lines.next(), Some("\"ALU001\",\"Jane Doe\",\"\",\"\""));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn parse_recovers_serialized_values() {
        let order = [
            "digital_id",
            "full_name",
            "email",
            "graduation_year",
            "current_role",
            "phone",
        ];
        let records = vec![
            alumnus("ALU001", "Jane Doe", "jane@x.com"),
            alumnus("ALU002", "Ravi Kumar", "ravi@y.org"),
        ];

        let rows = parse(&serialize(&records, &order).unwrap()).unwrap();

        assert_eq!(rows.len(), records.len());
        for (row, record) in rows.iter().zip(&records) {
            for name in order {
                assert_eq!(row[name], record.field(name).unwrap(), "field {name}");
            }
        }
    }
}
