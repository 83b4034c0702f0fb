//! CSV export parser.
//!
//! Expected header (order free, quotes stripped):
//! `usn,name,total_marks,percentage,sgpa,section,pdf_drive_link,class_rank,
//! college_rank,subject1..subject8`. Subject cells look like `BMATS101:76 (P)`.

use super::{DatasetError, DatasetLocation, LocatedRecord, validated};
use results_portal_domain::{StudentRecord, SubjectCode, SubjectResult, SubjectStatus, Usn};
use rustc_hash::FxHashMap;
use std::str::FromStr;

const REQUIRED_COLUMNS: [&str; 5] = ["usn", "name", "total_marks", "percentage", "sgpa"];
const SUBJECT_COLUMNS: usize = 8;

/// Parse a CSV export into records, skipping rows without a seat number or name.
pub fn parse_csv_dataset(text: &str) -> Result<Vec<StudentRecord>, DatasetError> {
    Ok(parse_csv_rows(text)?
        .into_iter()
        .map(|located| located.record)
        .collect())
}

/// Parse a CSV export, keeping each record's physical line.
pub(super) fn parse_csv_rows(text: &str) -> Result<Vec<LocatedRecord>, DatasetError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return Err(DatasetError::MissingHeader);
    };
    let columns = ColumnMap::from_header(header_line)?;

    let mut records = Vec::new();
    for (line_number, line) in lines {
        let location = DatasetLocation::Line(line_number);
        let row = Row {
            columns: &columns,
            values: split_line(line),
            location,
        };
        if let Some(record) = row.into_record()? {
            records.push(LocatedRecord {
                location,
                record: validated(record, location)?,
            });
        }
    }
    Ok(records)
}

struct ColumnMap {
    positions: FxHashMap<String, usize>,
}

impl ColumnMap {
    fn from_header(line: &str) -> Result<Self, DatasetError> {
        let positions: FxHashMap<String, usize> = split_line(line)
            .into_iter()
            .enumerate()
            .map(|(index, name)| (name.replace('"', "").trim().to_ascii_lowercase(), index))
            .collect();
        for column in REQUIRED_COLUMNS {
            if !positions.contains_key(column) {
                return Err(DatasetError::MissingColumn { column });
            }
        }
        Ok(Self { positions })
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }
}

struct Row<'a> {
    columns: &'a ColumnMap,
    values: Vec<String>,
    location: DatasetLocation,
}

impl Row<'_> {
    fn value(&self, column: &str) -> &str {
        self.columns
            .position(column)
            .and_then(|position| self.values.get(position))
            .map_or("", |value| value.trim())
    }

    fn into_record(self) -> Result<Option<StudentRecord>, DatasetError> {
        let usn = self.value("usn");
        let name = self.value("name");
        if usn.is_empty() || name.is_empty() {
            return Ok(None);
        }

        let usn = Usn::parse(usn).map_err(|error| self.invalid("usn", error.to_string()))?;
        let mut subjects = Vec::with_capacity(SUBJECT_COLUMNS);
        for index in 1..=SUBJECT_COLUMNS {
            let column = format!("subject{index}");
            let cell = self.value(&column);
            if !cell.is_empty() {
                let subject =
                    parse_subject_cell(cell).map_err(|reason| self.invalid("subject", reason))?;
                subjects.push(subject);
            }
        }

        Ok(Some(StudentRecord {
            usn,
            full_name: name.into(),
            total_marks: self.required_number("total_marks")?,
            percentage: self.required_number("percentage")?,
            sgpa: self.required_number("sgpa")?,
            subjects,
            section: self.optional_text("section"),
            class_rank: self.optional_number("class_rank")?,
            college_rank: self.optional_number("college_rank")?,
            pdf_link: self.optional_text("pdf_drive_link"),
        }))
    }

    fn required_number<T: FromStr>(&self, column: &'static str) -> Result<T, DatasetError> {
        let value = self.value(column);
        value
            .parse::<T>()
            .map_err(|_| self.invalid(column, format!("`{value}` is not a number")))
    }

    fn optional_number<T: FromStr>(&self, column: &'static str) -> Result<Option<T>, DatasetError> {
        if self.value(column).is_empty() {
            return Ok(None);
        }
        self.required_number(column).map(Some)
    }

    fn optional_text(&self, column: &str) -> Option<Box<str>> {
        let value = self.value(column);
        (!value.is_empty()).then(|| value.into())
    }

    fn invalid(&self, field: &'static str, reason: String) -> DatasetError {
        DatasetError::InvalidField {
            location: self.location,
            field,
            reason,
        }
    }
}

/// Split one CSV line, honoring double quotes and `""` escapes.
fn split_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            },
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => values.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    values.push(current);
    values
}

/// Parse `CODE:MARKS (P|F)`.
fn parse_subject_cell(cell: &str) -> Result<SubjectResult, String> {
    let malformed = || format!("`{cell}` is not CODE:MARKS (P|F)");

    let (code, rest) = cell.split_once(':').ok_or_else(malformed)?;
    if code.is_empty()
        || !code
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
    {
        return Err(malformed());
    }

    let digits_end = rest
        .find(|ch: char| !ch.is_ascii_digit())
        .ok_or_else(malformed)?;
    let (marks, suffix) = rest.split_at(digits_end);
    let status = match suffix.trim_start() {
        "(P)" => SubjectStatus::Pass,
        "(F)" => SubjectStatus::Fail,
        _ => return Err(malformed()),
    };
    let marks: u8 = marks.parse().map_err(|_| malformed())?;
    if marks > 100 {
        return Err(format!("marks in `{cell}` exceed 100"));
    }

    let code = SubjectCode::parse(code).map_err(|error| error.to_string())?;
    Ok(SubjectResult::new(code, marks, status))
}
