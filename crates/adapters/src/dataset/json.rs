//! JSON array dataset parser.

use super::{DatasetError, DatasetLocation, validated};
use results_portal_domain::{Grade, StudentRecord, SubjectCode, SubjectResult, SubjectStatus, Usn};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStudent {
    usn: String,
    full_name: String,
    total_marks: u32,
    percentage: f64,
    sgpa: f64,
    subjects: Vec<RawSubject>,
    #[serde(rename = "class", default)]
    section: Option<String>,
    #[serde(default)]
    class_rank: Option<u32>,
    #[serde(default)]
    college_rank: Option<u32>,
    #[serde(default)]
    pdf_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSubject {
    code: String,
    #[serde(default)]
    subject: Option<String>,
    marks: u8,
    #[serde(default)]
    grade: Option<Grade>,
    status: SubjectStatus,
}

/// Parse a JSON array of student objects in the wire shape.
///
/// `subject` defaults to the catalog name and `grade` to the band for the
/// marks; a supplied grade that disagrees with the marks is rejected.
pub fn parse_json_dataset(text: &str) -> Result<Vec<StudentRecord>, DatasetError> {
    let raw: Vec<RawStudent> = serde_json::from_str(text)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, student)| {
            let location = DatasetLocation::Record(index + 1);
            let record = student.into_record(location)?;
            validated(record, location)
        })
        .collect()
}

impl RawStudent {
    fn into_record(self, location: DatasetLocation) -> Result<StudentRecord, DatasetError> {
        let usn = Usn::parse(&self.usn).map_err(|error| DatasetError::InvalidField {
            location,
            field: "usn",
            reason: error.to_string(),
        })?;
        let subjects = self
            .subjects
            .into_iter()
            .map(|subject| subject.into_result(location))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StudentRecord {
            usn,
            full_name: self.full_name.trim().into(),
            total_marks: self.total_marks,
            percentage: self.percentage,
            sgpa: self.sgpa,
            subjects,
            section: non_blank(self.section),
            class_rank: self.class_rank,
            college_rank: self.college_rank,
            pdf_link: non_blank(self.pdf_link),
        })
    }
}

impl RawSubject {
    fn into_result(self, location: DatasetLocation) -> Result<SubjectResult, DatasetError> {
        let code = SubjectCode::parse(&self.code).map_err(|error| DatasetError::InvalidField {
            location,
            field: "subjects.code",
            reason: error.to_string(),
        })?;
        let mut result = SubjectResult::new(code, self.marks, self.status);
        if let Some(name) = self.subject.as_deref().filter(|name| !name.trim().is_empty()) {
            result = result.with_subject_name(name);
        }
        if let Some(grade) = self.grade {
            result.grade = grade;
        }
        Ok(result)
    }
}

fn non_blank(value: Option<String>) -> Option<Box<str>> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(String::into_boxed_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use results_portal_domain::RecordError;

    const ONE_RECORD: &str = r#"[
        {
            "usn": "3vc24cd010",
            "fullName": "  TEST STUDENT ",
            "totalMarks": 91,
            "percentage": 45.5,
            "sgpa": 4.2,
            "subjects": [
                { "code": "BMATS201", "marks": 45, "status": "Pass" },
                { "code": "ZZZ999", "subject": "ELECTIVE", "marks": 46, "grade": "E", "status": "Pass" }
            ],
            "class": " "
        }
    ]"#;

    #[test]
    fn parses_wire_shape_and_derives_missing_fields() -> Result<(), DatasetError> {
        let records = parse_json_dataset(ONE_RECORD)?;
        let record = records.first().ok_or(DatasetError::MissingHeader)?;
        assert_eq!(record.usn.as_str(), "3VC24CD010");
        assert_eq!(record.full_name.as_ref(), "TEST STUDENT");
        assert_eq!(record.section, None);

        let names: Vec<&str> = record
            .subjects
            .iter()
            .map(|subject| subject.subject.as_ref())
            .collect();
        assert_eq!(names, vec!["MATHEMATICS-II FOR CSE STREAM", "ELECTIVE"]);
        assert_eq!(record.subjects.first().map(|s| s.grade), Some(Grade::E));
        Ok(())
    }

    #[test]
    fn mismatched_grade_names_the_record() {
        let text = ONE_RECORD.replace(r#""grade": "E""#, r#""grade": "A""#);
        let error = parse_json_dataset(&text).err();
        assert!(matches!(
            error,
            Some(DatasetError::InvalidRecord {
                location: DatasetLocation::Record(1),
                source: RecordError::GradeMismatch { .. },
            })
        ));
    }

    #[test]
    fn empty_subjects_fail_validation() {
        let text = r#"[{ "usn": "X1", "fullName": "X", "totalMarks": 0,
            "percentage": 0, "sgpa": 0, "subjects": [] }]"#;
        let error = parse_json_dataset(text).err();
        assert_eq!(
            error.map(|error| error.to_string()),
            Some("record 1: subjects must be non-empty".to_owned())
        );
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            parse_json_dataset("{ not json"),
            Err(DatasetError::MalformedJson(_))
        ));
    }
}
