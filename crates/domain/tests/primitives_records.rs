//! Integration coverage for domain primitives, records, and queries.

use results_portal_domain::{
    Grade, LookupCriteria, LookupQuery, NameKey, PrimitiveError, StudentRecord, SubjectCode,
    SubjectResult, SubjectStatus, Usn,
};
use results_portal_shared::{ErrorEnvelope, ErrorKind};
use std::error::Error;

#[test]
fn primitive_errors_map_into_error_envelopes() -> Result<(), PrimitiveError> {
    let Err(error) = Usn::parse("  ") else {
        return Err(PrimitiveError::EmptyUsn { input_length: 0 });
    };

    let envelope: ErrorEnvelope = error.into();
    assert_eq!(envelope.code.namespace(), "domain");
    assert_eq!(envelope.code.code(), "invalid_usn");
    assert_eq!(envelope.kind, ErrorKind::Expected);
    assert_eq!(
        envelope.metadata.get("input_length"),
        Some(&"2".to_string())
    );

    let Err(error) = SubjectCode::parse("BMATS-101") else {
        return Err(PrimitiveError::EmptySubjectCode { input_length: 0 });
    };
    let envelope: ErrorEnvelope = error.into();
    assert_eq!(envelope.code.code(), "invalid_subject_code");
    assert_eq!(
        envelope.metadata.get("input"),
        Some(&"BMATS-101".to_string())
    );

    Ok(())
}

#[test]
fn record_from_dataset_json_matches_queries() -> Result<(), Box<dyn Error>> {
    let record: StudentRecord = serde_json::from_str(
        r#"{
            "usn": "3vc24cd004",
            "fullName": "B AKHILA",
            "totalMarks": 508,
            "percentage": 63.5,
            "sgpa": 6.8,
            "class": "A",
            "classRank": 2,
            "collegeRank": 2,
            "subjects": [
                {"code": "BMATS101", "subject": "MATHEMATICS FOR CSE STREAM-1", "marks": 51, "grade": "D", "status": "Fail"}
            ]
        }"#,
    )?;
    record.validate()?;
    assert_eq!(record.usn.as_str(), "3VC24CD004");
    assert_eq!(record.section.as_deref(), Some("A"));

    let criteria = LookupQuery::new(Some("3VC24CD004"), Some("b akhila")).resolve()?;
    let LookupCriteria::Both { usn, name } = criteria else {
        return Err("expected combined criteria".into());
    };
    assert_eq!(usn, record.usn);
    assert_eq!(name, record.name_key()?);
    assert_eq!(name, NameKey::parse("  B    Akhila ")?);
    Ok(())
}

#[test]
fn status_is_published_not_derived() -> Result<(), Box<dyn Error>> {
    let subject = SubjectResult::new(SubjectCode::parse("BETCK105H")?, 60, SubjectStatus::Fail);
    assert_eq!(subject.grade, Grade::C);
    assert_eq!(subject.status, SubjectStatus::Fail);
    assert_eq!(SubjectStatus::from_grade(Grade::F), SubjectStatus::Fail);
    assert_eq!(SubjectStatus::from_grade(Grade::E), SubjectStatus::Pass);
    Ok(())
}
