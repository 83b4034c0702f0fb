//! Static subject catalog for first- and second-semester course codes.

/// Known course codes and their official display names.
const SUBJECT_NAMES: &[(&str, &str)] = &[
    ("BMATS101", "MATHEMATICS FOR CSE STREAM-1"),
    ("BPHYS102", "PHYSICS FOR CSE STREAM"),
    ("BPOPS103", "PRINCIPLES OF PROGRAMMING USING C"),
    ("BENGK106", "COMMUNICATIVE ENGLISH"),
    ("BKSKK107", "SAMSKRUTIKA KANNADA"),
    ("BKBKK107", "SAMSKRUTIKA KANNADA"),
    ("BSFHK158", "SCIENTIFIC FOUNDATIONS OF HEALTH"),
    ("BESCK104B", "INTRODUCTION TO ELECTRONICS ENGINEERING"),
    ("BESCK104C", "INTRODUCTION TO ELECTRONICS ENGINEERING"),
    ("BETCK105H", "INTRODUCTION TO INTERNET OF THINGS (IOT)"),
    ("BMATS201", "MATHEMATICS-II FOR CSE STREAM"),
    ("BCHES202", "APPLIED CHEMISTRY FOR CSE STREAM"),
    ("BCEDK203", "COMPUTER-AIDED ENGINEERING DRAWING"),
    ("BPWSK206", "PROFESSIONAL WRITING SKILLS IN ENGLISH"),
    ("BICOK207", "INDIAN CONSTITUTION"),
    ("BIDTK258", "INNOVATION AND DESIGN THINKING"),
    ("BESCK204B", "INTRODUCTION TO ELECTRICAL ENGINEERING"),
    ("BESCK204C", "INTRODUCTION TO ELECTRICAL ENGINEERING"),
    ("BPLCK205D", "INTRODUCTION TO C++ PROGRAMMING"),
];

/// Look up the catalog name for a course code (case-insensitive).
#[must_use]
pub fn subject_name(code: &str) -> Option<&'static str> {
    let code = code.trim();
    SUBJECT_NAMES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Display name for a course code, falling back to the code itself.
#[must_use]
pub fn display_name(code: &str) -> &str {
    subject_name(code).unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve_in_any_case() {
        assert_eq!(subject_name("BMATS101"), Some("MATHEMATICS FOR CSE STREAM-1"));
        assert_eq!(subject_name("bmats201"), Some("MATHEMATICS-II FOR CSE STREAM"));
    }

    #[test]
    fn unknown_codes_display_as_themselves() {
        assert_eq!(subject_name("BXYZ999"), None);
        assert_eq!(display_name("BXYZ999"), "BXYZ999");
    }

    #[test]
    fn catalog_codes_are_unique() {
        for (index, (code, _)) in SUBJECT_NAMES.iter().enumerate() {
            assert!(
                SUBJECT_NAMES
                    .iter()
                    .skip(index + 1)
                    .all(|(other, _)| other != code),
                "duplicate catalog code {code}"
            );
        }
    }
}
