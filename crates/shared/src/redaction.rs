//! Secret and identifier redaction utilities.
//!
//! Student identifiers (USN, full name) are personal data: logs and error
//! metadata carry their length, never the raw value.

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

/// Checks if a key/variable name likely refers to a secret.
///
/// # Examples
///
/// ```
/// use results_portal_shared::is_secret_key;
///
/// assert!(is_secret_key("API_KEY"));
/// assert!(is_secret_key("authorization"));
/// assert!(!is_secret_key("RP_LOG_LEVEL"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    key.contains("KEY")
        || key.contains("TOKEN")
        || key.contains("SECRET")
        || key.contains("PASSWORD")
        || key.contains("CREDENTIAL")
        || key.contains("AUTH")
}

/// Checks if a key names a student identifier that must not be echoed.
///
/// # Examples
///
/// ```
/// use results_portal_shared::is_identifier_key;
///
/// assert!(is_identifier_key("usn"));
/// assert!(is_identifier_key("fullName"));
/// assert!(!is_identifier_key("subjectsCount"));
/// ```
pub fn is_identifier_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key == "usn" || key == "fullname" || key == "name" || key.ends_with("query")
}

/// Redacts a value if the key is a secret or a student identifier.
///
/// Identifiers keep their length so support staff can still spot empty or
/// truncated input.
///
/// # Examples
///
/// ```
/// use results_portal_shared::redact_if_sensitive;
///
/// assert_eq!(redact_if_sensitive("API_KEY", "sk-123"), "[REDACTED]");
/// assert_eq!(redact_if_sensitive("usn", "3VC24CD001"), "[REDACTED,len=10]");
/// assert_eq!(redact_if_sensitive("format", "csv"), "csv");
/// ```
pub fn redact_if_sensitive(key: &str, value: &str) -> String {
    if is_secret_key(key) {
        REDACTED.to_string()
    } else if is_identifier_key(key) {
        format!("[REDACTED,len={}]", value.chars().count())
    } else {
        value.to_string()
    }
}
