//! Structured logging boundary contract.

use results_portal_shared::ErrorEnvelope;
use std::collections::BTreeMap;

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

/// Additional event fields.
pub type LogFields = BTreeMap<Box<str>, serde_json::Value>;

/// Structured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Stable event name, e.g. `lookup.completed`.
    pub event: Box<str>,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message (safe, redacted).
    pub message: Box<str>,
    /// Optional structured fields.
    pub fields: Option<LogFields>,
    /// Optional error payload.
    pub error: Option<serde_json::Value>,
}

impl LogEvent {
    /// Build an event without fields.
    #[must_use]
    pub fn new(level: LogLevel, event: &str, message: &str) -> Self {
        Self {
            event: event.to_owned().into_boxed_str(),
            level,
            message: message.to_owned().into_boxed_str(),
            fields: None,
            error: None,
        }
    }

    /// Attach structured fields.
    #[must_use]
    pub fn with_fields(mut self, fields: Option<LogFields>) -> Self {
        self.fields = fields;
        self
    }

    /// Attach an error envelope, with identifier metadata redacted.
    #[must_use]
    pub fn with_error(mut self, error: &ErrorEnvelope) -> Self {
        let redacted = error.clone().redact_metadata(&["usn", "fullName", "name"]);
        self.error = serde_json::to_value(redacted).ok();
        self
    }
}

/// Boundary contract for structured logging.
pub trait LoggerPort: Send + Sync {
    /// Emit a structured event.
    fn log(&self, event: LogEvent);

    /// Create a child logger with base fields applied to every event.
    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort>;

    /// Convenience: debug event.
    fn debug(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Debug, event, message).with_fields(fields));
    }

    /// Convenience: info event.
    fn info(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Info, event, message).with_fields(fields));
    }

    /// Convenience: warn event.
    fn warn(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Warn, event, message).with_fields(fields));
    }

    /// Convenience: error event.
    fn error(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Error, event, message).with_fields(fields));
    }

    /// Convenience: event carrying an error envelope.
    fn failure(
        &self,
        level: LogLevel,
        event: &str,
        error: &ErrorEnvelope,
        fields: Option<LogFields>,
    ) {
        self.log(
            LogEvent::new(level, event, &error.message)
                .with_fields(fields)
                .with_error(error),
        );
    }
}
