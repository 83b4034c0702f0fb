//! Logger adapter that forwards port events to `tracing`.
//!
//! Field values are redacted before they reach the subscriber: secret keys
//! become `[REDACTED]` and student identifiers keep only their length.

use results_portal_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use results_portal_shared::{REDACTED, is_identifier_key, is_secret_key};
use serde_json::Value;

/// Logger emitting `tracing` events under the `results_portal` target.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    base_fields: LogFields,
}

impl TracingLogger {
    /// Create a logger without base fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base fields applied to every event.
    #[must_use]
    pub fn with_base_fields(mut self, fields: LogFields) -> Self {
        self.base_fields = fields;
        self
    }
}

impl LoggerPort for TracingLogger {
    fn log(&self, event: LogEvent) {
        let fields = merged_fields(&self.base_fields, event.fields);
        let fields = if fields.is_empty() {
            String::new()
        } else {
            Value::Object(fields).to_string()
        };
        let error = event.error.map(|mut error| {
            redact_value(&mut error);
            error.to_string()
        });
        let error = error.as_deref().unwrap_or("");
        let name = event.event.as_ref();
        let message = event.message.as_ref();

        match event.level {
            LogLevel::Debug => {
                tracing::debug!(
                    target: "results_portal",
                    event = name,
                    fields = fields.as_str(),
                    error,
                    "{message}"
                );
            },
            LogLevel::Info => {
                tracing::info!(
                    target: "results_portal",
                    event = name,
                    fields = fields.as_str(),
                    error,
                    "{message}"
                );
            },
            LogLevel::Warn => {
                tracing::warn!(
                    target: "results_portal",
                    event = name,
                    fields = fields.as_str(),
                    error,
                    "{message}"
                );
            },
            LogLevel::Error => {
                tracing::error!(
                    target: "results_portal",
                    event = name,
                    fields = fields.as_str(),
                    error,
                    "{message}"
                );
            },
        }
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(Self {
            base_fields: merged,
        })
    }
}

/// Merge base and event fields, then redact them into a JSON object.
fn merged_fields(base: &LogFields, extra: Option<LogFields>) -> serde_json::Map<String, Value> {
    let mut fields = base.clone();
    if let Some(extra) = extra {
        fields.extend(extra);
    }
    fields
        .into_iter()
        .map(|(key, mut value)| {
            redact_entry(&key, &mut value);
            (key.into_string(), value)
        })
        .collect()
}

fn redact_entry(key: &str, value: &mut Value) {
    if is_secret_key(key) {
        *value = Value::String(REDACTED.to_owned());
    } else if is_identifier_key(key) {
        let length = match &*value {
            Value::String(text) => text.chars().count(),
            Value::Null => 0,
            other => other.to_string().chars().count(),
        };
        *value = Value::String(format!("[REDACTED,len={length}]"));
    } else {
        redact_value(value);
    }
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                redact_entry(key, nested);
            }
        },
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {},
    }
}
