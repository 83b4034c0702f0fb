//! Result-sheet export options, CSV rendering and the printable sheet layout.

use crate::record::StudentRecord;
use crate::sheet::{ResultSheet, SheetLine, SheetTone};
use results_portal_shared::{ErrorCode, ErrorEnvelope};
use std::fmt;
use std::fmt::Write as _;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Printable PDF result sheet.
    #[default]
    Pdf,
    /// Comma-separated values.
    Csv,
}

impl ExportFormat {
    /// Parse a format label (case-insensitive). Absent or blank means PDF.
    pub fn parse(input: Option<&str>) -> Result<Self, ExportOptionsError> {
        let Some(raw) = input.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(Self::Pdf);
        };
        match raw.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "csv" => Ok(Self::Csv),
            _ => Err(ExportOptionsError::UnsupportedFormat {
                format: raw.to_ascii_lowercase(),
            }),
        }
    }

    /// File extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
        }
    }

    /// HTTP content type.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// Column groups selectable for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportField {
    /// Subject code (and name in the full layout).
    Subject,
    /// Marks.
    Marks,
    /// Pass/fail status.
    Status,
}

impl ExportField {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "subject" | "sub" => Some(Self::Subject),
            "marks" | "m" => Some(Self::Marks),
            "status" | "st" => Some(Self::Status),
            _ => None,
        }
    }
}

/// Validated export options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Output format.
    pub format: ExportFormat,
    /// Compact layout: short header, no subject names, no summary footer.
    pub compact: bool,
    /// Gzip the rendered body.
    pub compress: bool,
    /// Selected columns, in request order.
    pub fields: Vec<ExportField>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Pdf,
            compact: false,
            compress: false,
            fields: default_fields(),
        }
    }
}

impl ExportOptions {
    /// Parse raw query parameters.
    ///
    /// `compact` accepts `1`, `true` or `yes`; anything else is false.
    /// `compress` accepts the same values plus `gzip`.
    /// Unknown field tokens are ignored; an empty selection falls back to
    /// subject and marks.
    ///
    /// ```
    /// use results_portal_domain::{ExportField, ExportFormat, ExportOptions};
    ///
    /// let options = ExportOptions::parse(None, Some("YES"), Some("gzip"), Some(" st, bogus ,m"))
    ///     .map_err(|error| error.to_string())?;
    /// assert_eq!(options.format, ExportFormat::Pdf);
    /// assert!(options.compact);
    /// assert!(options.compress);
    /// assert_eq!(options.fields, vec![ExportField::Status, ExportField::Marks]);
    /// # Ok::<(), String>(())
    /// ```
    pub fn parse(
        format: Option<&str>,
        compact: Option<&str>,
        compress: Option<&str>,
        fields: Option<&str>,
    ) -> Result<Self, ExportOptionsError> {
        Ok(Self {
            format: ExportFormat::parse(format)?,
            compact: parse_flag(compact),
            compress: parse_flag(compress)
                || compress.is_some_and(|value| value.trim().eq_ignore_ascii_case("gzip")),
            fields: parse_fields(fields),
        })
    }

    /// Whether the status column is selected.
    #[must_use]
    pub fn with_status(&self) -> bool {
        self.fields.contains(&ExportField::Status)
    }

    /// Download file name for a record.
    #[must_use]
    pub fn file_name(&self, record: &StudentRecord) -> String {
        format!("vtu-result-{}.{}", record.usn, self.format.extension())
    }

    /// Render a record as CSV.
    #[must_use]
    pub fn render_csv(&self, record: &StudentRecord) -> String {
        let mut header: Vec<&str> = if self.compact {
            vec!["code", "name", "marks"]
        } else {
            vec!["Subject Code", "Subject Name", "Marks"]
        };
        if self.with_status() {
            header.push(if self.compact { "status" } else { "Status" });
        }

        let rows: Vec<String> = record
            .subjects
            .iter()
            .map(|subject| {
                let mut parts = Vec::with_capacity(self.fields.len() + 1);
                for field in &self.fields {
                    match field {
                        ExportField::Subject => {
                            parts.push(format!("\"{}\"", subject.code));
                            if !self.compact {
                                parts.push(format!("\"{}\"", subject.subject.replace('"', "\"\"")));
                            }
                        },
                        ExportField::Marks => parts.push(subject.marks.to_string()),
                        ExportField::Status => parts.push(subject.status.as_str().to_owned()),
                    }
                }
                parts.join(",")
            })
            .collect();

        let mut output = header.join(",");
        output.push('\n');
        output.push_str(&rows.join("\n"));
        if !self.compact {
            let _ = write!(
                output,
                "\n\nSGPA,{}\nTotal Marks,{}\nPercentage,{}%",
                record.sgpa, record.total_marks, record.percentage
            );
        }
        output
    }

    /// Lay out a record as a printable sheet.
    ///
    /// The full layout carries the university title, identity, summary and
    /// ranks before the subject rows; the compact one keeps only a title and
    /// the SGPA and draws everything in the regular face.
    #[must_use]
    pub fn sheet(&self, record: &StudentRecord) -> ResultSheet {
        let mut sheet = ResultSheet::default();
        if self.compact {
            sheet.push(SheetLine::text("VTU Result", 14).tone(SheetTone::Accent));
            sheet.push(SheetLine::text(format!("SGPA: {} / 10", record.sgpa), 12));
        } else {
            sheet.push(
                SheetLine::text("Visvesvaraya Technological University", 16)
                    .bold()
                    .tone(SheetTone::Accent),
            );
            sheet.push(SheetLine::text("Result Summary", 12));
            sheet.push(SheetLine::text(format!("Name: {}", record.full_name), 11));
            sheet.push(SheetLine::text(format!("USN: {}", record.usn), 11));
            sheet.push(SheetLine::text(format!("SGPA: {} / 10", record.sgpa), 12).bold());
            sheet.push(SheetLine::text(format!("Total Marks: {}", record.total_marks), 11));
            sheet.push(SheetLine::text(format!("Percentage: {}%", record.percentage), 11));
            if let Some(rank) = record.class_rank {
                sheet.push(SheetLine::text(format!("Class Rank: {rank}"), 11));
            }
            if let Some(rank) = record.college_rank {
                sheet.push(SheetLine::text(format!("College Rank: {rank}"), 11));
            }
            sheet.push(SheetLine::text("Subjects and Marks:", 12).bold().gap_before(4));
        }

        for subject in &record.subjects {
            let mut text = format!("{}: {} - {}", subject.code, subject.subject, subject.marks);
            if !self.compact {
                let _ = write!(text, " (Grade: {})", subject.grade);
            }
            if self.with_status() {
                let _ = write!(text, " ({})", subject.status);
            }
            sheet.push(SheetLine::row(text));
        }
        sheet
    }
}

fn default_fields() -> Vec<ExportField> {
    vec![ExportField::Subject, ExportField::Marks]
}

fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        )
    })
}

fn parse_fields(value: Option<&str>) -> Vec<ExportField> {
    let Some(value) = value else {
        return default_fields();
    };
    let fields: Vec<ExportField> = value
        .split(',')
        .filter_map(|token| ExportField::from_token(&token.trim().to_ascii_lowercase()))
        .collect();
    if fields.is_empty() {
        default_fields()
    } else {
        fields
    }
}

/// Export option failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOptionsError {
    /// Requested format is not supported.
    UnsupportedFormat {
        /// Lowercased format label.
        format: String,
    },
}

impl fmt::Display for ExportOptionsError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat { format } => write!(formatter, "Unsupported format: {format}"),
        }
    }
}

impl std::error::Error for ExportOptionsError {}

impl From<ExportOptionsError> for ErrorEnvelope {
    fn from(error: ExportOptionsError) -> Self {
        let message = error.to_string();
        match error {
            ExportOptionsError::UnsupportedFormat { format } => {
                Self::expected(ErrorCode::new("export", "unsupported_format"), message)
                    .with_metadata("format", format)
            },
        }
    }
}
