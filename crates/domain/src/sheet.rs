//! Printable result-sheet layout.
//!
//! A [`ResultSheet`] is a backend-neutral list of text lines with their font
//! size, weight and tone. [`ResultSheet::pages`] places the lines on US Letter
//! pages using a fixed left margin and a top-down baseline cursor.

/// Page width in points (US Letter).
pub const PAGE_WIDTH: u16 = 612;
/// Page height in points (US Letter).
pub const PAGE_HEIGHT: u16 = 792;
/// Left margin of every line.
pub const MARGIN_LEFT: u16 = 72;
/// Baseline of the first line on a page.
pub const FIRST_BASELINE: u16 = 740;
/// Lines never start below this baseline.
pub const BOTTOM_MARGIN: u16 = 72;

/// Text color of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetTone {
    /// Title color.
    Accent,
    /// Body text.
    Ink,
    /// Subject rows.
    Muted,
}

impl SheetTone {
    /// RGB components in `0.0..=1.0`.
    #[must_use]
    pub const fn rgb(self) -> [f32; 3] {
        match self {
            Self::Accent => [0.15, 0.25, 0.55],
            Self::Ink => [0.15, 0.15, 0.2],
            Self::Muted => [0.2, 0.2, 0.2],
        }
    }
}

/// One line of text on the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLine {
    /// Text content.
    pub text: String,
    /// Font size in points.
    pub size: u16,
    /// Bold face.
    pub bold: bool,
    /// Text color.
    pub tone: SheetTone,
    /// Extra space above the line, in points.
    pub gap_before: u16,
    /// Distance to the next baseline, in points.
    pub advance: u16,
}

impl SheetLine {
    /// A heading or summary line; advances by its size plus 8 points.
    #[must_use]
    pub fn text(text: impl Into<String>, size: u16) -> Self {
        Self {
            text: text.into(),
            size,
            bold: false,
            tone: SheetTone::Ink,
            gap_before: 0,
            advance: size + 8,
        }
    }

    /// A subject row: 11pt muted text on a 16 point pitch.
    #[must_use]
    pub fn row(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: 11,
            bold: false,
            tone: SheetTone::Muted,
            gap_before: 0,
            advance: 16,
        }
    }

    /// Use the bold face.
    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Set the text color.
    #[must_use]
    pub const fn tone(mut self, tone: SheetTone) -> Self {
        self.tone = tone;
        self
    }

    /// Add space above the line.
    #[must_use]
    pub const fn gap_before(mut self, gap: u16) -> Self {
        self.gap_before = gap;
        self
    }
}

/// A line positioned on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedLine<'a> {
    /// The line.
    pub line: &'a SheetLine,
    /// Baseline, measured up from the bottom edge.
    pub baseline: u16,
}

/// A result sheet ready for a document backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSheet {
    /// Lines in reading order.
    pub lines: Vec<SheetLine>,
}

impl ResultSheet {
    /// Append a line.
    pub fn push(&mut self, line: SheetLine) {
        self.lines.push(line);
    }

    /// Place lines on pages, starting a new page whenever the cursor has
    /// dropped below the bottom margin. A sheet always has at least one page.
    #[must_use]
    pub fn pages(&self) -> Vec<Vec<PlacedLine<'_>>> {
        let mut pages = vec![Vec::new()];
        let mut cursor = i32::from(FIRST_BASELINE);
        for line in &self.lines {
            cursor -= i32::from(line.gap_before);
            if cursor < i32::from(BOTTOM_MARGIN) {
                pages.push(Vec::new());
                cursor = i32::from(FIRST_BASELINE);
            }
            let baseline = u16::try_from(cursor).unwrap_or(BOTTOM_MARGIN);
            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine { line, baseline });
            }
            cursor -= i32::from(line.advance);
        }
        pages
    }
}
